#[path = "../common/mod.rs"]
mod common;

use common::{ids, spec, study};
use rss::error::{CastTarget, QueryError};
use rss::model::{Category, FilterSpec, NewRow};
use rss::querybuilder::{filter, filter_with_schema};
use serde_json::json;

#[test]
fn test_empty_spec_returns_every_record() {
    let (store, _) = study();
    let result = filter(&store, &FilterSpec::new()).unwrap();
    // Record 6 only has instrument rows
    assert_eq!(result, ids(&[1, 2, 3, 4, 5, 6]));
}

#[test]
fn test_all_is_intersection() {
    let (store, _) = study();
    let result = filter(
        &store,
        &spec(json!({
            "all": [
                {"field": "demographics.age", "operator": ">=", "value": 18},
                {"field": "demographics.sex", "operator": "==", "value": "F"}
            ]
        })),
    )
    .unwrap();
    assert_eq!(result, ids(&[3, 5]));
}

#[test]
fn test_any_is_union() {
    let (store, _) = study();
    let result = filter(
        &store,
        &spec(json!({
            "any": [
                {"field": "demographics.age", "operator": "<", "value": 18},
                {"field": "vitals.weight", "operator": ">=", "value": 90}
            ]
        })),
    )
    .unwrap();
    assert_eq!(result, ids(&[1, 3]));
}

#[test]
fn test_empty_any_keeps_universe() {
    let (store, _) = study();
    let result = filter(&store, &spec(json!({"any": []}))).unwrap();
    assert_eq!(result, ids(&[1, 2, 3, 4, 5, 6]));
}

#[test]
fn test_nested_spec_intersects_with_siblings() {
    let (store, _) = study();

    let result = filter(
        &store,
        &spec(json!({
            "any": [{"field": "demographics.age", "operator": "<", "value": 18}],
            "all": {"any": [{"field": "demographics.sex", "operator": "==", "value": "F"}]}
        })),
    )
    .unwrap();
    assert_eq!(result, ids(&[1]));

    let result = filter(
        &store,
        &spec(json!({
            "all": {"any": [{"field": "demographics.age", "operator": ">=", "value": 18}]},
            "any": [{"field": "vitals.smoker", "operator": "==", "value": true}]
        })),
    )
    .unwrap();
    assert_eq!(result, ids(&[2, 3]));
}

#[test]
fn test_repeating_instrument_rows_are_searched() {
    let (store, _) = study();
    let result = filter(
        &store,
        &spec(json!({
            "any": [{"field": "medications.drug_name", "operator": "==", "value": "aspirin"}]
        })),
    )
    .unwrap();
    assert_eq!(result, ids(&[2, 6]));
}

#[test]
fn test_evaluation_is_idempotent() {
    let (store, schema) = study();
    let filters = spec(json!({
        "all": [{"field": "demographics.age", "operator": ">", "value": 20}],
        "any": {"all": [{"field": "vitals.smoker", "operator": "!=", "value": true}]}
    }));

    let first = filter_with_schema(&store, &schema, &filters).unwrap();
    let second = filter_with_schema(&store, &schema, &filters).unwrap();
    assert_eq!(first, second);
    assert_eq!(first, ids(&[5]));
}

#[test]
fn test_boolean_cast() {
    let (store, _) = study();
    let result = filter(
        &store,
        &spec(json!({
            "all": [{"field": "demographics.consent", "operator": "==", "value": true}]
        })),
    )
    .unwrap();
    // Record 4 has no consent key and is skipped without error
    assert_eq!(result, ids(&[1, 3, 5]));
}

#[test]
fn test_null_value_matches_absence() {
    let (store, _) = study();

    let missing = filter(
        &store,
        &spec(json!({"all": [{"field": "demographics.consent", "operator": "==", "value": null}]})),
    )
    .unwrap();
    assert_eq!(missing, ids(&[4]));

    let present = filter(
        &store,
        &spec(json!({"all": [{"field": "demographics.consent", "operator": "!="}]})),
    )
    .unwrap();
    assert_eq!(present, ids(&[1, 2, 3, 5]));
}

#[test]
fn test_uncastable_value_fails_whole_filter() {
    let (store, _) = study();
    let result = filter(
        &store,
        &spec(json!({"all": [{"field": "vitals.smoker", "operator": "==", "value": 1}]})),
    );
    assert!(matches!(
        result,
        Err(QueryError::InvalidCast {
            target: CastTarget::Integer,
            ..
        })
    ));
}

#[test]
fn test_empty_string_is_not_coerced() {
    let (store, _) = study();
    store
        .insert_row(
            Category::Event,
            &NewRow::new(7, common::BASELINE, common::DEMOGRAPHICS).with("age", ""),
        )
        .unwrap();

    let result = filter(
        &store,
        &spec(json!({"all": [{"field": "demographics.age", "operator": ">=", "value": 18}]})),
    );
    assert!(matches!(
        result,
        Err(QueryError::InvalidCast { field, value, .. }) if field == "age" && value.is_empty()
    ));
}

#[test]
fn test_unknown_aggregator_at_any_depth() {
    for doc in [
        json!({"some": []}),
        json!({"all": {"none": []}}),
        json!({"all": {"any": {"xor": []}}}),
    ] {
        assert!(matches!(
            FilterSpec::from_json(&doc),
            Err(QueryError::InvalidAggregator(_))
        ));
    }
}

#[test]
fn test_unknown_instrument() {
    let (store, _) = study();
    let result = filter(
        &store,
        &spec(json!({"all": [{"field": "labs.age", "operator": "==", "value": 1}]})),
    );
    assert!(matches!(
        result,
        Err(QueryError::NotFound { kind: "Instrument", name }) if name == "labs"
    ));
}
