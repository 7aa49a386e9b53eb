#[path = "../common/mod.rs"]
mod common;

use std::cell::RefCell;
use std::collections::BTreeSet;

use chrono::Utc;
use common::{ids, spec, study};
use rss::error::{QueryError, QueryResult};
use rss::model::{Category, DataRow, Report, ReportDraft};
use rss::pagination::PageParams;
use rss::report::{construct_report_query, FieldCalculator};
use rss::sql::Query;
use rss::store::Store;
use serde_json::json;
use sqlparser::dialect::SQLiteDialect;
use sqlparser::parser::Parser;

fn build_report(edit: impl FnOnce(&mut ReportDraft)) -> Report {
    let mut draft = ReportDraft::new("planner");
    edit(&mut draft);
    draft.into_report(Utc::now())
}

fn plan_rows(store: &Store, report: &Report, category: Category) -> Vec<DataRow> {
    let (query, calculated) =
        construct_report_query(store, report, category, None, &PageParams::default()).unwrap();
    assert!(calculated.is_empty());
    assert_valid_sqlite(&query);
    store.fetch_rows(&query, &store.load_schema().unwrap()).unwrap()
}

fn assert_valid_sqlite(query: &Query) {
    let sql = query.to_sql();
    if let Err(e) = Parser::parse_sql(&SQLiteDialect {}, &sql) {
        panic!("invalid SQLite: {}\n{}", e, sql);
    }
}

fn record_ids(rows: &[DataRow]) -> BTreeSet<i64> {
    rows.iter().map(|row| row.record_id).collect()
}

#[test]
fn test_filters_and_records_restrict_rows() {
    let (store, _) = study();
    let report = build_report(|r| {
        r.records = vec![1, 2, 3];
        r.filters = spec(json!({
            "all": [{"field": "demographics.age", "operator": ">=", "value": 18}]
        }));
    });

    let rows = plan_rows(&store, &report, Category::Event);

    // demographics and vitals rows for records 2 and 3
    assert_eq!(rows.len(), 4);
    assert_eq!(record_ids(&rows), ids(&[2, 3]));
}

#[test]
fn test_filter_with_no_matches_selects_nothing() {
    let (store, _) = study();
    let report = build_report(|r| {
        r.filters = spec(json!({
            "all": [{"field": "demographics.age", "operator": ">", "value": 100}]
        }));
    });

    assert!(plan_rows(&store, &report, Category::Event).is_empty());
}

#[test]
fn test_rows_are_ordered_by_id() {
    let (store, _) = study();
    let rows = plan_rows(&store, &build_report(|_| {}), Category::Event);

    let row_ids: Vec<i64> = rows.iter().map(|row| row.id).collect();
    let mut sorted = row_ids.clone();
    sorted.sort_unstable();
    assert_eq!(row_ids, sorted);
    assert_eq!(rows.len(), 9);
}

#[test]
fn test_instrument_restriction_is_distinct() {
    let (store, _) = study();
    let report = build_report(|r| r.instruments = vec!["vitals".into()]);

    let rows = plan_rows(&store, &report, Category::Event);

    // vitals owns two fields, the field join must not duplicate rows
    assert_eq!(rows.len(), 4);
    assert!(rows.iter().all(|row| row.instrument.name == "vitals"));
}

#[test]
fn test_field_restriction_selects_owning_instrument_rows() {
    let (store, _) = study();
    let report = build_report(|r| r.fields = vec!["drug_name".into()]);

    let rows = plan_rows(&store, &report, Category::Instrument);
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|row| row.instrument.repeating));

    // Event rows have no field named drug_name
    assert!(plan_rows(&store, &report, Category::Event).is_empty());
}

#[test]
fn test_event_restriction() {
    let (store, _) = study();
    let report = build_report(|r| r.events = vec!["follow_up".into()]);
    assert!(plan_rows(&store, &report, Category::Event).is_empty());

    let report = build_report(|r| r.events = vec!["baseline".into()]);
    assert_eq!(plan_rows(&store, &report, Category::Event).len(), 9);
}

#[test]
fn test_calculated_fields_without_calculator() {
    let (store, _) = study();
    let report = build_report(|r| r.calculated_event_fields = vec!["bmi".into()]);

    let result = construct_report_query(
        &store,
        &report,
        Category::Event,
        None,
        &PageParams::default(),
    );
    let err = result.unwrap_err();
    assert!(matches!(err, QueryError::NoCustomCalculator { .. }));
    assert!(err.is_not_implemented());
}

#[test]
fn test_calculator_receives_query_and_fields() {
    let (store, _) = study();
    let report = build_report(|r| {
        r.records = vec![2];
        r.calculated_instrument_fields = vec!["total_dose".into()];
    });

    let seen = RefCell::new(Vec::new());
    let calculator = |store: &Store,
                      query: &Query,
                      fields: &[String],
                      params: &PageParams|
     -> QueryResult<Vec<DataRow>> {
        seen.borrow_mut().extend(fields.iter().cloned());
        assert_eq!(params.per_page(), 10);

        let rows = store.fetch_rows(query, &store.load_schema()?)?;
        let total: i64 = rows
            .iter()
            .filter_map(|row| row.data.get("dose")?.as_str()?.parse::<i64>().ok())
            .sum();

        let mut summary = rows[0].clone();
        summary.data.clear();
        summary.data.insert("total_dose".into(), json!(total));
        Ok(vec![summary])
    };

    let (_, calculated) = construct_report_query(
        &store,
        &report,
        Category::Instrument,
        Some(&calculator as &dyn FieldCalculator),
        &PageParams::new(1, 10).unwrap(),
    )
    .unwrap();

    assert_eq!(seen.into_inner(), vec!["total_dose".to_string()]);
    assert_eq!(calculated.len(), 1);
    assert_eq!(calculated[0].data["total_dose"], json!(300));
}
