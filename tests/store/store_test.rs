#[path = "../common/mod.rs"]
mod common;

use common::{spec, study_schema};
use rss::error::QueryError;
use rss::model::{Category, NewRow, ReportDraft};
use rss::store::Store;
use serde_json::json;
use tempfile::TempDir;
use uuid::Uuid;

fn draft(name: &str) -> ReportDraft {
    let mut draft = ReportDraft::new(name);
    draft.description = Some("adults at baseline".into());
    draft.records = vec![1, 2, 3];
    draft.events = vec!["baseline".into()];
    draft.filters = spec(json!({
        "all": [{"field": "demographics.age", "operator": ">=", "value": 18}],
        "any": {"any": [{"field": "vitals.smoker", "operator": "==", "value": true}]}
    }));
    draft
}

#[test]
fn test_report_crud_round_trip() {
    let store = Store::open_in_memory().unwrap();

    let created = store.create_report(draft("adults")).unwrap();
    assert_eq!(store.get_report(&created.uuid).unwrap(), created);
    assert_eq!(store.list_reports().unwrap(), vec![created.clone()]);

    let mut edit = ReportDraft::new("smokers");
    edit.fields = vec!["smoker".into()];
    let modified = store.modify_report(&created.uuid, edit).unwrap();

    assert_eq!(modified.uuid, created.uuid);
    assert_eq!(modified.created, created.created);
    assert!(modified.modified >= created.modified);
    assert_eq!(modified.name, "smokers");
    assert_eq!(modified.fields, vec!["smoker".to_string()]);
    assert_eq!(store.get_report(&created.uuid).unwrap(), modified);

    assert!(store.delete_report(&created.uuid).unwrap());
    assert!(!store.delete_report(&created.uuid).unwrap());
    assert!(matches!(
        store.get_report(&created.uuid),
        Err(QueryError::NotFound { kind: "Report", .. })
    ));
}

#[test]
fn test_modify_unknown_report() {
    let store = Store::open_in_memory().unwrap();
    let result = store.modify_report(&Uuid::new_v4(), ReportDraft::new("x"));
    assert!(matches!(
        result,
        Err(QueryError::NotFound { kind: "Report", .. })
    ));
}

#[test]
fn test_filters_survive_storage() {
    let store = Store::open_in_memory().unwrap();
    let created = store.create_report(draft("adults")).unwrap();

    let loaded = store.get_report(&created.uuid).unwrap();
    assert_eq!(loaded.filters, created.filters);
    assert_eq!(loaded.filters.depth(), 2);
    assert_eq!(
        loaded.filters.to_json(),
        json!({
            "all": [{"field": "demographics.age", "operator": ">=", "value": 18}],
            "any": {"any": [{"field": "vitals.smoker", "operator": "==", "value": true}]}
        })
    );
}

#[test]
fn test_file_store_persists_schema_rows_and_reports() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("mirror.db");
    let schema = study_schema();

    let uuid = {
        let store = Store::open(&path).unwrap();
        store.save_schema(&schema).unwrap();
        store
            .insert_row(
                Category::Event,
                &NewRow::new(1, common::BASELINE, common::DEMOGRAPHICS).with("age", "40"),
            )
            .unwrap();
        store.create_report(draft("adults")).unwrap().uuid
    };

    let store = Store::open(&path).unwrap();
    let loaded = store.load_schema().unwrap();
    assert_eq!(loaded.events(), schema.events());
    assert_eq!(loaded.instruments(), schema.instruments());
    assert_eq!(loaded.fields(), schema.fields());
    assert_eq!(loaded.associations(), schema.associations());

    assert_eq!(
        store.distinct_record_ids().unwrap().into_iter().collect::<Vec<_>>(),
        vec![1]
    );
    assert_eq!(store.get_report(&uuid).unwrap().name, "adults");
}
