#[path = "../common/mod.rs"]
mod common;

use common::{request_url, spec, study};
use rss::error::{QueryError, QueryResult};
use rss::model::{Category, DataRow, ReportDraft};
use rss::pagination::PageParams;
use rss::report::{render_report, FieldCalculator};
use rss::sql::Query;
use rss::store::Store;
use serde_json::json;
use uuid::Uuid;

fn save(store: &Store, edit: impl FnOnce(&mut ReportDraft)) -> Uuid {
    let mut draft = ReportDraft::new("render");
    edit(&mut draft);
    store.create_report(draft).unwrap().uuid
}

#[test]
fn test_render_projects_report_fields() {
    let (store, _) = study();
    let uuid = save(&store, |r| r.fields = vec!["age".into()]);

    let page = render_report(
        &store,
        &uuid,
        Category::Event,
        None,
        &PageParams::default(),
        &request_url(),
    )
    .unwrap();

    // only demographics rows carry `age`
    assert_eq!(page.count, 5);
    assert_eq!(page.items.len(), 5);
    for row in &page.items {
        assert_eq!(row.instrument.name, "demographics");
        assert_eq!(row.data.keys().collect::<Vec<_>>(), vec!["age"]);
    }
}

#[test]
fn test_render_without_fields_keeps_full_data() {
    let (store, _) = study();
    let uuid = save(&store, |r| {
        r.filters = spec(json!({
            "all": [{"field": "demographics.sex", "operator": "==", "value": "M"}]
        }));
        r.instruments = vec!["demographics".into()];
    });

    let page = render_report(
        &store,
        &uuid,
        Category::Event,
        None,
        &PageParams::default(),
        &request_url(),
    )
    .unwrap();

    assert_eq!(page.count, 2);
    assert_eq!(page.pages, 1);
    assert_eq!(page.next_page, None);
    assert_eq!(page.previous_page, None);
    assert_eq!(page.items[0].record_id, 2);
    assert_eq!(page.items[0].data["sex"], json!("M"));
    assert_eq!(page.items[0].data["age"], json!("18"));
}

#[test]
fn test_calculated_rows_are_appended_unprojected() {
    let (store, _) = study();
    let uuid = save(&store, |r| {
        r.records = vec![2];
        r.fields = vec!["dose".into()];
        r.calculated_instrument_fields = vec!["total_dose".into()];
    });

    let calculator = |store: &Store,
                      query: &Query,
                      _fields: &[String],
                      _params: &PageParams|
     -> QueryResult<Vec<DataRow>> {
        let rows = store.fetch_rows(query, &store.load_schema()?)?;
        let mut summary = rows[0].clone();
        summary.data.insert("total_dose".into(), json!(300));
        Ok(vec![summary])
    };

    let page = render_report(
        &store,
        &uuid,
        Category::Instrument,
        Some(&calculator as &dyn FieldCalculator),
        &PageParams::default(),
        &request_url(),
    )
    .unwrap();

    // two medication rows plus the calculated row
    assert_eq!(page.count, 2);
    assert_eq!(page.items.len(), 3);
    for row in &page.items[..2] {
        assert_eq!(row.data.keys().collect::<Vec<_>>(), vec!["dose"]);
    }
    let calculated = &page.items[2];
    assert_eq!(calculated.data["total_dose"], json!(300));
    assert!(calculated.data.contains_key("drug_name"));
}

#[test]
fn test_render_unknown_report() {
    let (store, _) = study();
    let uuid = Uuid::new_v4();

    let result = render_report(
        &store,
        &uuid,
        Category::Event,
        None,
        &PageParams::default(),
        &request_url(),
    );
    assert!(matches!(
        result,
        Err(QueryError::NotFound { kind: "Report", name }) if name == uuid.to_string()
    ));
}

#[test]
fn test_render_needs_calculator_for_matching_category() {
    let (store, _) = study();
    let uuid = save(&store, |r| r.calculated_event_fields = vec!["bmi".into()]);

    let err = render_report(
        &store,
        &uuid,
        Category::Event,
        None,
        &PageParams::default(),
        &request_url(),
    )
    .unwrap_err();
    assert!(err.is_not_implemented());

    // instrument rows have no calculated fields configured
    let page = render_report(
        &store,
        &uuid,
        Category::Instrument,
        None,
        &PageParams::default(),
        &request_url(),
    )
    .unwrap();
    assert_eq!(page.count, 3);
}

#[test]
fn test_render_links() {
    let (store, _) = study();
    let uuid = save(&store, |_| {});

    let page = render_report(
        &store,
        &uuid,
        Category::Event,
        None,
        &PageParams::new(2, 4).unwrap(),
        &request_url(),
    )
    .unwrap();

    assert_eq!(page.count, 9);
    assert_eq!(page.pages, 3);
    assert_eq!(
        page.next_page.as_deref(),
        Some("http://localhost/api/v1/reports/events/report?per_page=50&page=3")
    );
    assert_eq!(
        page.previous_page.as_deref(),
        Some("http://localhost/api/v1/reports/events/report?per_page=50&page=1")
    );
}
