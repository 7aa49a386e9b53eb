#[path = "../common/mod.rs"]
mod common;

use common::{empty_study, request_url, BASELINE, DEMOGRAPHICS};
use rss::model::{Category, DataRow, NewRow, Schema};
use rss::pagination::{paginate, Page, PageParams};
use rss::sql::{table_col, OrderByExpr, Query, TableRef};
use rss::store::{row_columns, Store};

fn populated(rows: i64) -> (Store, Schema) {
    let (store, schema) = empty_study();
    for record in 1..=rows {
        let row = NewRow::new(record, BASELINE, DEMOGRAPHICS).with("age", record);
        store.insert_row(Category::Event, &row).unwrap();
    }
    (store, schema)
}

fn all_rows() -> Query {
    Query::new()
        .select(row_columns("event"))
        .from(TableRef::new("event"))
        .order_by(vec![OrderByExpr::asc(table_col("event", "id"))])
}

fn page(store: &Store, schema: &Schema, page: u64, per_page: u64) -> Page<DataRow> {
    let params = PageParams::new(page, per_page).unwrap();
    paginate(store, schema, &all_rows(), &params, &request_url()).unwrap()
}

#[test]
fn test_last_page() {
    let (store, schema) = populated(101);
    let result = page(&store, &schema, 3, 50);

    assert_eq!(result.count, 101);
    assert_eq!(result.pages, 3);
    assert_eq!(result.next_page, None);
    assert_eq!(
        result.previous_page.as_deref(),
        Some("http://localhost/api/v1/reports/events/report?per_page=50&page=2")
    );
    assert_eq!(result.items.len(), 1);
    assert_eq!(result.items[0].record_id, 101);
}

#[test]
fn test_first_page() {
    let (store, schema) = populated(101);
    let result = page(&store, &schema, 1, 50);

    assert_eq!(result.items.len(), 50);
    assert_eq!(result.items[0].record_id, 1);
    assert_eq!(
        result.next_page.as_deref(),
        Some("http://localhost/api/v1/reports/events/report?per_page=50&page=2")
    );
    assert_eq!(result.previous_page, None);
}

#[test]
fn test_middle_page_window_is_cumulative() {
    let (store, schema) = populated(101);
    let result = page(&store, &schema, 2, 50);

    // LIMIT 100 OFFSET 50
    assert_eq!(result.items.len(), 51);
    assert_eq!(result.items[0].record_id, 51);
    assert_eq!(result.items[50].record_id, 101);
}

#[test]
fn test_zero_page_size() {
    let (store, schema) = populated(10);
    let result = page(&store, &schema, 1, 0);

    assert_eq!(result.count, 10);
    assert_eq!(result.pages, 1);
    assert!(result.items.is_empty());
    assert_eq!(result.next_page, None);
}

#[test]
fn test_empty_store() {
    let (store, schema) = empty_study();
    let result = page(&store, &schema, 1, 50);

    assert_eq!(result.count, 0);
    assert_eq!(result.pages, 1);
    assert_eq!(result.next_page, None);
    assert_eq!(result.previous_page, None);
    assert!(result.items.is_empty());
}

#[test]
fn test_rows_carry_summaries() {
    let (store, schema) = populated(1);
    let result = page(&store, &schema, 1, 50);

    let row = &result.items[0];
    assert_eq!(row.event.name, "baseline");
    assert_eq!(row.instrument.name, "demographics");
    assert_eq!(row.repeat_instance, None);
}
