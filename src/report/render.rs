//! Full report rendering for one row category.

use tracing::info;
use url::Url;
use uuid::Uuid;

use super::calculator::FieldCalculator;
use super::planner::construct_report_query_with_schema;
use super::projection::filter_item_fields;
use crate::error::QueryResult;
use crate::model::{Category, DataRow};
use crate::pagination::{paginate, Page, PageParams};
use crate::store::Store;

/// Fetch a saved report, plan it, paginate, project `fields`, then append
/// calculated rows. Everything runs in one read session.
///
/// Projection runs after the calculator so calculated fields can still see
/// every stored key. Calculated rows are not projected.
pub fn render_report(
    store: &Store,
    uuid: &Uuid,
    category: Category,
    calculator: Option<&dyn FieldCalculator>,
    params: &PageParams,
    request_url: &Url,
) -> QueryResult<Page<DataRow>> {
    store.read_session(|store| {
        let report = store.get_report(uuid)?;
        let schema = store.load_schema()?;

        let (query, calculated) = construct_report_query_with_schema(
            store, &schema, &report, category, calculator, params,
        )?;
        let mut page = paginate(store, &schema, &query, params, request_url)?;

        if !report.fields.is_empty() {
            filter_item_fields(&report.fields, &mut page);
        }
        page.items.extend(calculated);

        info!(
            report = %uuid,
            category = %category,
            count = page.count,
            items = page.items.len(),
            "rendered report"
        );
        Ok(page)
    })
}
