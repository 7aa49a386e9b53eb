//! Calculated field hook.

use crate::error::QueryResult;
use crate::model::DataRow;
use crate::pagination::PageParams;
use crate::sql::Query;
use crate::store::Store;

/// Computes calculated fields for the rows a report query selects.
///
/// Called with the in-progress report query, the calculated field names for
/// the target category, and the caller's pagination parameters. The rows it
/// returns are appended to the page after projection.
pub trait FieldCalculator {
    fn calculate(
        &self,
        store: &Store,
        query: &Query,
        fields: &[String],
        params: &PageParams,
    ) -> QueryResult<Vec<DataRow>>;
}

impl<F> FieldCalculator for F
where
    F: Fn(&Store, &Query, &[String], &PageParams) -> QueryResult<Vec<DataRow>>,
{
    fn calculate(
        &self,
        store: &Store,
        query: &Query,
        fields: &[String],
        params: &PageParams,
    ) -> QueryResult<Vec<DataRow>> {
        self(store, query, fields, params)
    }
}
