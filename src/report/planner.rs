//! Report query planning.
//!
//! Turns a [`Report`] and a row category into one SELECT over that
//! category's table. Restrictions are applied in a fixed order:
//!
//! 1. filter document → `record_id IN (...)`
//! 2. explicit records → `record_id IN (...)`
//! 3. schema joins when events, instruments or fields are listed
//! 4. event, instrument and field name restrictions
//! 5. calculated fields for the category (needs a calculator)
//!
//! Joining fields fans out one row per field of the instrument, so joined
//! queries select DISTINCT. All queries order by row id.

use tracing::{debug, info};

use super::calculator::FieldCalculator;
use crate::error::{QueryError, QueryResult};
use crate::model::{Category, DataRow, Report, Schema};
use crate::pagination::PageParams;
use crate::querybuilder::filter_with_schema;
use crate::sql::{lit_int, lit_str, table_col, Expr, ExprExt, OrderByExpr, Query, TableRef};
use crate::store::{row_columns, Store};

const EVENT_TABLE: &str = "project_event";
const INSTRUMENT_TABLE: &str = "project_instrument";
const FIELD_TABLE: &str = "project_field";

/// Build the report query for `category` and run the calculator if the
/// report asks for calculated fields.
pub fn construct_report_query(
    store: &Store,
    report: &Report,
    category: Category,
    calculator: Option<&dyn FieldCalculator>,
    params: &PageParams,
) -> QueryResult<(Query, Vec<DataRow>)> {
    let schema = store.load_schema()?;
    construct_report_query_with_schema(store, &schema, report, category, calculator, params)
}

/// [`construct_report_query`] against an already loaded schema.
pub fn construct_report_query_with_schema(
    store: &Store,
    schema: &Schema,
    report: &Report,
    category: Category,
    calculator: Option<&dyn FieldCalculator>,
    params: &PageParams,
) -> QueryResult<(Query, Vec<DataRow>)> {
    let table = category.table();
    let mut query = Query::new()
        .select(row_columns(table))
        .from(TableRef::new(table))
        .order_by(vec![OrderByExpr::asc(table_col(table, "id"))]);

    if !report.filters.is_empty() {
        let matched = filter_with_schema(store, schema, &report.filters)?;
        debug!(matched = matched.len(), "report filters evaluated");
        query = query.filter(
            table_col(table, "record_id").in_list(matched.into_iter().map(lit_int).collect()),
        );
    }

    if !report.records.is_empty() {
        query = query.filter(
            table_col(table, "record_id")
                .in_list(report.records.iter().copied().map(lit_int).collect()),
        );
    }

    if report.needs_schema_joins() {
        query = query
            .distinct()
            .inner_join(
                TableRef::new(EVENT_TABLE),
                table_col(EVENT_TABLE, "id").eq(table_col(table, "event_id")),
            )
            .inner_join(
                TableRef::new(INSTRUMENT_TABLE),
                table_col(INSTRUMENT_TABLE, "id").eq(table_col(table, "instrument_id")),
            )
            .inner_join(
                TableRef::new(FIELD_TABLE),
                table_col(FIELD_TABLE, "instrument_id").eq(table_col(INSTRUMENT_TABLE, "id")),
            );
    }

    if !report.events.is_empty() {
        query = query.filter(name_in(EVENT_TABLE, &report.events));
    }
    if !report.instruments.is_empty() {
        query = query.filter(name_in(INSTRUMENT_TABLE, &report.instruments));
    }
    if !report.fields.is_empty() {
        query = query.filter(name_in(FIELD_TABLE, &report.fields));
    }

    let calculated_fields = report.calculated_fields(category);
    let calculated = if calculated_fields.is_empty() {
        Vec::new()
    } else {
        let calculator = calculator.ok_or(QueryError::NoCustomCalculator {
            category: category.label(),
        })?;
        let rows = calculator.calculate(store, &query, calculated_fields, params)?;
        info!(
            report = %report.uuid,
            fields = calculated_fields.len(),
            rows = rows.len(),
            "computed calculated fields"
        );
        rows
    };

    Ok((query, calculated))
}

fn name_in(table: &str, names: &[String]) -> Expr {
    table_col(table, "name").in_list(names.iter().map(|n| lit_str(n)).collect())
}
