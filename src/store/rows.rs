//! Data row reads and writes.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use rusqlite::params;
use serde_json::Value;
use tracing::debug;

use super::Store;
use crate::error::{QueryError, QueryResult};
use crate::model::{Category, DataRow, NewRow, RowData, Schema};
use crate::sql::{col, count_star, table_col, Expr, ExprExt, OrderByExpr, Query, TableRef};

/// Columns every row query selects, in the order [`Store::fetch_rows`] reads them.
pub fn row_columns(table: &str) -> Vec<Expr> {
    [
        "id",
        "record_id",
        "event_id",
        "instrument_id",
        "repeat_instance",
        "data",
        "created",
        "modified",
    ]
    .iter()
    .map(|column| table_col(table, column))
    .collect()
}

struct RawRow {
    id: i64,
    record_id: i64,
    event_id: i64,
    instrument_id: i64,
    repeat_instance: Option<i64>,
    data: String,
    created: DateTime<Utc>,
    modified: DateTime<Utc>,
}

impl Store {
    /// Insert one row into the table of `category`. Returns the new row id.
    pub fn insert_row(&self, category: Category, row: &NewRow) -> QueryResult<i64> {
        let now = Utc::now();
        let data = serde_json::to_string(&row.data)?;
        let sql = format!(
            "INSERT INTO {} (record_id, event_id, instrument_id, repeat_instance, data, created, modified)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            category.table()
        );
        self.conn().execute(
            &sql,
            params![
                row.record_id,
                row.event_id,
                row.instrument_id,
                row.repeat_instance,
                data,
                now,
                now
            ],
        )?;
        Ok(self.conn().last_insert_rowid())
    }

    /// Every record id that has at least one row in either table.
    pub fn distinct_record_ids(&self) -> QueryResult<BTreeSet<i64>> {
        let ids = self
            .conn()
            .prepare("SELECT record_id FROM event UNION SELECT record_id FROM instrument")?
            .query_map([], |row| row.get(0))?
            .collect::<Result<BTreeSet<i64>, _>>()?;
        Ok(ids)
    }

    /// `(record_id, data[field])` for every row of `category` belonging to
    /// `instrument_id`. A missing key comes back as `None`.
    pub fn scan_field(
        &self,
        category: Category,
        instrument_id: i64,
        field: &str,
    ) -> QueryResult<Vec<(i64, Option<Value>)>> {
        let query = Query::new()
            .select(vec![col("record_id"), col("data")])
            .from(TableRef::new(category.table()))
            .filter(col("instrument_id").eq(instrument_id))
            .order_by(vec![OrderByExpr::asc(col("id"))]);

        let sql = query.to_sql();
        debug!(sql = %sql, field, "scanning rows");

        let mut stmt = self.conn().prepare(&sql)?;
        let raw = stmt
            .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;

        raw.into_iter()
            .map(|(record_id, data)| {
                let mut data: RowData = serde_json::from_str(&data)?;
                Ok((record_id, data.remove(field)))
            })
            .collect()
    }

    /// Run a row query built over [`row_columns`] and attach schema summaries.
    pub fn fetch_rows(&self, query: &Query, schema: &Schema) -> QueryResult<Vec<DataRow>> {
        let sql = query.to_sql();
        debug!(sql = %sql, "fetching rows");

        let mut stmt = self.conn().prepare(&sql)?;
        let raw = stmt
            .query_map([], |row| {
                Ok(RawRow {
                    id: row.get(0)?,
                    record_id: row.get(1)?,
                    event_id: row.get(2)?,
                    instrument_id: row.get(3)?,
                    repeat_instance: row.get(4)?,
                    data: row.get(5)?,
                    created: row.get(6)?,
                    modified: row.get(7)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        raw.into_iter()
            .map(|raw| {
                let event = schema.event_by_id(raw.event_id).ok_or_else(|| {
                    QueryError::Schema(format!(
                        "row {} references unknown event {}",
                        raw.id, raw.event_id
                    ))
                })?;
                let instrument = schema.instrument_by_id(raw.instrument_id).ok_or_else(|| {
                    QueryError::Schema(format!(
                        "row {} references unknown instrument {}",
                        raw.id, raw.instrument_id
                    ))
                })?;

                Ok(DataRow {
                    id: raw.id,
                    record_id: raw.record_id,
                    event: event.summary(),
                    instrument: instrument.summary(),
                    repeat_instance: raw.repeat_instance,
                    data: serde_json::from_str(&raw.data)?,
                    created: raw.created,
                    modified: raw.modified,
                })
            })
            .collect()
    }

    /// `SELECT COUNT(*)` over `query` as a subquery.
    pub fn count(&self, query: &Query) -> QueryResult<u64> {
        let counted = Query::new()
            .select(vec![count_star()])
            .from_subquery(query.clone(), "counted");

        let sql = counted.to_sql();
        debug!(sql = %sql, "counting rows");

        let count: i64 = self.conn().query_row(&sql, [], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }
}
