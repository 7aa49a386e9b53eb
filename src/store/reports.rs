//! Saved report CRUD.

use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};
use tracing::info;
use uuid::Uuid;

use super::Store;
use crate::error::{QueryError, QueryResult};
use crate::model::{Report, ReportDraft};

const REPORT_COLUMNS: &str = "uuid, name, description, records, events, instruments, fields, \
     filters, calculated_event_fields, calculated_instrument_fields, created, modified";

/// A report row with its JSON columns still as text.
struct StoredReport {
    uuid: String,
    name: String,
    description: Option<String>,
    records: String,
    events: String,
    instruments: String,
    fields: String,
    filters: String,
    calculated_event_fields: String,
    calculated_instrument_fields: String,
    created: chrono::DateTime<Utc>,
    modified: chrono::DateTime<Utc>,
}

impl StoredReport {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(StoredReport {
            uuid: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            records: row.get(3)?,
            events: row.get(4)?,
            instruments: row.get(5)?,
            fields: row.get(6)?,
            filters: row.get(7)?,
            calculated_event_fields: row.get(8)?,
            calculated_instrument_fields: row.get(9)?,
            created: row.get(10)?,
            modified: row.get(11)?,
        })
    }

    fn decode(self) -> QueryResult<Report> {
        let uuid = Uuid::parse_str(&self.uuid).map_err(|e| {
            QueryError::Schema(format!("report has malformed uuid `{}`: {}", self.uuid, e))
        })?;
        Ok(Report {
            uuid,
            name: self.name,
            description: self.description,
            records: serde_json::from_str(&self.records)?,
            events: serde_json::from_str(&self.events)?,
            instruments: serde_json::from_str(&self.instruments)?,
            fields: serde_json::from_str(&self.fields)?,
            filters: serde_json::from_str(&self.filters)?,
            calculated_event_fields: serde_json::from_str(&self.calculated_event_fields)?,
            calculated_instrument_fields: serde_json::from_str(
                &self.calculated_instrument_fields,
            )?,
            created: self.created,
            modified: self.modified,
        })
    }
}

impl Store {
    pub fn create_report(&self, draft: ReportDraft) -> QueryResult<Report> {
        let report = draft.into_report(Utc::now());
        self.write_report(&report, "INSERT")?;
        info!(uuid = %report.uuid, name = %report.name, "created report");
        Ok(report)
    }

    pub fn list_reports(&self) -> QueryResult<Vec<Report>> {
        let sql = format!("SELECT {} FROM report ORDER BY created, uuid", REPORT_COLUMNS);
        let stored = self
            .conn()
            .prepare(&sql)?
            .query_map([], StoredReport::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        stored.into_iter().map(StoredReport::decode).collect()
    }

    /// Fetch one report; `NotFound` when the uuid is unknown.
    pub fn get_report(&self, uuid: &Uuid) -> QueryResult<Report> {
        let sql = format!("SELECT {} FROM report WHERE uuid = ?1", REPORT_COLUMNS);
        self.conn()
            .query_row(&sql, params![uuid.to_string()], StoredReport::from_row)
            .optional()?
            .ok_or_else(|| QueryError::not_found("Report", uuid.to_string()))?
            .decode()
    }

    /// Replace the editable attributes of an existing report.
    pub fn modify_report(&self, uuid: &Uuid, draft: ReportDraft) -> QueryResult<Report> {
        let mut report = self.get_report(uuid)?;
        draft.apply_to(&mut report, Utc::now());
        self.write_report(&report, "REPLACE")?;
        info!(uuid = %report.uuid, "modified report");
        Ok(report)
    }

    /// Delete a report. Returns whether anything was deleted.
    pub fn delete_report(&self, uuid: &Uuid) -> QueryResult<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM report WHERE uuid = ?1", params![uuid.to_string()])?;
        if rows > 0 {
            info!(uuid = %uuid, "deleted report");
        }
        Ok(rows > 0)
    }

    fn write_report(&self, report: &Report, verb: &str) -> QueryResult<()> {
        let sql = format!(
            "{} INTO report ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            verb, REPORT_COLUMNS
        );
        self.conn().execute(
            &sql,
            params![
                report.uuid.to_string(),
                report.name,
                report.description,
                serde_json::to_string(&report.records)?,
                serde_json::to_string(&report.events)?,
                serde_json::to_string(&report.instruments)?,
                serde_json::to_string(&report.fields)?,
                serde_json::to_string(&report.filters)?,
                serde_json::to_string(&report.calculated_event_fields)?,
                serde_json::to_string(&report.calculated_instrument_fields)?,
                report.created,
                report.modified,
            ],
        )?;
        Ok(())
    }
}
