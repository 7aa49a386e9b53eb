//! Persisted report definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::filter::FilterSpec;
use super::row::Category;

/// A stored, reusable query definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub uuid: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub records: Vec<i64>,
    pub events: Vec<String>,
    pub instruments: Vec<String>,
    pub fields: Vec<String>,
    pub filters: FilterSpec,
    pub calculated_event_fields: Vec<String>,
    pub calculated_instrument_fields: Vec<String>,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl Report {
    /// Calculated field names that apply to rows of `category`.
    pub fn calculated_fields(&self, category: Category) -> &[String] {
        match category {
            Category::Event => &self.calculated_event_fields,
            Category::Instrument => &self.calculated_instrument_fields,
        }
    }

    /// Whether events, instruments or fields restrict the schema joins.
    pub fn needs_schema_joins(&self) -> bool {
        !self.events.is_empty() || !self.instruments.is_empty() || !self.fields.is_empty()
    }
}

/// Editor input for creating or modifying a report.
///
/// Accepts camelCase or snake_case keys; every list defaults to empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportDraft {
    pub name: String,
    pub description: Option<String>,
    pub records: Vec<i64>,
    pub events: Vec<String>,
    pub instruments: Vec<String>,
    pub fields: Vec<String>,
    pub filters: FilterSpec,
    #[serde(alias = "calculated_event_fields", deserialize_with = "null_as_empty")]
    pub calculated_event_fields: Vec<String>,
    #[serde(
        alias = "calculated_instrument_fields",
        deserialize_with = "null_as_empty"
    )]
    pub calculated_instrument_fields: Vec<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

impl ReportDraft {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Materialize into a report with a fresh uuid.
    pub fn into_report(self, now: DateTime<Utc>) -> Report {
        Report {
            uuid: Uuid::new_v4(),
            name: self.name,
            description: self.description,
            records: self.records,
            events: self.events,
            instruments: self.instruments,
            fields: self.fields,
            filters: self.filters,
            calculated_event_fields: self.calculated_event_fields,
            calculated_instrument_fields: self.calculated_instrument_fields,
            created: now,
            modified: now,
        }
    }

    /// Overwrite the editable attributes of `report`. The uuid and creation
    /// time are kept.
    pub fn apply_to(self, report: &mut Report, now: DateTime<Utc>) {
        report.name = self.name;
        report.description = self.description;
        report.records = self.records;
        report.events = self.events;
        report.instruments = self.instruments;
        report.fields = self.fields;
        report.filters = self.filters;
        report.calculated_event_fields = self.calculated_event_fields;
        report.calculated_instrument_fields = self.calculated_instrument_fields;
        report.modified = now;
    }
}
