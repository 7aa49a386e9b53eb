//! Data rows and the two row categories.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::schema::ElementSummary;

/// Physical row category. Which one holds a field is decided by whether the
/// field's owning instrument repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Event,
    Instrument,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Event, Category::Instrument];

    /// Backing table name.
    pub fn table(&self) -> &'static str {
        match self {
            Category::Event => "event",
            Category::Instrument => "instrument",
        }
    }

    pub fn label(&self) -> &'static str {
        self.table()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "event" | "events" => Ok(Category::Event),
            "instrument" | "instruments" => Ok(Category::Instrument),
            other => Err(format!("unknown row category `{}`", other)),
        }
    }
}

/// Open string-keyed payload of a row.
pub type RowData = BTreeMap<String, Value>;

/// One stored row together with its event and instrument summaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataRow {
    pub id: i64,
    pub record_id: i64,
    pub event: ElementSummary,
    pub instrument: ElementSummary,
    pub repeat_instance: Option<i64>,
    pub data: RowData,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

/// A row as handed over by the ingestion side, before it has an id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRow {
    pub record_id: i64,
    pub event_id: i64,
    pub instrument_id: i64,
    pub repeat_instance: Option<i64>,
    pub data: RowData,
}

impl NewRow {
    pub fn new(record_id: i64, event_id: i64, instrument_id: i64) -> Self {
        Self {
            record_id,
            event_id,
            instrument_id,
            repeat_instance: None,
            data: RowData::new(),
        }
    }

    pub fn instance(mut self, repeat_instance: i64) -> Self {
        self.repeat_instance = Some(repeat_instance);
        self
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.data.insert(key.to_string(), value.into());
        self
    }
}
