//! Project schema as an explicit arena.
//!
//! Arms, events, instruments and fields live in flat vectors addressed by
//! typed indices. The event ↔ instrument many-to-many association and the
//! instrument → field ownership are stored as index lists on both sides, so
//! every lookup the operator evaluator needs (which instrument owns this
//! field, does it repeat) is a plain vector access with no store round trip.
//!
//! ```text
//!   Arm ──< Event >──< Instrument ──< Field
//!              (association)
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::row::Category;
use crate::error::{QueryError, QueryResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArmIdx(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventIdx(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstrumentIdx(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldIdx(pub usize);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arm {
    pub id: i64,
    pub name: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectEvent {
    pub id: i64,
    pub arm_id: i64,
    pub name: String,
    pub repeating: bool,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectInstrument {
    pub id: i64,
    pub name: String,
    pub repeating: bool,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectField {
    pub id: i64,
    pub instrument_id: i64,
    pub name: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

/// The slice of an event or instrument that travels with every data row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementSummary {
    pub id: i64,
    pub name: String,
    pub repeating: bool,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl ProjectEvent {
    pub fn summary(&self) -> ElementSummary {
        ElementSummary {
            id: self.id,
            name: self.name.clone(),
            repeating: self.repeating,
            created: self.created,
            modified: self.modified,
        }
    }
}

impl ProjectInstrument {
    pub fn summary(&self) -> ElementSummary {
        ElementSummary {
            id: self.id,
            name: self.name.clone(),
            repeating: self.repeating,
            created: self.created,
            modified: self.modified,
        }
    }
}

/// Arena of schema elements with index-based adjacency.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    arms: Vec<Arm>,
    events: Vec<ProjectEvent>,
    instruments: Vec<ProjectInstrument>,
    fields: Vec<ProjectField>,

    event_arm: Vec<ArmIdx>,
    event_instruments: Vec<Vec<InstrumentIdx>>,
    instrument_events: Vec<Vec<EventIdx>>,
    instrument_fields: Vec<Vec<FieldIdx>>,
    field_instrument: Vec<InstrumentIdx>,

    event_by_name: HashMap<String, EventIdx>,
    instrument_by_name: HashMap<String, InstrumentIdx>,
    field_by_name: HashMap<String, FieldIdx>,
    event_by_id: HashMap<i64, EventIdx>,
    instrument_by_id: HashMap<i64, InstrumentIdx>,
}

impl Schema {
    /// Assemble an arena from flat rows and `(event_id, instrument_id)` pairs.
    ///
    /// Fails on dangling foreign keys, duplicate names, and on an
    /// event/instrument pairing where both sides are flagged repeating.
    pub fn from_parts(
        arms: Vec<Arm>,
        events: Vec<ProjectEvent>,
        instruments: Vec<ProjectInstrument>,
        fields: Vec<ProjectField>,
        associations: &[(i64, i64)],
    ) -> QueryResult<Schema> {
        let arm_by_id: HashMap<i64, ArmIdx> = arms
            .iter()
            .enumerate()
            .map(|(i, arm)| (arm.id, ArmIdx(i)))
            .collect();

        let mut schema = Schema {
            event_instruments: vec![Vec::new(); events.len()],
            instrument_events: vec![Vec::new(); instruments.len()],
            instrument_fields: vec![Vec::new(); instruments.len()],
            ..Default::default()
        };

        for (i, event) in events.iter().enumerate() {
            let arm = arm_by_id.get(&event.arm_id).copied().ok_or_else(|| {
                QueryError::Schema(format!(
                    "event `{}` references missing arm {}",
                    event.name, event.arm_id
                ))
            })?;
            schema.event_arm.push(arm);
            unique_insert(&mut schema.event_by_name, &event.name, EventIdx(i), "event")?;
            schema.event_by_id.insert(event.id, EventIdx(i));
        }

        for (i, instrument) in instruments.iter().enumerate() {
            unique_insert(
                &mut schema.instrument_by_name,
                &instrument.name,
                InstrumentIdx(i),
                "instrument",
            )?;
            schema.instrument_by_id.insert(instrument.id, InstrumentIdx(i));
        }

        for (i, field) in fields.iter().enumerate() {
            let owner = schema
                .instrument_by_id
                .get(&field.instrument_id)
                .copied()
                .ok_or_else(|| {
                    QueryError::Schema(format!(
                        "field `{}` references missing instrument {}",
                        field.name, field.instrument_id
                    ))
                })?;
            schema.field_instrument.push(owner);
            schema.instrument_fields[owner.0].push(FieldIdx(i));
            unique_insert(&mut schema.field_by_name, &field.name, FieldIdx(i), "field")?;
        }

        for &(event_id, instrument_id) in associations {
            let event = schema.event_by_id.get(&event_id).copied().ok_or_else(|| {
                QueryError::Schema(format!("association references missing event {}", event_id))
            })?;
            let instrument = schema
                .instrument_by_id
                .get(&instrument_id)
                .copied()
                .ok_or_else(|| {
                    QueryError::Schema(format!(
                        "association references missing instrument {}",
                        instrument_id
                    ))
                })?;

            if events[event.0].repeating && instruments[instrument.0].repeating {
                return Err(QueryError::Schema(format!(
                    "event `{}` and instrument `{}` are both flagged repeating",
                    events[event.0].name, instruments[instrument.0].name
                )));
            }

            schema.event_instruments[event.0].push(instrument);
            schema.instrument_events[instrument.0].push(event);
        }

        schema.arms = arms;
        schema.events = events;
        schema.instruments = instruments;
        schema.fields = fields;
        Ok(schema)
    }

    pub fn arms(&self) -> &[Arm] {
        &self.arms
    }

    pub fn events(&self) -> &[ProjectEvent] {
        &self.events
    }

    pub fn instruments(&self) -> &[ProjectInstrument] {
        &self.instruments
    }

    pub fn fields(&self) -> &[ProjectField] {
        &self.fields
    }

    /// All `(event_id, instrument_id)` association pairs.
    pub fn associations(&self) -> Vec<(i64, i64)> {
        self.event_instruments
            .iter()
            .enumerate()
            .flat_map(|(e, instruments)| {
                instruments
                    .iter()
                    .map(move |i| (self.events[e].id, self.instruments[i.0].id))
            })
            .collect()
    }

    pub fn event(&self, idx: EventIdx) -> &ProjectEvent {
        &self.events[idx.0]
    }

    pub fn instrument(&self, idx: InstrumentIdx) -> &ProjectInstrument {
        &self.instruments[idx.0]
    }

    pub fn field(&self, idx: FieldIdx) -> &ProjectField {
        &self.fields[idx.0]
    }

    pub fn arm_of(&self, event: EventIdx) -> &Arm {
        &self.arms[self.event_arm[event.0].0]
    }

    pub fn find_event(&self, name: &str) -> QueryResult<EventIdx> {
        self.event_by_name
            .get(name)
            .copied()
            .ok_or_else(|| QueryError::not_found("Event", name))
    }

    pub fn find_instrument(&self, name: &str) -> QueryResult<InstrumentIdx> {
        self.instrument_by_name
            .get(name)
            .copied()
            .ok_or_else(|| QueryError::not_found("Instrument", name))
    }

    pub fn find_field(&self, name: &str) -> QueryResult<FieldIdx> {
        self.field_by_name
            .get(name)
            .copied()
            .ok_or_else(|| QueryError::not_found("Field", name))
    }

    pub fn event_by_id(&self, id: i64) -> Option<&ProjectEvent> {
        self.event_by_id.get(&id).map(|idx| &self.events[idx.0])
    }

    pub fn instrument_by_id(&self, id: i64) -> Option<&ProjectInstrument> {
        self.instrument_by_id.get(&id).map(|idx| &self.instruments[idx.0])
    }

    pub fn instruments_of(&self, event: EventIdx) -> &[InstrumentIdx] {
        &self.event_instruments[event.0]
    }

    pub fn events_of(&self, instrument: InstrumentIdx) -> &[EventIdx] {
        &self.instrument_events[instrument.0]
    }

    pub fn fields_of(&self, instrument: InstrumentIdx) -> &[FieldIdx] {
        &self.instrument_fields[instrument.0]
    }

    pub fn owner_of(&self, field: FieldIdx) -> InstrumentIdx {
        self.field_instrument[field.0]
    }

    /// Which row category stores values of `field_name`.
    ///
    /// Fields of a repeating instrument live in instrument rows; everything
    /// else lives in event rows.
    pub fn category_of_field(&self, field_name: &str) -> QueryResult<Category> {
        let owner = self.owner_of(self.find_field(field_name)?);
        Ok(if self.instrument(owner).repeating {
            Category::Instrument
        } else {
            Category::Event
        })
    }
}

fn unique_insert<I: Copy>(
    index: &mut HashMap<String, I>,
    name: &str,
    idx: I,
    kind: &str,
) -> QueryResult<()> {
    if index.insert(name.to_string(), idx).is_some() {
        return Err(QueryError::Schema(format!("duplicate {} name `{}`", kind, name)));
    }
    Ok(())
}

/// Builds a [`Schema`] in memory, assigning sequential ids.
///
/// ```ignore
/// let schema = SchemaBuilder::new()
///     .arm("arm_1")
///     .event("baseline", "arm_1", false)
///     .instrument("demographics", false, &["baseline"])
///     .field("age", "demographics")
///     .build()?;
/// ```
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    arms: Vec<Arm>,
    events: Vec<ProjectEvent>,
    instruments: Vec<ProjectInstrument>,
    fields: Vec<ProjectField>,
    associations: Vec<(i64, i64)>,
    pending: Vec<String>,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arm(mut self, name: &str) -> Self {
        let now = Utc::now();
        self.arms.push(Arm {
            id: self.arms.len() as i64 + 1,
            name: name.to_string(),
            created: now,
            modified: now,
        });
        self
    }

    pub fn event(mut self, name: &str, arm: &str, repeating: bool) -> Self {
        let now = Utc::now();
        let arm_id = match self.arms.iter().find(|a| a.name == arm) {
            Some(a) => a.id,
            None => {
                self.pending.push(format!("event `{}` names unknown arm `{}`", name, arm));
                0
            }
        };
        self.events.push(ProjectEvent {
            id: self.events.len() as i64 + 1,
            arm_id,
            name: name.to_string(),
            repeating,
            created: now,
            modified: now,
        });
        self
    }

    /// Add an instrument and associate it with the named events.
    pub fn instrument(mut self, name: &str, repeating: bool, events: &[&str]) -> Self {
        let now = Utc::now();
        let id = self.instruments.len() as i64 + 1;
        self.instruments.push(ProjectInstrument {
            id,
            name: name.to_string(),
            repeating,
            created: now,
            modified: now,
        });
        for event in events {
            match self.events.iter().find(|e| e.name == *event) {
                Some(e) => self.associations.push((e.id, id)),
                None => self.pending.push(format!(
                    "instrument `{}` names unknown event `{}`",
                    name, event
                )),
            }
        }
        self
    }

    pub fn field(mut self, name: &str, instrument: &str) -> Self {
        let now = Utc::now();
        let instrument_id = match self.instruments.iter().find(|i| i.name == instrument) {
            Some(i) => i.id,
            None => {
                self.pending.push(format!(
                    "field `{}` names unknown instrument `{}`",
                    name, instrument
                ));
                0
            }
        };
        self.fields.push(ProjectField {
            id: self.fields.len() as i64 + 1,
            instrument_id,
            name: name.to_string(),
            created: now,
            modified: now,
        });
        self
    }

    pub fn build(self) -> QueryResult<Schema> {
        if let Some(problem) = self.pending.into_iter().next() {
            return Err(QueryError::Schema(problem));
        }
        Schema::from_parts(
            self.arms,
            self.events,
            self.instruments,
            self.fields,
            &self.associations,
        )
    }
}
