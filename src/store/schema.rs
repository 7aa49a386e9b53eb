//! Schema element persistence.

use rusqlite::params;
use tracing::debug;

use super::Store;
use crate::error::QueryResult;
use crate::model::{Arm, ProjectEvent, ProjectField, ProjectInstrument, Schema};

impl Store {
    /// Write every schema element and association in one transaction.
    ///
    /// Existing rows with the same ids are replaced.
    pub fn save_schema(&self, schema: &Schema) -> QueryResult<()> {
        let tx = self.conn().unchecked_transaction()?;

        for arm in schema.arms() {
            tx.execute(
                "INSERT OR REPLACE INTO project_arm (id, name, created, modified)
                 VALUES (?1, ?2, ?3, ?4)",
                params![arm.id, arm.name, arm.created, arm.modified],
            )?;
        }

        for event in schema.events() {
            tx.execute(
                "INSERT OR REPLACE INTO project_event (id, arm_id, name, repeating, created, modified)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    event.id,
                    event.arm_id,
                    event.name,
                    event.repeating,
                    event.created,
                    event.modified
                ],
            )?;
        }

        for instrument in schema.instruments() {
            tx.execute(
                "INSERT OR REPLACE INTO project_instrument (id, name, repeating, created, modified)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    instrument.id,
                    instrument.name,
                    instrument.repeating,
                    instrument.created,
                    instrument.modified
                ],
            )?;
        }

        for field in schema.fields() {
            tx.execute(
                "INSERT OR REPLACE INTO project_field (id, instrument_id, name, created, modified)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    field.id,
                    field.instrument_id,
                    field.name,
                    field.created,
                    field.modified
                ],
            )?;
        }

        for (event_id, instrument_id) in schema.associations() {
            tx.execute(
                "INSERT OR IGNORE INTO project_event_project_instrument_association
                 (event_id, instrument_id) VALUES (?1, ?2)",
                params![event_id, instrument_id],
            )?;
        }

        tx.commit()?;
        debug!(
            events = schema.events().len(),
            instruments = schema.instruments().len(),
            fields = schema.fields().len(),
            "saved schema"
        );
        Ok(())
    }

    /// Load the full schema arena, validating its invariants.
    pub fn load_schema(&self) -> QueryResult<Schema> {
        let conn = self.conn();

        let arms = conn
            .prepare("SELECT id, name, created, modified FROM project_arm ORDER BY id")?
            .query_map([], |row| {
                Ok(Arm {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    created: row.get(2)?,
                    modified: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let events = conn
            .prepare(
                "SELECT id, arm_id, name, repeating, created, modified
                 FROM project_event ORDER BY id",
            )?
            .query_map([], |row| {
                Ok(ProjectEvent {
                    id: row.get(0)?,
                    arm_id: row.get(1)?,
                    name: row.get(2)?,
                    repeating: row.get(3)?,
                    created: row.get(4)?,
                    modified: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let instruments = conn
            .prepare(
                "SELECT id, name, repeating, created, modified
                 FROM project_instrument ORDER BY id",
            )?
            .query_map([], |row| {
                Ok(ProjectInstrument {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    repeating: row.get(2)?,
                    created: row.get(3)?,
                    modified: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let fields = conn
            .prepare(
                "SELECT id, instrument_id, name, created, modified
                 FROM project_field ORDER BY id",
            )?
            .query_map([], |row| {
                Ok(ProjectField {
                    id: row.get(0)?,
                    instrument_id: row.get(1)?,
                    name: row.get(2)?,
                    created: row.get(3)?,
                    modified: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let associations = conn
            .prepare(
                "SELECT event_id, instrument_id
                 FROM project_event_project_instrument_association
                 ORDER BY event_id, instrument_id",
            )?
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<Vec<(i64, i64)>, _>>()?;

        Schema::from_parts(arms, events, instruments, fields, &associations)
    }
}
