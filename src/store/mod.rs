//! SQLite-backed mirror store.
//!
//! Holds the project schema, the two data row tables and saved reports.
//!
//! # Layout
//!
//! ```text
//! project_arm, project_event, project_instrument, project_field
//! project_event_project_instrument_association (event_id, instrument_id)
//! event       -- rows of non-repeating instruments
//! instrument  -- rows of repeating instruments
//! report      -- list/filter columns stored as JSON text
//! ```
//!
//! Row `data` is JSON text. Timestamps are RFC 3339 text.

mod reports;
mod rows;
mod schema;

pub use rows::row_columns;

use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use crate::error::{QueryError, QueryResult};

/// Current store layout version. Bump when the DDL changes.
const STORE_VERSION: i32 = 1;

const DDL: &str = "
    CREATE TABLE IF NOT EXISTS meta (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS project_arm (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        created TEXT NOT NULL,
        modified TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS project_event (
        id INTEGER PRIMARY KEY,
        arm_id INTEGER NOT NULL REFERENCES project_arm(id),
        name TEXT NOT NULL,
        repeating INTEGER NOT NULL DEFAULT 0,
        created TEXT NOT NULL,
        modified TEXT NOT NULL
    );
    CREATE UNIQUE INDEX IF NOT EXISTS ix_project_event_name ON project_event(name);

    CREATE TABLE IF NOT EXISTS project_instrument (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        repeating INTEGER NOT NULL DEFAULT 0,
        created TEXT NOT NULL,
        modified TEXT NOT NULL
    );
    CREATE UNIQUE INDEX IF NOT EXISTS ix_project_instrument_name ON project_instrument(name);

    CREATE TABLE IF NOT EXISTS project_field (
        id INTEGER PRIMARY KEY,
        instrument_id INTEGER NOT NULL REFERENCES project_instrument(id),
        name TEXT NOT NULL,
        created TEXT NOT NULL,
        modified TEXT NOT NULL
    );
    CREATE UNIQUE INDEX IF NOT EXISTS ix_project_field_name ON project_field(name);

    CREATE TABLE IF NOT EXISTS project_event_project_instrument_association (
        event_id INTEGER NOT NULL REFERENCES project_event(id),
        instrument_id INTEGER NOT NULL REFERENCES project_instrument(id),
        PRIMARY KEY (event_id, instrument_id)
    );

    CREATE TABLE IF NOT EXISTS event (
        id INTEGER PRIMARY KEY,
        record_id INTEGER NOT NULL,
        event_id INTEGER NOT NULL REFERENCES project_event(id),
        instrument_id INTEGER NOT NULL REFERENCES project_instrument(id),
        repeat_instance INTEGER,
        data TEXT NOT NULL DEFAULT '{}',
        created TEXT NOT NULL,
        modified TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS ix_event_record_id ON event(record_id);
    CREATE INDEX IF NOT EXISTS ix_event_event_instrument ON event(event_id, instrument_id);
    CREATE UNIQUE INDEX IF NOT EXISTS uq_event_row
        ON event(record_id, COALESCE(repeat_instance, 0), event_id, instrument_id);

    CREATE TABLE IF NOT EXISTS instrument (
        id INTEGER PRIMARY KEY,
        record_id INTEGER NOT NULL,
        event_id INTEGER NOT NULL REFERENCES project_event(id),
        instrument_id INTEGER NOT NULL REFERENCES project_instrument(id),
        repeat_instance INTEGER,
        data TEXT NOT NULL DEFAULT '{}',
        created TEXT NOT NULL,
        modified TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS ix_instrument_record_id ON instrument(record_id);
    CREATE INDEX IF NOT EXISTS ix_instrument_event_instrument ON instrument(event_id, instrument_id);
    CREATE UNIQUE INDEX IF NOT EXISTS uq_instrument_row
        ON instrument(record_id, COALESCE(repeat_instance, 0), event_id, instrument_id);

    CREATE TABLE IF NOT EXISTS report (
        uuid TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        description TEXT,
        records TEXT NOT NULL DEFAULT '[]',
        events TEXT NOT NULL DEFAULT '[]',
        instruments TEXT NOT NULL DEFAULT '[]',
        fields TEXT NOT NULL DEFAULT '[]',
        filters TEXT NOT NULL DEFAULT '{}',
        calculated_event_fields TEXT NOT NULL DEFAULT '[]',
        calculated_instrument_fields TEXT NOT NULL DEFAULT '[]',
        created TEXT NOT NULL,
        modified TEXT NOT NULL
    );
";

/// Handle on one SQLite database.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open or create the store at `path`.
    pub fn open(path: impl AsRef<Path>) -> QueryResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.init()?;
        info!(path = %path.display(), "opened store");
        Ok(store)
    }

    /// Open an in-memory store (for testing).
    pub fn open_in_memory() -> QueryResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.init()?;
        Ok(store)
    }

    /// Create tables and indexes, then check the layout version.
    fn init(&self) -> QueryResult<()> {
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        self.conn.execute_batch(DDL)?;

        let stored_version: Option<String> = self
            .conn
            .query_row("SELECT value FROM meta WHERE key = 'version'", [], |row| {
                row.get(0)
            })
            .optional()?;

        match stored_version {
            Some(v) if v == STORE_VERSION.to_string() => {}
            Some(v) => {
                return Err(QueryError::Schema(format!(
                    "store layout version {} does not match expected {}",
                    v, STORE_VERSION
                )))
            }
            None => {
                self.conn.execute(
                    "INSERT INTO meta (key, value) VALUES ('version', ?)",
                    params![STORE_VERSION.to_string()],
                )?;
                debug!(version = STORE_VERSION, "initialized store layout");
            }
        }

        Ok(())
    }

    /// Run `f` inside one deferred read transaction.
    ///
    /// The transaction ends on every exit path: committed when `f` succeeds,
    /// rolled back on drop when it fails. Sessions do not nest.
    pub fn read_session<T>(&self, f: impl FnOnce(&Store) -> QueryResult<T>) -> QueryResult<T> {
        let tx = self.conn.unchecked_transaction()?;
        let out = f(self)?;
        tx.commit()?;
        Ok(out)
    }

    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }
}
