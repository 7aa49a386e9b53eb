//! # rss
//!
//! A REDCap mirror store with a filtered, paginated reporting query engine.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                  Report (stored definition)              │
//! │  (records, events, instruments, fields, filters, calc)   │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [querybuilder]
//! ┌─────────────────────────────────────────────────────────┐
//! │        FilterSpec → record id set (∩ / ∪ pipeline)       │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [report::planner]
//! ┌─────────────────────────────────────────────────────────┐
//! │        SELECT over event/instrument rows + calc rows     │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [pagination]
//! ┌─────────────────────────────────────────────────────────┐
//! │        count, pages, links, LIMIT/OFFSET window          │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [report::projection]
//! ┌─────────────────────────────────────────────────────────┐
//! │              Page of rows with projected data            │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Rows, schema and reports live in a SQLite [`store::Store`]. Every
//! generated query goes through the typed [`sql`] builder.

pub mod config;
pub mod error;
pub mod model;
pub mod pagination;
pub mod querybuilder;
pub mod report;
pub mod sql;
pub mod store;

pub use error::{QueryError, QueryResult};

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::error::{QueryError, QueryResult};
    pub use crate::model::{
        Aggregator, Category, Criterion, DataRow, FilterSpec, FilterValue, NewRow, Operator,
        Report, ReportDraft, Scalar, Schema, SchemaBuilder,
    };
    pub use crate::pagination::{paginate, Page, PageParams};
    pub use crate::querybuilder::filter;
    pub use crate::report::{
        construct_report_query, filter_item_fields, render_report, FieldCalculator,
    };
    pub use crate::sql::Query;
    pub use crate::store::Store;
}
