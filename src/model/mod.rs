//! Domain model: schema arena, data rows, filter documents and reports.

pub mod filter;
pub mod report;
pub mod row;
pub mod scalar;
pub mod schema;

pub use filter::{
    Aggregator, Criterion, FieldPath, FilterSpec, FilterValue, Operator, MAX_FILTER_DEPTH,
};
pub use report::{Report, ReportDraft};
pub use row::{Category, DataRow, NewRow, RowData};
pub use scalar::Scalar;
pub use schema::{
    Arm, ElementSummary, EventIdx, FieldIdx, InstrumentIdx, ProjectEvent, ProjectField,
    ProjectInstrument, Schema, SchemaBuilder,
};
