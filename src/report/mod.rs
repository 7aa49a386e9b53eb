//! Report planning and rendering.
//!
//! ```text
//! Report ──► planner ──► (Query, calculated rows)
//!                │
//!                ▼
//!            paginate ──► projection ──► + calculated rows ──► Page
//! ```

pub mod calculator;
pub mod planner;
pub mod projection;
pub mod render;

pub use calculator::FieldCalculator;
pub use planner::{construct_report_query, construct_report_query_with_schema};
pub use projection::filter_item_fields;
pub use render::render_report;
