//! Filter engine.
//!
//! ```text
//! FilterSpec ──► filter_from ──┬─► Nested      ──► filter_from (recurse)
//!                              └─► Criteria    ──► aggregate_criteria
//!                                                    └─► evaluate_criterion
//! ```
//!
//! Every level intersects its entries into the running record id set.

pub mod aggregators;
pub mod filter;
pub mod operators;

pub use aggregators::aggregate_criteria;
pub use filter::{filter, filter_from, filter_with_schema};
pub use operators::{evaluate_criterion, matches};
