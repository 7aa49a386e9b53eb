//! Recursive evaluation of a [`FilterSpec`] into a record id set.

use std::collections::BTreeSet;

use tracing::debug;

use super::aggregators::aggregate_criteria;
use crate::error::QueryResult;
use crate::model::{FilterSpec, FilterValue, Schema};
use crate::store::Store;

/// Record ids matching `spec`, starting from every known record.
pub fn filter(store: &Store, spec: &FilterSpec) -> QueryResult<BTreeSet<i64>> {
    let schema = store.load_schema()?;
    filter_with_schema(store, &schema, spec)
}

/// [`filter`] against an already loaded schema.
pub fn filter_with_schema(
    store: &Store,
    schema: &Schema,
    spec: &FilterSpec,
) -> QueryResult<BTreeSet<i64>> {
    let universe = store.distinct_record_ids()?;
    filter_from(store, schema, spec, &universe)
}

/// Evaluate `spec` starting from `universe`.
///
/// Entries are applied in document order and always intersect into the
/// running set. A nested spec is evaluated from `universe` again before it
/// is intersected.
pub fn filter_from(
    store: &Store,
    schema: &Schema,
    spec: &FilterSpec,
    universe: &BTreeSet<i64>,
) -> QueryResult<BTreeSet<i64>> {
    let mut records = universe.clone();

    for (aggregator, value) in &spec.entries {
        let matched = match value {
            FilterValue::Nested(inner) => filter_from(store, schema, inner, universe)?,
            FilterValue::Criteria(criteria) => {
                aggregate_criteria(store, schema, *aggregator, criteria, &records)?
            }
        };
        records.retain(|id| matched.contains(id));
        debug!(aggregator = %aggregator, remaining = records.len(), "applied filter entry");
    }

    Ok(records)
}
