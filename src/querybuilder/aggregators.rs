//! Set combination of criterion results.

use std::collections::BTreeSet;

use super::operators::evaluate_criterion;
use crate::error::QueryResult;
use crate::model::{Aggregator, Criterion, Schema};
use crate::store::Store;

/// Combine the results of `criteria` with `aggregator`.
///
/// `all` intersects every result into `background`. `any` unions the
/// results, seeded by the first one; with no criteria it returns
/// `background` unchanged.
pub fn aggregate_criteria(
    store: &Store,
    schema: &Schema,
    aggregator: Aggregator,
    criteria: &[Criterion],
    background: &BTreeSet<i64>,
) -> QueryResult<BTreeSet<i64>> {
    let mut records = background.clone();

    for (idx, criterion) in criteria.iter().enumerate() {
        let results = evaluate_criterion(store, schema, criterion)?;
        match aggregator {
            Aggregator::Any if idx == 0 => records = results,
            Aggregator::Any => records.extend(results),
            Aggregator::All => records.retain(|id| results.contains(id)),
        }
    }

    Ok(records)
}
