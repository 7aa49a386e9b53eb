//! Criterion evaluation against stored rows.

use std::collections::BTreeSet;

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::QueryResult;
use crate::model::scalar::{compare_stored, textual_form};
use crate::model::{Criterion, Operator, Scalar, Schema};
use crate::store::Store;

/// Record ids whose row satisfies `criterion`.
///
/// The instrument is resolved by name and the row category by the field's
/// owning instrument. Only rows of the named instrument are scanned.
pub fn evaluate_criterion(
    store: &Store,
    schema: &Schema,
    criterion: &Criterion,
) -> QueryResult<BTreeSet<i64>> {
    let instrument_idx = schema.find_instrument(&criterion.path.instrument)?;
    let instrument = schema.instrument(instrument_idx);
    let category = schema.category_of_field(&criterion.path.field)?;

    let owner = schema.owner_of(schema.find_field(&criterion.path.field)?);
    if owner != instrument_idx {
        warn!(
            field = %criterion.path.field,
            named = %instrument.name,
            owner = %schema.instrument(owner).name,
            "criterion names an instrument that does not own the field"
        );
    }

    let mut matched = BTreeSet::new();
    for (record_id, stored) in store.scan_field(category, instrument.id, &criterion.path.field)? {
        if matches(criterion, stored.as_ref())? {
            matched.insert(record_id);
        }
    }

    debug!(
        criterion = %format!("{} {} {:?}", criterion.path, criterion.operator, criterion.value),
        category = %category,
        matched = matched.len(),
        "evaluated criterion"
    );
    Ok(matched)
}

/// Apply one criterion to one stored value.
pub fn matches(criterion: &Criterion, stored: Option<&Value>) -> QueryResult<bool> {
    if criterion.value == Scalar::Null {
        let present = textual_form(stored).is_some();
        return Ok(match criterion.operator {
            Operator::Eq => !present,
            Operator::Ne => present,
            _ => false,
        });
    }

    let ordering = compare_stored(&criterion.path.field, stored, &criterion.value)?;
    Ok(ordering.is_some_and(|o| criterion.operator.accepts(o)))
}
