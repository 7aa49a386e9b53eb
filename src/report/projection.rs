//! Field projection of windowed rows.

use crate::model::DataRow;
use crate::pagination::Page;

/// Keep only the listed keys in each row's `data`. Listed keys missing from
/// a row are skipped.
pub fn filter_item_fields(field_names: &[String], response: &mut Page<DataRow>) {
    for row in &mut response.items {
        row.data = field_names
            .iter()
            .filter_map(|name| row.data.remove_entry(name))
            .collect();
    }
}
