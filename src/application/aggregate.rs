use std::collections::BTreeSet;

use crate::application::reconcile::reconcile;
use crate::domain::diff_result::DiffResult;
use crate::domain::row::Row;

/// Union of the columns of `rows`, in first-seen order.
pub fn columns_of(rows: &[Row]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    rows.iter()
        .flat_map(Row::columns)
        .filter(|c| seen.insert(*c))
        .map(str::to_string)
        .collect()
}

/// Number of changed cells (not rows) in `result`.
///
/// An entry with an explicit `changed_columns` list contributes its length;
/// any other entry contributes the number of columns its reconciliation
/// marks as changed.
pub fn count_changed_cells(result: &DiffResult) -> usize {
    result
        .changed
        .iter()
        .map(|entry| match &entry.changed_columns {
            Some(cols) => cols.len(),
            None => reconcile(entry).changed_count(),
        })
        .sum()
}
