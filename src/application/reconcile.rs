use std::collections::{BTreeMap, BTreeSet};

use crate::domain::diff_result::ChangedEntry;
use crate::domain::row::Cell;

/// Display columns of a changed row and, per column, whether it differs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Reconciliation {
    pub display_columns: Vec<String>,
    pub changed: BTreeMap<String, bool>,
}

impl Reconciliation {
    pub fn is_changed(&self, column: &str) -> bool {
        self.changed.get(column).copied().unwrap_or(false)
    }

    pub fn changed_count(&self) -> usize {
        self.changed.values().filter(|c| **c).count()
    }
}

/// Work out which columns to show for `entry` and which of them changed.
///
/// Columns are the left row's keys in order followed by the right row's
/// unseen keys. With no keys on either side the explicit `changed_columns`
/// list is used, if any.
///
/// An explicit `changed_columns` list is authoritative, even when empty.
/// Without one, a column changed when its left and right cells differ, with
/// an absent column unequal to every present value (`null` and `""` included).
pub fn reconcile(entry: &ChangedEntry) -> Reconciliation {
    let mut display_columns = union_columns(entry);
    if display_columns.is_empty() {
        if let Some(explicit) = &entry.changed_columns {
            display_columns = dedup(explicit.iter().map(String::as_str));
        }
    }

    let changed = display_columns
        .iter()
        .map(|col| (col.clone(), column_changed(entry, col)))
        .collect();

    Reconciliation {
        display_columns,
        changed,
    }
}

/// Whether `column` differs in `entry`, without building the full column set.
pub fn column_changed(entry: &ChangedEntry, column: &str) -> bool {
    match &entry.changed_columns {
        Some(explicit) => explicit.iter().any(|c| c == column),
        None => {
            !Cell::of(entry.left_row.as_ref(), column)
                .same_value(&Cell::of(entry.right_row.as_ref(), column))
        }
    }
}

fn union_columns(entry: &ChangedEntry) -> Vec<String> {
    let left = entry.left_row.iter().flat_map(|r| r.columns());
    let right = entry.right_row.iter().flat_map(|r| r.columns());
    dedup(left.chain(right))
}

fn dedup<'a>(columns: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = BTreeSet::new();
    columns
        .filter(|c| seen.insert(*c))
        .map(str::to_string)
        .collect()
}
