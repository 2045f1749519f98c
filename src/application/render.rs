use crate::application::aggregate::{columns_of, count_changed_cells};
use crate::application::escape::escape;
use crate::application::inline_diff::diff;
use crate::application::keys::display_key;
use crate::application::reconcile::reconcile;
use crate::domain::diff_result::{DiffResult, TableDiffOutcome};
use crate::domain::fragment::DisplayFragment;
use crate::domain::report::{
    BatchLine, BatchReport, ChangedLine, ReportSummary, RowTable, TableReport,
};
use crate::domain::row::{Cell, Row};

/// Status text of a batch line without an error.
pub const STATUS_OK: &str = "OK";

// ─── Single table ─────────────────────────────────────────────────────────────

/// Render one table's diff: summary, added and removed grids, and one line per
/// `(changed entry, display column)` with inline highlights.
pub fn render_table(result: &DiffResult) -> TableReport {
    let changed = result
        .changed
        .iter()
        .flat_map(|entry| {
            let rec = reconcile(entry);
            let left = entry.left_row.as_ref();
            let right = entry.right_row.as_ref();
            rec.display_columns
                .iter()
                .map(|col| ChangedLine {
                    key: entry.key.clone(),
                    column: col.clone(),
                    changed: rec.is_changed(col),
                    cell: diff(Cell::of(left, col), Cell::of(right, col)),
                })
                .collect::<Vec<_>>()
        })
        .collect();

    TableReport {
        summary: ReportSummary {
            schema: result.schema.clone(),
            table: result.table.clone(),
            key_column: result.key_column.clone(),
            added: result.added.len(),
            removed: result.removed.len(),
            changed_rows: result.changed.len(),
            changed_cells: count_changed_cells(result),
        },
        added: row_table(&result.added),
        removed: row_table(&result.removed),
        changed,
    }
}

fn row_table(rows: &[Row]) -> RowTable {
    let columns = columns_of(rows);
    let rows = rows
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|col| DisplayFragment::plain(escape(row.cell(col))))
                .collect()
        })
        .collect();
    RowTable { columns, rows }
}

// ─── Batch ────────────────────────────────────────────────────────────────────

/// Render the batch list: one line per outcome.
///
/// `fallback_key` is the key the user typed, used when neither the outcome
/// nor its result names one.
pub fn render_batch(outcomes: &[TableDiffOutcome], fallback_key: Option<&str>) -> BatchReport {
    let lines = outcomes
        .iter()
        .map(|o| {
            let result = o.result.as_ref();
            BatchLine {
                table: o.table.clone(),
                key_column: display_key(o, fallback_key).map(str::to_string),
                added: result.map(|r| r.added.len()),
                removed: result.map(|r| r.removed.len()),
                changed_cells: result.map(count_changed_cells),
                status: o.error.clone().unwrap_or_else(|| STATUS_OK.to_string()),
                ok: o.error.is_none(),
            }
        })
        .collect();
    BatchReport { lines }
}
