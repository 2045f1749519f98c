use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::fragment::{CellDiff, DisplayFragment};

/// Rendered view of the current session state, consumed by output writers.
///
/// Holds the batch list and the opened table detail side by side: opening a
/// table from a batch keeps the batch so the reader can move between tables.
#[derive(Debug, Serialize, Clone)]
pub struct Report {
    pub report_id: String,
    pub created_at: String,
    pub schema: Option<String>,
    pub batch: Option<BatchReport>,
    pub table: Option<TableReport>,
    /// Displayable message of the last failed action.
    pub error: Option<String>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ReportSummary {
    pub schema: Option<String>,
    pub table: String,
    pub key_column: String,
    pub added: usize,
    pub removed: usize,
    /// Row-level count of changed entries.
    pub changed_rows: usize,
    /// Cell-level count: one row with three differing columns counts three.
    pub changed_cells: usize,
}

/// Rows only present on one side, as a column-aligned grid of escaped cells.
#[derive(Debug, Serialize, Clone, Default, PartialEq)]
pub struct RowTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<DisplayFragment>>,
}

/// One `(changed entry, column)` pair of the changed-rows table.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ChangedLine {
    pub key: String,
    pub column: String,
    pub changed: bool,
    pub cell: CellDiff,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct TableReport {
    pub summary: ReportSummary,
    pub added: RowTable,
    pub removed: RowTable,
    pub changed: Vec<ChangedLine>,
}

/// One table of a batch comparison.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct BatchLine {
    pub table: String,
    pub key_column: Option<String>,
    pub added: Option<usize>,
    pub removed: Option<usize>,
    pub changed_cells: Option<usize>,
    /// Error text from the backend, or `OK`.
    pub status: String,
    pub ok: bool,
}

#[derive(Debug, Serialize, Clone, Default, PartialEq)]
pub struct BatchReport {
    pub lines: Vec<BatchLine>,
}

impl Report {
    pub fn new(
        schema: Option<String>,
        batch: Option<BatchReport>,
        table: Option<TableReport>,
        error: Option<String>,
    ) -> Self {
        Report {
            report_id: format!(
                "rv_{}_{}",
                Utc::now().format("%Y%m%d_%H%M%S"),
                Uuid::new_v4().simple()
            ),
            created_at: Utc::now().to_rfc3339(),
            schema,
            batch,
            table,
            error,
        }
    }

    /// `true` when there is nothing to show: no batch, no table, no error.
    pub fn is_empty(&self) -> bool {
        self.batch.is_none() && self.table.is_none() && self.error.is_none()
    }
}

impl TableReport {
    /// Changed lines whose column actually differs.
    pub fn differing_lines(&self) -> impl Iterator<Item = &ChangedLine> {
        self.changed.iter().filter(|l| l.changed)
    }
}

impl BatchReport {
    pub fn failed(&self) -> usize {
        self.lines.iter().filter(|l| !l.ok).count()
    }
}
