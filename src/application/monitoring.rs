use crate::application::aggregate::count_changed_cells;
use crate::domain::diff_result::{DiffResult, TableDiffOutcome};
use crate::domain::error::BackendError;
use crate::domain::ports::{BatchDiffRequest, DiffBackend, TableDiffRequest};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::{info, instrument, warn};

// ─── PerfReport ──────────────────────────────────────────────────────────────

/// A single timed backend request.
#[derive(Debug, Clone, serde::Serialize)]
pub struct OpTiming {
    /// Operation name: "table_diff" or "batch_diff".
    pub operation: &'static str,
    /// Table the request was about, or "*" for a batch.
    pub table: String,
    /// Elapsed wall time in milliseconds.
    pub duration_ms: u128,
    /// Rows received (added + removed + changed, summed over a batch).
    pub rows: usize,
    pub ok: bool,
}

/// Accumulated request timings for one session.
///
/// Shared across decorator instances via `Arc<Mutex<_>>`. Render with
/// `presentation::cli_summary::print_perf_summary`.
#[derive(Debug, Default, Clone, serde::Serialize)]
pub struct PerfReport {
    pub timings: Vec<OpTiming>,
    pub total_rows_received: usize,
    pub total_ms: u128,
}

impl PerfReport {
    pub fn new() -> Arc<Mutex<Self>> {
        Arc::new(Mutex::new(Self::default()))
    }

    fn record(report: &Arc<Mutex<Self>>, timing: OpTiming) {
        if let Ok(mut r) = report.lock() {
            r.total_ms += timing.duration_ms;
            r.total_rows_received += timing.rows;
            r.timings.push(timing);
        }
    }
}

fn row_count(result: &DiffResult) -> usize {
    result.added.len() + result.removed.len() + result.changed.len()
}

// ─── MonitoringBackend ───────────────────────────────────────────────────────

/// Decorator: wraps any `DiffBackend`, measures wall time per request, and
/// appends the result to the shared `PerfReport`.
pub struct MonitoringBackend {
    inner: Arc<dyn DiffBackend>,
    report: Arc<Mutex<PerfReport>>,
}

impl MonitoringBackend {
    pub fn new(inner: Arc<dyn DiffBackend>, report: Arc<Mutex<PerfReport>>) -> Self {
        Self { inner, report }
    }
}

#[async_trait]
impl DiffBackend for MonitoringBackend {
    #[instrument(
        name = "table_diff",
        skip(self, request),
        fields(db.table = %request.table, db.key = %request.key),
        level = "info"
    )]
    async fn table_diff(&self, request: &TableDiffRequest) -> Result<DiffResult, BackendError> {
        let start = Instant::now();
        let outcome = self.inner.table_diff(request).await;
        let duration_ms = start.elapsed().as_millis();

        let rows = match &outcome {
            Ok(result) => {
                info!(
                    table = %request.table,
                    added = result.added.len(),
                    removed = result.removed.len(),
                    changed_rows = result.changed.len(),
                    changed_cells = count_changed_cells(result),
                    duration_ms,
                    "table_diff completed"
                );
                row_count(result)
            }
            Err(err) => {
                warn!(table = %request.table, duration_ms, error = %err, "table_diff failed");
                0
            }
        };

        PerfReport::record(
            &self.report,
            OpTiming {
                operation: "table_diff",
                table: request.table.0.clone(),
                duration_ms,
                rows,
                ok: outcome.is_ok(),
            },
        );

        outcome
    }

    #[instrument(
        name = "batch_diff",
        skip(self, request),
        fields(db.key = %request.key, detect_pk = request.detect_pk),
        level = "info"
    )]
    async fn batch_diff(
        &self,
        request: &BatchDiffRequest,
    ) -> Result<Vec<TableDiffOutcome>, BackendError> {
        let start = Instant::now();
        let outcome = self.inner.batch_diff(request).await;
        let duration_ms = start.elapsed().as_millis();

        let rows = match &outcome {
            Ok(outcomes) => {
                let failed = outcomes.iter().filter(|o| o.error.is_some()).count();
                info!(
                    tables = outcomes.len(),
                    failed,
                    duration_ms,
                    "batch_diff completed"
                );
                outcomes.iter().filter_map(|o| o.result.as_ref()).map(row_count).sum()
            }
            Err(err) => {
                warn!(duration_ms, error = %err, "batch_diff failed");
                0
            }
        };

        PerfReport::record(
            &self.report,
            OpTiming {
                operation: "batch_diff",
                table: "*".to_string(),
                duration_ms,
                rows,
                ok: outcome.is_ok(),
            },
        );

        outcome
    }
}
