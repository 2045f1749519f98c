use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use crate::application::keys::{first_non_empty, resolve_detail_key};
use crate::application::render::{render_batch, render_table};
use crate::domain::diff_result::{DiffResult, TableDiffOutcome};
use crate::domain::error::ViewError;
use crate::domain::ports::{BatchDiffRequest, DiffBackend, TableDiffRequest};
use crate::domain::report::Report;
use crate::domain::value_objects::{KeyColumn, Schema, TableName, DEFAULT_BATCH_KEY};

/// The current view: form fields plus the outcome of the last action.
///
/// Replaced piecewise by each action, never patched incrementally.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    pub schema: Option<String>,
    pub table: String,
    pub key: String,
    pub loading: bool,
    pub error: Option<String>,
    pub result: Option<DiffResult>,
    pub batch: Option<Vec<TableDiffOutcome>>,
}

struct Inner {
    view: ViewState,
    generation: u64,
}

/// Stamp of the action that issued a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Ticket(u64);

// ─────────────────────────────────────────────────────────────────────────────
// DiffSession
// ─────────────────────────────────────────────────────────────────────────────

/// Drives the three user actions against a [`DiffBackend`] and owns the view.
///
/// Each action takes a new generation number before it does anything. When a
/// response comes back the view is only updated if no later action has
/// started in the meantime, so a slow stale response can never overwrite a
/// newer one. The loading flag follows the latest action only.
///
/// The state lock is never held across an `.await`.
pub struct DiffSession {
    backend: Arc<dyn DiffBackend>,
    inner: Mutex<Inner>,
}

impl DiffSession {
    pub fn new(backend: Arc<dyn DiffBackend>) -> Self {
        Self {
            backend,
            inner: Mutex::new(Inner {
                view: ViewState::default(),
                generation: 0,
            }),
        }
    }

    pub fn with_schema(self, schema: Option<&str>) -> Self {
        self.lock().view.schema = Schema::non_blank(schema).map(|s| s.0);
        self
    }

    /// Copy of the current view.
    pub fn snapshot(&self) -> ViewState {
        self.lock().view.clone()
    }

    /// Render the current view for the output writers.
    pub fn render(&self) -> Report {
        let view = self.snapshot();
        let fallback = Some(view.key.as_str());
        Report::new(
            view.schema.clone(),
            view.batch.as_deref().map(|b| render_batch(b, fallback)),
            view.result.as_ref().map(render_table),
            view.error.clone(),
        )
    }

    // ─── Actions ─────────────────────────────────────────────────────────────

    /// Compare one table by `key`. Both fields are required.
    pub async fn submit(&self, table: &str, key: &str) -> Result<(), ViewError> {
        let ticket = self.start(|v| {
            v.result = None;
            v.batch = None;
            v.table = table.to_string();
            v.key = key.to_string();
        });

        let (Some(table), Some(key)) = (first_non_empty([Some(table)]), first_non_empty([Some(key)]))
        else {
            return self.fail(ticket, ViewError::MissingFields);
        };

        let request = TableDiffRequest {
            schema: self.schema(),
            table: TableName(table.to_string()),
            key: KeyColumn(key.to_string()),
        };
        info!(table = %request.table, key = %request.key, "requesting table diff");

        let outcome = self.backend.table_diff(&request).await;
        self.finish(ticket, outcome.map_err(ViewError::from), |v, result| {
            v.result = Some(result)
        })
    }

    /// Compare every table the backend lists, matching rows on `key`.
    ///
    /// Falls back to `ID` when `key` is missing or blank. Primary-key
    /// detection is always disabled so every table uses the same key.
    pub async fn compare_listed(&self, key: Option<&str>) -> Result<(), ViewError> {
        let ticket = self.start(|v| {
            v.result = None;
            v.batch = None;
            if let Some(k) = key {
                v.key = k.to_string();
            }
        });

        let request = BatchDiffRequest {
            schema: self.schema(),
            key: KeyColumn(first_non_empty([key]).unwrap_or(DEFAULT_BATCH_KEY).to_string()),
            detect_pk: false,
        };
        info!(key = %request.key, "requesting batch diff");

        let outcome = self.backend.batch_diff(&request).await;
        self.finish(ticket, outcome.map_err(ViewError::from), |v, outcomes| {
            v.batch = Some(outcomes)
        })
    }

    /// Open the detail view of one batch outcome. The batch list is kept.
    ///
    /// The key comes from the outcome, then its result, then the form's key.
    /// Without any, nothing is requested.
    pub async fn open_table(&self, outcome: &TableDiffOutcome) -> Result<(), ViewError> {
        let fallback = self.lock().view.key.clone();
        let resolved = resolve_detail_key(outcome, Some(fallback.as_str()));

        let ticket = self.start(|v| {
            v.result = None;
            if let Ok(key) = &resolved {
                v.table = outcome.table.clone();
                v.key = key.0.clone();
            }
        });

        let key = match resolved {
            Ok(key) => key,
            Err(err) => return self.fail(ticket, err),
        };

        let request = TableDiffRequest {
            schema: self.schema(),
            table: TableName(outcome.table.clone()),
            key,
        };
        info!(table = %request.table, key = %request.key, "opening table detail");

        let outcome = self.backend.table_diff(&request).await;
        self.finish(ticket, outcome.map_err(ViewError::from), |v, result| {
            v.result = Some(result)
        })
    }

    /// [`open_table`](Self::open_table) for the batch outcome named `table`.
    pub async fn open_listed(&self, table: &str) -> Result<(), ViewError> {
        let found = self
            .lock()
            .view
            .batch
            .as_ref()
            .and_then(|b| b.iter().find(|o| o.table == table).cloned());

        match found {
            Some(outcome) => self.open_table(&outcome).await,
            None => {
                let ticket = self.start(|v| v.result = None);
                self.fail(ticket, ViewError::UnknownTable(table.to_string()))
            }
        }
    }

    // ─── Private helpers ─────────────────────────────────────────────────────

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn schema(&self) -> Option<Schema> {
        Schema::non_blank(self.lock().view.schema.as_deref())
    }

    /// Begin a new action: bump the generation, reset the view, set loading.
    fn start(&self, reset: impl FnOnce(&mut ViewState)) -> Ticket {
        let mut inner = self.lock();
        inner.generation += 1;
        inner.view.error = None;
        inner.view.loading = true;
        reset(&mut inner.view);
        Ticket(inner.generation)
    }

    /// Complete an action. Runs on every path, success or failure.
    ///
    /// A stale ticket leaves the view untouched; the caller still gets its
    /// own outcome back.
    fn finish<T>(
        &self,
        ticket: Ticket,
        outcome: Result<T, ViewError>,
        apply: impl FnOnce(&mut ViewState, T),
    ) -> Result<(), ViewError> {
        let mut inner = self.lock();
        if inner.generation != ticket.0 {
            debug!(
                stale = ticket.0,
                latest = inner.generation,
                "discarding stale response"
            );
            return outcome.map(|_| ());
        }

        inner.view.loading = false;
        match outcome {
            Ok(value) => {
                apply(&mut inner.view, value);
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "action failed");
                inner.view.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    fn fail(&self, ticket: Ticket, err: ViewError) -> Result<(), ViewError> {
        self.finish::<()>(ticket, Err(err), |_, ()| {})
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::BackendError;
    use async_trait::async_trait;
    use std::time::Duration;
    use tokio::sync::Notify;

    /// Backend double: records every request, answers from the table name.
    ///
    /// `SLOW` sleeps before answering, `BROKEN` fails with a 500, `GATED`
    /// waits for `gate` to be notified.
    #[derive(Default)]
    struct ScriptedBackend {
        requests: Mutex<Vec<String>>,
        batch: Vec<TableDiffOutcome>,
        gate: Arc<Notify>,
    }

    impl ScriptedBackend {
        fn with_batch(batch: Vec<TableDiffOutcome>) -> Self {
            Self {
                batch,
                ..Default::default()
            }
        }

        fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl DiffBackend for ScriptedBackend {
        async fn table_diff(&self, request: &TableDiffRequest) -> Result<DiffResult, BackendError> {
            self.requests.lock().unwrap().push(format!(
                "table {} {} {:?}",
                request.table.0,
                request.key.0,
                request.schema.as_ref().map(|s| s.0.as_str())
            ));
            match request.table.0.as_str() {
                "SLOW" => tokio::time::sleep(Duration::from_millis(80)).await,
                "GATED" => self.gate.notified().await,
                "BROKEN" => {
                    return Err(BackendError::Status {
                        status: 500,
                        body: "Error computing diff: ORA-00942".to_string(),
                    })
                }
                _ => {}
            }
            Ok(DiffResult {
                table: request.table.0.clone(),
                key_column: request.key.0.clone(),
                ..Default::default()
            })
        }

        async fn batch_diff(
            &self,
            request: &BatchDiffRequest,
        ) -> Result<Vec<TableDiffOutcome>, BackendError> {
            self.requests.lock().unwrap().push(format!(
                "batch {} detect_pk={}",
                request.key.0, request.detect_pk
            ));
            Ok(self.batch.clone())
        }
    }

    fn session(backend: &Arc<ScriptedBackend>) -> DiffSession {
        DiffSession::new(Arc::clone(backend) as Arc<dyn DiffBackend>)
    }

    fn keyless(table: &str) -> TableDiffOutcome {
        TableDiffOutcome {
            table: table.to_string(),
            key_column: None,
            result: None,
            error: Some("No key available (no PK detected and no default key provided)".into()),
        }
    }

    #[tokio::test]
    async fn submit_requires_table_and_key() {
        let backend = Arc::new(ScriptedBackend::default());
        let s = session(&backend);

        let err = s.submit("ACCOUNTS", "  ").await.unwrap_err();
        assert_eq!(err, ViewError::MissingFields);

        let view = s.snapshot();
        assert_eq!(
            view.error.as_deref(),
            Some("Please enter required fields: table and key.")
        );
        assert!(!view.loading);
        assert!(backend.requests().is_empty());
    }

    #[tokio::test]
    async fn submit_stores_result_and_clears_loading() {
        let backend = Arc::new(ScriptedBackend::default());
        let s = session(&backend).with_schema(Some("APP"));

        s.submit("ACCOUNTS", "ID").await.unwrap();

        let view = s.snapshot();
        assert!(!view.loading);
        assert!(view.error.is_none());
        assert_eq!(view.result.unwrap().table, "ACCOUNTS");
        assert_eq!(backend.requests(), ["table ACCOUNTS ID Some(\"APP\")"]);
    }

    #[tokio::test]
    async fn backend_failure_surfaces_raw_body() {
        let backend = Arc::new(ScriptedBackend::default());
        let s = session(&backend);

        let err = s.submit("BROKEN", "ID").await.unwrap_err();
        assert!(matches!(err, ViewError::Backend(BackendError::Status { status: 500, .. })));

        let view = s.snapshot();
        assert_eq!(view.error.as_deref(), Some("Error computing diff: ORA-00942"));
        assert!(view.result.is_none());
        assert!(!view.loading);
    }

    #[tokio::test]
    async fn compare_listed_defaults_key_to_id() {
        let backend = Arc::new(ScriptedBackend::with_batch(vec![keyless("LEDGER")]));
        let s = session(&backend);

        s.compare_listed(None).await.unwrap();
        s.compare_listed(Some(" ")).await.unwrap();
        s.compare_listed(Some("CODE")).await.unwrap();

        assert_eq!(
            backend.requests(),
            [
                "batch ID detect_pk=false",
                "batch ID detect_pk=false",
                "batch CODE detect_pk=false"
            ]
        );
        assert_eq!(s.snapshot().batch.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn open_table_without_any_key_issues_no_request() {
        let backend = Arc::new(ScriptedBackend::with_batch(vec![keyless("LEDGER")]));
        let s = session(&backend);
        s.compare_listed(None).await.unwrap();

        let err = s.open_listed("LEDGER").await.unwrap_err();
        assert_eq!(
            err,
            ViewError::NoKeyAvailable {
                table: "LEDGER".to_string()
            }
        );

        let view = s.snapshot();
        assert_eq!(
            view.error.as_deref(),
            Some("No key available to open diff for table LEDGER.")
        );
        assert!(view.batch.is_some(), "batch list is kept");
        assert_eq!(backend.requests(), ["batch ID detect_pk=false"]);
    }

    #[tokio::test]
    async fn open_table_uses_form_key_as_fallback_and_keeps_batch() {
        let backend = Arc::new(ScriptedBackend::with_batch(vec![keyless("LEDGER")]));
        let s = session(&backend);
        s.compare_listed(Some("LEDGER_ID")).await.unwrap();

        s.open_listed("LEDGER").await.unwrap();

        let view = s.snapshot();
        assert_eq!(view.table, "LEDGER");
        assert_eq!(view.key, "LEDGER_ID");
        assert_eq!(view.result.unwrap().key_column, "LEDGER_ID");
        assert!(view.batch.is_some());
    }

    #[tokio::test]
    async fn open_table_prefers_outcome_key() {
        let backend = Arc::new(ScriptedBackend::default());
        let s = session(&backend);
        let outcome = TableDiffOutcome {
            table: "ORDERS".to_string(),
            key_column: Some("ORDER_NO".to_string()),
            result: Some(DiffResult {
                key_column: "ID".to_string(),
                ..Default::default()
            }),
            error: None,
        };

        s.open_table(&outcome).await.unwrap();
        assert_eq!(backend.requests(), ["table ORDERS ORDER_NO None"]);
    }

    #[tokio::test]
    async fn open_unknown_table_fails_locally() {
        let backend = Arc::new(ScriptedBackend::default());
        let s = session(&backend);
        let err = s.open_listed("NOPE").await.unwrap_err();
        assert_eq!(err, ViewError::UnknownTable("NOPE".to_string()));
        assert!(backend.requests().is_empty());
    }

    #[tokio::test]
    async fn stale_response_does_not_clobber_newer_one() {
        let backend = Arc::new(ScriptedBackend::default());
        let s = session(&backend);

        // SLOW is issued first but answers last.
        let (slow, fast) = tokio::join!(s.submit("SLOW", "ID"), s.submit("FAST", "ID"));
        slow.unwrap();
        fast.unwrap();

        let view = s.snapshot();
        assert_eq!(view.result.unwrap().table, "FAST");
        assert!(!view.loading);
    }

    #[tokio::test]
    async fn loading_is_set_while_request_is_outstanding() {
        let backend = Arc::new(ScriptedBackend::default());
        let s = session(&backend);

        let observe = async {
            tokio::task::yield_now().await;
            let loading = s.snapshot().loading;
            backend.gate.notify_one();
            loading
        };
        let (outcome, loading_during) = tokio::join!(s.submit("GATED", "ID"), observe);

        outcome.unwrap();
        assert!(loading_during);
        assert!(!s.snapshot().loading);
    }

    #[tokio::test]
    async fn render_reflects_batch_and_detail() {
        let backend = Arc::new(ScriptedBackend::with_batch(vec![keyless("LEDGER")]));
        let s = session(&backend).with_schema(Some("APP"));
        s.compare_listed(Some("ID")).await.unwrap();
        s.open_listed("LEDGER").await.unwrap();

        let report = s.render();
        assert_eq!(report.schema.as_deref(), Some("APP"));
        assert_eq!(report.batch.unwrap().lines[0].key_column.as_deref(), Some("ID"));
        assert_eq!(report.table.unwrap().summary.table, "LEDGER");
        assert!(report.error.is_none());
    }
}
