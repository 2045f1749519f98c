use anyhow::Result;
use std::sync::{Arc, Mutex};
use tracing::debug;

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

// ─── Log level ────────────────────────────────────────────────────────────────

/// Controls the verbosity of rowlens' internal tracing output.
///
/// Pass to [`init_tracing`] before calling any async entry point.
///
/// | Variant | `tracing` level | When to use                               |
/// |---------|-----------------|-------------------------------------------|
/// | `Error` | `error`         | `--quiet` / CI scripting                  |
/// | `Info`  | `info`          | Default, shows one line per request       |
/// | `Debug` | `debug`         | `--verbose`, shows URLs and stale replies |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Error,
    #[default]
    Info,
    Debug,
}

/// Initialise the global `tracing` subscriber for rowlens.
///
/// Respects `RUST_LOG` when set, falling back to `level` otherwise. Library
/// consumers who manage their own subscriber should skip this.
///
/// Only available with the `cli` feature (pulls in `tracing-subscriber`).
#[cfg(feature = "cli")]
pub fn init_tracing(level: LogLevel) {
    use tracing_subscriber::fmt::format::FmtSpan;

    let default_filter = match level {
        LogLevel::Error => "rowlens=error",
        LogLevel::Info => "rowlens=info",
        LogLevel::Debug => "rowlens=debug",
    };

    tracing_subscriber::fmt()
        .with_span_events(FmtSpan::CLOSE)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();
}

// ─── Public API Facade ───

pub use application::monitoring::PerfReport;
pub use application::session::{DiffSession, ViewState};
pub use domain::diff_result::{ChangedEntry, DiffResult, TableDiffOutcome};
pub use domain::error::{BackendError, ViewError};
pub use domain::ports::DiffBackend;
pub use domain::report::Report;
pub use domain::row::{Cell, Row};
pub use infrastructure::config::{AppConfig, BackendConfig, OutputConfig, ViewConfig};

use crate::application::monitoring::MonitoringBackend;
use crate::infrastructure::http::client::connect;

/// What to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Detail view of one table.
    Table { table: String, key: Option<String> },
    /// Compare every listed table, then optionally open one of them.
    Tables {
        key: Option<String>,
        open: Option<String>,
    },
}

// ─── Public entry points ───

/// Run `action` against the configured backend and return the rendered view.
///
/// Backend and validation failures do not fail the call: they end up in
/// [`Report::error`], the way the view shows them.
pub async fn run(cfg: &AppConfig, schema: Option<&str>, action: &Action) -> Result<Report> {
    let (report, _) = run_with_timing(cfg, schema, action).await?;
    Ok(report)
}

/// [`run`] plus a [`PerfReport`] of every backend request it made.
///
/// `schema` overrides `view.schema` from the configuration.
pub async fn run_with_timing(
    cfg: &AppConfig,
    schema: Option<&str>,
    action: &Action,
) -> Result<(Report, PerfReport)> {
    let perf = PerfReport::new();
    let session = build_session(cfg, Arc::clone(&perf))?
        .with_schema(schema.or(cfg.view.schema.as_deref()));

    let default_key = cfg.view.default_key.as_deref();
    match action {
        Action::Table { table, key } => {
            let key = key.as_deref().or(default_key).unwrap_or_default();
            if let Err(err) = session.submit(table, key).await {
                debug!(%err, "table diff failed, error kept in the view");
            }
        }
        Action::Tables { key, open } => {
            let key = key.as_deref().or(default_key);
            match session.compare_listed(key).await {
                Err(err) => debug!(%err, "batch diff failed, error kept in the view"),
                Ok(()) => {
                    if let Some(table) = open {
                        if let Err(err) = session.open_listed(table).await {
                            debug!(%err, "opening table failed, error kept in the view");
                        }
                    }
                }
            }
        }
    }

    let report = session.render();
    let perf = perf.lock().map(|r| r.clone()).unwrap_or_default();
    Ok((report, perf))
}

/// Build a [`DiffSession`] over the configured HTTP backend, timed into
/// `perf`.
pub fn build_session(cfg: &AppConfig, perf: Arc<Mutex<PerfReport>>) -> Result<DiffSession> {
    let backend = Arc::new(connect(&cfg.backend)?);
    Ok(DiffSession::new(Arc::new(MonitoringBackend::new(
        backend, perf,
    ))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn config(base_url: String) -> AppConfig {
        AppConfig {
            backend: BackendConfig {
                base_url,
                timeout_secs: Some(5),
            },
            view: ViewConfig {
                schema: Some("APP".to_string()),
                default_key: Some("ID".to_string()),
            },
            output: OutputConfig {
                dir: "out".to_string(),
            },
        }
    }

    #[tokio::test]
    async fn table_action_uses_configured_key_and_schema() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/diff")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("schema".into(), "APP".into()),
                Matcher::UrlEncoded("table".into(), "ORDERS".into()),
                Matcher::UrlEncoded("key".into(), "ID".into()),
            ]))
            .with_body(
                json!({
                    "table": "ORDERS",
                    "keyColumn": "ID",
                    "changed": [{
                        "key": "ID=1",
                        "leftRow": {"ID": 1, "QTY": 2},
                        "rightRow": {"ID": 1, "QTY": 3}
                    }]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let action = Action::Table {
            table: "ORDERS".to_string(),
            key: None,
        };
        let (report, perf) = run_with_timing(&config(server.url()), None, &action)
            .await
            .unwrap();

        mock.assert_async().await;
        assert!(report.error.is_none());
        assert_eq!(report.table.unwrap().summary.changed_cells, 1);
        assert_eq!(perf.timings.len(), 1);
        assert!(perf.timings[0].ok);
    }

    #[tokio::test]
    async fn backend_failure_lands_in_the_report() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/diff/tables")
            .match_query(Matcher::Any)
            .with_status(500)
            .with_body("schema APP does not exist")
            .create_async()
            .await;

        let action = Action::Tables {
            key: None,
            open: Some("ORDERS".to_string()),
        };
        let report = run(&config(server.url()), None, &action).await.unwrap();

        assert_eq!(report.error.as_deref(), Some("schema APP does not exist"));
        assert!(report.batch.is_none());
        assert!(report.table.is_none());
    }

    #[tokio::test]
    async fn tables_action_opens_the_requested_table() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/diff/tables")
            .match_query(Matcher::UrlEncoded("key".into(), "CODE".into()))
            .with_body(
                json!([
                    {"table": "A", "keyColumn": "CODE", "result": {"table": "A", "keyColumn": "CODE"}},
                    {"table": "B", "keyColumn": "CODE", "result": {"table": "B", "keyColumn": "CODE", "removed": [{"CODE": "x"}]}}
                ])
                .to_string(),
            )
            .create_async()
            .await;
        let detail = server
            .mock("GET", "/api/diff")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("table".into(), "B".into()),
                Matcher::UrlEncoded("key".into(), "CODE".into()),
            ]))
            .with_body(json!({"table": "B", "keyColumn": "CODE", "removed": [{"CODE": "x"}]}).to_string())
            .create_async()
            .await;

        let action = Action::Tables {
            key: Some("CODE".to_string()),
            open: Some("B".to_string()),
        };
        let report = run(&config(server.url()), Some("OTHER"), &action)
            .await
            .unwrap();

        detail.assert_async().await;
        assert_eq!(report.schema.as_deref(), Some("OTHER"));
        assert_eq!(report.batch.unwrap().lines.len(), 2);
        assert_eq!(report.table.unwrap().summary.removed, 1);
    }
}
