use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

use crate::domain::diff_result::{DiffResult, TableDiffOutcome};
use crate::domain::error::BackendError;
use crate::domain::ports::{BatchDiffRequest, DiffBackend, TableDiffRequest};
use crate::infrastructure::config::BackendConfig;

const USER_AGENT: &str = concat!("rowlens/", env!("CARGO_PKG_VERSION"));

/// `DiffBackend` over the backend's JSON HTTP API.
///
/// - `GET /api/diff?schema=&table=&key=` → `DiffResult`
/// - `GET /api/diff/tables?schema=&key=&detectPk=` → `[TableDiffOutcome]`
pub struct HttpDiffBackend {
    client: Client,
    base_url: String,
}

/// Build an HTTP backend client from `cfg`.
///
/// No request is sent here; an unreachable backend only shows up on the
/// first diff.
pub fn connect(cfg: &BackendConfig) -> Result<HttpDiffBackend> {
    Url::parse(&cfg.base_url)
        .with_context(|| format!("Invalid backend base URL: {}", cfg.base_url))?;

    let mut builder = Client::builder().user_agent(USER_AGENT);
    if let Some(secs) = cfg.timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    let client = builder.build().context("Failed to build HTTP client")?;

    debug!("Diff backend at {}", cfg.base_url);

    Ok(HttpDiffBackend {
        client,
        base_url: cfg.base_url.trim_end_matches('/').to_string(),
    })
}

impl HttpDiffBackend {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, BackendError> {
        let url = self.url(path);
        debug!(%url, ?query, "GET");
        let res = self.client.get(&url).query(query).send().await?;
        parse_json_body(&url, res).await
    }
}

/// Read the body of `res`; a non-success status becomes
/// [`BackendError::Status`] carrying the raw body text.
async fn parse_json_body<T: DeserializeOwned>(url: &str, res: Response) -> Result<T, BackendError> {
    let status = res.status();
    let body = res.text().await?;
    if !status.is_success() {
        warn!(%url, status = status.as_u16(), "backend returned an error");
        return Err(BackendError::Status {
            status: status.as_u16(),
            body,
        });
    }
    serde_json::from_str(&body).map_err(|e| BackendError::Decode(e.to_string()))
}

#[async_trait]
impl DiffBackend for HttpDiffBackend {
    async fn table_diff(&self, request: &TableDiffRequest) -> Result<DiffResult, BackendError> {
        let mut query = Vec::with_capacity(3);
        if let Some(schema) = &request.schema {
            query.push(("schema", schema.0.as_str()));
        }
        query.push(("table", request.table.0.as_str()));
        query.push(("key", request.key.0.as_str()));
        self.get_json("/api/diff", &query).await
    }

    async fn batch_diff(
        &self,
        request: &BatchDiffRequest,
    ) -> Result<Vec<TableDiffOutcome>, BackendError> {
        let mut query = Vec::with_capacity(3);
        if let Some(schema) = &request.schema {
            query.push(("schema", schema.0.as_str()));
        }
        query.push(("key", request.key.0.as_str()));
        query.push(("detectPk", if request.detect_pk { "true" } else { "false" }));
        self.get_json("/api/diff/tables", &query).await
    }
}
