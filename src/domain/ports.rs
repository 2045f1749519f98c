use crate::domain::{
    diff_result::{DiffResult, TableDiffOutcome},
    error::BackendError,
    report::Report,
    value_objects::{KeyColumn, Schema, TableName},
};
use anyhow::Result;
use async_trait::async_trait;

/// Parameters of a single-table diff request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDiffRequest {
    pub schema: Option<Schema>,
    pub table: TableName,
    pub key: KeyColumn,
}

/// Parameters of a diff over every table the backend has listed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchDiffRequest {
    pub schema: Option<Schema>,
    pub key: KeyColumn,
    /// Let the backend detect each table's primary key instead of using `key`.
    pub detect_pk: bool,
}

/// Port: the external diff backend (implemented by HttpDiffBackend)
#[async_trait]
pub trait DiffBackend: Send + Sync {
    async fn table_diff(&self, request: &TableDiffRequest) -> Result<DiffResult, BackendError>;

    async fn batch_diff(
        &self,
        request: &BatchDiffRequest,
    ) -> Result<Vec<TableDiffOutcome>, BackendError>;
}

/// Port: output formatting (implemented by JsonWriter, HtmlWriter)
pub trait OutputWriter: Send + Sync {
    /// Serializes the report to a string (JSON, HTML, etc.)
    fn format(&self, report: &Report) -> Result<String>;
    /// Extension of the produced file (e.g. "json", "html")
    fn extension(&self) -> &'static str;
}
