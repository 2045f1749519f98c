use serde::{Deserialize, Serialize};

use crate::domain::row::{null_as_default, Row};

/// A row matched on both sides whose values differ in at least one column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangedEntry {
    /// Backend-built key identifying the matched row (e.g. `ID=42`).
    #[serde(default, deserialize_with = "null_as_default")]
    pub key: String,
    #[serde(default)]
    pub left_row: Option<Row>,
    #[serde(default)]
    pub right_row: Option<Row>,
    /// When present, the authoritative list of differing columns.
    #[serde(default)]
    pub changed_columns: Option<Vec<String>>,
}

/// Row-level diff of one table between the left and the right database.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffResult {
    #[serde(default)]
    pub schema: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub table: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub key_column: String,
    /// Rows only present on the right side.
    #[serde(default, deserialize_with = "null_as_default")]
    pub added: Vec<Row>,
    /// Rows only present on the left side.
    #[serde(default, deserialize_with = "null_as_default")]
    pub removed: Vec<Row>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub changed: Vec<ChangedEntry>,
}

/// Per-table outcome of a batch comparison: either a result or an error.
///
/// Both absent means the table has not been computed yet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableDiffOutcome {
    #[serde(default, deserialize_with = "null_as_default")]
    pub table: String,
    #[serde(default)]
    pub key_column: Option<String>,
    #[serde(default)]
    pub result: Option<DiffResult>,
    #[serde(default)]
    pub error: Option<String>,
}

impl DiffResult {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_backend_payload() {
        let payload = json!({
            "schema": "APP",
            "table": "ACCOUNTS",
            "keyColumn": "ID",
            "added": [{"ID": 3, "NAME": "Carol"}],
            "removed": [],
            "changed": [{
                "key": "ID=1",
                "leftRow": {"ID": 1, "NAME": "Alice"},
                "rightRow": {"ID": 1, "NAME": "Alicia"},
                "changedColumns": ["NAME"]
            }]
        });
        let result: DiffResult = serde_json::from_value(payload).unwrap();
        assert_eq!(result.schema.as_deref(), Some("APP"));
        assert_eq!(result.key_column, "ID");
        assert_eq!(result.added.len(), 1);
        assert_eq!(
            result.changed[0].changed_columns.as_deref(),
            Some(&["NAME".to_string()][..])
        );
    }

    #[test]
    fn null_lists_become_empty() {
        let payload = json!({
            "schema": null,
            "table": "T",
            "keyColumn": "ID",
            "added": null,
            "removed": null,
            "changed": null
        });
        let result: DiffResult = serde_json::from_value(payload).unwrap();
        assert!(result.is_empty());
        assert!(result.schema.is_none());
    }

    #[test]
    fn outcome_with_error_only() {
        let payload = json!({
            "table": "LEDGER",
            "keyColumn": null,
            "result": null,
            "error": "No key available (no PK detected and no default key provided)"
        });
        let outcome: TableDiffOutcome = serde_json::from_value(payload).unwrap();
        assert!(outcome.result.is_none());
        assert!(outcome.key_column.is_none());
        assert!(outcome.error.unwrap().starts_with("No key available"));
    }

    #[test]
    fn changed_entry_without_explicit_columns() {
        let entry: ChangedEntry =
            serde_json::from_value(json!({"key": "ID=1", "leftRow": {"A": 1}})).unwrap();
        assert!(entry.changed_columns.is_none());
        assert!(entry.right_row.is_none());
    }
}
