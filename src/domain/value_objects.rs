use serde::{Deserialize, Serialize};

/// Newtype to avoid confusion between schema names
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Schema(pub String);

/// Newtype for table names
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableName(pub String);

/// Column (or comma-separated column list) the backend matches rows on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyColumn(pub String);

/// Key used for batch comparisons when the caller supplies none.
pub const DEFAULT_BATCH_KEY: &str = "ID";

impl Schema {
    /// `None` for a blank schema, so it is left out of backend requests.
    pub fn non_blank(s: Option<&str>) -> Option<Self> {
        s.map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| Schema(s.to_string()))
    }
}

impl KeyColumn {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TableName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::fmt::Display for KeyColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
