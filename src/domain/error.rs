//! Error types surfaced to the view.

/// Failure talking to the diff backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    /// Non-success HTTP status. Displays as the raw response body.
    #[error("{body}")]
    Status { status: u16, body: String },

    /// The request never produced a response (connection refused, DNS…).
    #[error("{0}")]
    Transport(String),

    /// The response body was not the expected JSON document.
    #[error("invalid response body: {0}")]
    Decode(String),
}

/// Failure of a view action. Every variant renders as a user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ViewError {
    #[error("Please enter required fields: table and key.")]
    MissingFields,

    #[error("No key available to open diff for table {table}.")]
    NoKeyAvailable { table: String },

    #[error("Table {0} is not part of the current comparison.")]
    UnknownTable(String),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            BackendError::Decode(err.to_string())
        } else {
            BackendError::Transport(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_displays_raw_body() {
        let err = BackendError::Status {
            status: 500,
            body: "Error computing diff: table not found".to_string(),
        };
        assert_eq!(err.to_string(), "Error computing diff: table not found");
        assert_eq!(
            ViewError::from(err).to_string(),
            "Error computing diff: table not found"
        );
    }

    #[test]
    fn no_key_message_names_the_table() {
        let err = ViewError::NoKeyAvailable {
            table: "LEDGER".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "No key available to open diff for table LEDGER."
        );
    }
}
