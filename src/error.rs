use thiserror::Error;

/// Main error type for docquery operations
#[derive(Error, Debug)]
pub enum DocQueryError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Document not found: {table}/{id}")]
    NotFound { table: String, id: String },

    #[error(
        "Transport error{}: {message}",
        .status.map(|s| format!(" (status {})", s)).unwrap_or_default()
    )]
    Transport {
        status: Option<u16>,
        message: String,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),
}

/// Result type alias for docquery operations
pub type Result<T> = std::result::Result<T, DocQueryError>;

impl DocQueryError {
    pub(crate) fn invalid_input(msg: impl Into<String>) -> Self {
        DocQueryError::InvalidInput(msg.into())
    }

    pub(crate) fn invalid_state(msg: impl Into<String>) -> Self {
        DocQueryError::InvalidState(msg.into())
    }

    /// Check if this error indicates a transient failure that could be retried
    ///
    /// The client never retries on its own; this is a hint for callers that do.
    pub fn is_retriable(&self) -> bool {
        match self {
            DocQueryError::Transport { status: None, .. } => true,
            DocQueryError::Transport {
                status: Some(code), ..
            } => matches!(code, 429 | 502 | 503 | 504),
            _ => false,
        }
    }

    /// Check if the engine reported a missing document
    pub fn is_not_found(&self) -> bool {
        matches!(self, DocQueryError::NotFound { .. })
    }

    /// Short machine-readable kind, used as a metrics/log label
    pub fn kind(&self) -> &'static str {
        match self {
            DocQueryError::InvalidInput(_) => "invalid_input",
            DocQueryError::InvalidState(_) => "invalid_state",
            DocQueryError::NotFound { .. } => "not_found",
            DocQueryError::Transport { .. } => "transport",
            DocQueryError::Serialization(_) => "serialization",
            DocQueryError::Config(_) => "config",
            DocQueryError::Metrics(_) => "metrics",
        }
    }
}

impl From<reqwest::Error> for DocQueryError {
    fn from(e: reqwest::Error) -> Self {
        DocQueryError::Transport {
            status: e.status().map(|s| s.as_u16()),
            message: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DocQueryError::NotFound {
            table: "users".to_string(),
            id: "42".to_string(),
        };
        assert_eq!(err.to_string(), "Document not found: users/42");

        let err = DocQueryError::Transport {
            status: Some(500),
            message: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "Transport error (status 500): boom");

        let err = DocQueryError::Transport {
            status: None,
            message: "connection refused".to_string(),
        };
        assert_eq!(err.to_string(), "Transport error: connection refused");
    }

    #[test]
    fn test_retriable_errors() {
        let unavailable = DocQueryError::Transport {
            status: Some(503),
            message: String::new(),
        };
        assert!(unavailable.is_retriable());

        let bad_request = DocQueryError::Transport {
            status: Some(400),
            message: String::new(),
        };
        assert!(!bad_request.is_retriable());
        assert!(!DocQueryError::invalid_input("x").is_retriable());
    }

    #[test]
    fn test_error_kind() {
        assert_eq!(DocQueryError::invalid_state("no table").kind(), "invalid_state");
        assert!(DocQueryError::NotFound {
            table: "t".into(),
            id: "1".into()
        }
        .is_not_found());
    }
}
