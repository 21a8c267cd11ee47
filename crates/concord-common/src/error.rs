//! Error types shared across the Concord crates.

/// Application-specific error types
#[derive(thiserror::Error, Debug)]
pub enum ConcordError {
    #[error("illegal state: {0}")]
    IllegalState(String),

    #[error("invalid message: {0}")]
    InvalidMessage(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, ConcordError>;

impl ConcordError {
    /// Whether the error should map to a client-side (4xx-class) failure.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ConcordError::IllegalState(_) | ConcordError::InvalidMessage(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ConcordError::IllegalState("already in critical section".to_string());
        assert_eq!(
            format!("{}", err),
            "illegal state: already in critical section"
        );

        let err = ConcordError::InvalidMessage("missing processId".to_string());
        assert_eq!(format!("{}", err), "invalid message: missing processId");
    }

    #[test]
    fn test_client_error_classification() {
        assert!(ConcordError::IllegalState("x".into()).is_client_error());
        assert!(!ConcordError::Internal("x".into()).is_client_error());
    }
}
