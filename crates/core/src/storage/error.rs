use thiserror::Error;

/// Errors that can occur during repository operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// The relational backend is not configured.
    ///
    /// Callers holding a secondary store treat this as the signal to fall back.
    #[error("Relational backend unavailable")]
    BackendUnavailable,
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Query failed: {0}")]
    QueryFailed(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("I/O error: {0}")]
    Io(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl RepositoryError {
    /// Whether a failed call may be retried against a secondary store.
    pub fn is_fallback_trigger(&self) -> bool {
        matches!(
            self,
            RepositoryError::BackendUnavailable
                | RepositoryError::ConnectionFailed(_)
                | RepositoryError::QueryFailed(_)
        )
    }
}

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, RepositoryError>;
