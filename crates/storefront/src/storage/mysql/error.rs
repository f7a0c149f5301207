//! MySQL error mapping.
//!
//! Maps `sqlx::Error` to `RepositoryError` from `storefront_core::storage`.

use storefront_core::storage::RepositoryError;

/// Maps a sqlx error to a RepositoryError.
///
/// # Error Mapping
///
/// - Pool, I/O, TLS and protocol failures → `RepositoryError::ConnectionFailed`
/// - Column decode failures → `RepositoryError::Serialization`
/// - Database errors and everything else → `RepositoryError::QueryFailed`
pub fn map_sqlx_error(err: sqlx::Error) -> RepositoryError {
    match err {
        sqlx::Error::Configuration(_)
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::Protocol(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => RepositoryError::ConnectionFailed(err.to_string()),

        sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnIndexOutOfBounds { .. } => {
            RepositoryError::Serialization(err.to_string())
        }

        _ => RepositoryError::QueryFailed(err.to_string()),
    }
}
