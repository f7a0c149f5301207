//! Pure functions for mapping repository errors to HTTP status codes.
//!
//! This module provides HTTP status code mappings for [`RepositoryError`] variants,
//! following the Functional Core pattern - pure functions with no side effects.

use super::RepositoryError;

/// Maps a [`RepositoryError`] to an HTTP status code.
///
/// - `NotFound` -> 404 (Not Found)
/// - `InvalidData` -> 400 (Bad Request)
/// - `BackendUnavailable`, `ConnectionFailed` -> 503 (Service Unavailable)
/// - `QueryFailed`, `Serialization`, `Io` -> 500 (Internal Server Error)
///
/// # Examples
///
/// ```
/// use storefront_core::storage::{RepositoryError, repository_error_to_status_code};
///
/// let error = RepositoryError::NotFound {
///     entity_type: "Product",
///     id: "7".to_string(),
/// };
/// assert_eq!(repository_error_to_status_code(&error), 404);
/// ```
pub fn repository_error_to_status_code(error: &RepositoryError) -> u16 {
    match error {
        RepositoryError::NotFound { .. } => 404,
        RepositoryError::InvalidData(_) => 400,
        RepositoryError::BackendUnavailable => 503,
        RepositoryError::ConnectionFailed(_) => 503,
        RepositoryError::QueryFailed(_) => 500,
        RepositoryError::Serialization(_) => 500,
        RepositoryError::Io(_) => 500,
    }
}
