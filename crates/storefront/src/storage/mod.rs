//! Storage backend implementations.
//!
//! This module provides the concrete implementations of the `TableStore`
//! trait defined in `storefront_core::storage` and picks one of them at
//! startup from configuration.
//!
//! # Backend selection
//!
//! | `STORAGE_BACKEND` | database configured | store                                   |
//! |-------------------|---------------------|-----------------------------------------|
//! | `json`            | any                 | `FileTableStore`                        |
//! | `mysql`           | yes                 | `MySqlStore`                            |
//! | `mysql`           | no                  | startup error                           |
//! | `auto`            | yes                 | `FallbackStore(MySqlStore, FileTableStore)` |
//! | `auto`            | no                  | `FileTableStore`                        |
//!
//! # Feature Flags
//!
//! - `mysql` (default): MySQL backend using `sqlx`. Without it every plan
//!   that needs the database is rejected at startup, except `auto`, which
//!   degrades to JSON files.

pub mod fallback;
pub mod json_file;

#[cfg(feature = "mysql")]
pub mod mysql;

use std::sync::Arc;

use storefront_core::storage::{RepositoryError, TableStore};

use crate::config::{Config, StorageBackend};

pub use fallback::FallbackStore;
pub use json_file::FileTableStore;

/// Concrete store arrangement chosen at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendPlan {
    Json,
    MySql,
    MySqlWithFallback,
}

/// Resolves the requested backend against what is configured.
///
/// Pure; no connection is attempted. Requesting `mysql` without database
/// settings yields [`RepositoryError::BackendUnavailable`].
pub fn resolve_backend(
    requested: StorageBackend,
    database_configured: bool,
) -> Result<BackendPlan, RepositoryError> {
    match (requested, database_configured) {
        (StorageBackend::Json, _) => Ok(BackendPlan::Json),
        (StorageBackend::MySql, true) => Ok(BackendPlan::MySql),
        (StorageBackend::MySql, false) => Err(RepositoryError::BackendUnavailable),
        (StorageBackend::Auto, true) => Ok(BackendPlan::MySqlWithFallback),
        (StorageBackend::Auto, false) => Ok(BackendPlan::Json),
    }
}

/// The active store plus the resources it owns.
pub struct Storage {
    pub store: Arc<dyn TableStore>,
    #[cfg(feature = "mysql")]
    relational: Option<Arc<mysql::RelationalAccessor>>,
}

impl Storage {
    /// Builds the store selected by `config`.
    pub fn build(config: &Config) -> anyhow::Result<Self> {
        let plan = resolve_backend(config.storage_backend, config.database_available())
            .map_err(|_| {
                anyhow::anyhow!(
                    "STORAGE_BACKEND=mysql requires DB_HOST, DB_USER and DB_NAME to be set"
                )
            })?;

        let storage = Self::from_plan(plan, config)?;
        tracing::info!(
            backend = storage.store.backend_name(),
            data_dir = %config.data_dir.display(),
            "Storage initialized"
        );
        Ok(storage)
    }

    #[cfg(feature = "mysql")]
    fn from_plan(plan: BackendPlan, config: &Config) -> anyhow::Result<Self> {
        use mysql::{MySqlStore, RelationalAccessor};

        let files = || Arc::new(FileTableStore::new(&config.data_dir));
        let accessor = || {
            config
                .database
                .as_ref()
                .map(|settings| Arc::new(RelationalAccessor::connect_lazy(settings)))
                .ok_or_else(|| anyhow::anyhow!("database settings missing"))
        };

        let storage = match plan {
            BackendPlan::Json => Self::from_store(files()),
            BackendPlan::MySql => {
                let accessor = accessor()?;
                Self {
                    store: Arc::new(MySqlStore::new(accessor.clone())),
                    relational: Some(accessor),
                }
            }
            BackendPlan::MySqlWithFallback => {
                let accessor = accessor()?;
                let primary = Arc::new(MySqlStore::new(accessor.clone()));
                Self {
                    store: Arc::new(FallbackStore::new(primary, files())),
                    relational: Some(accessor),
                }
            }
        };
        Ok(storage)
    }

    #[cfg(not(feature = "mysql"))]
    fn from_plan(plan: BackendPlan, config: &Config) -> anyhow::Result<Self> {
        match plan {
            BackendPlan::Json => {}
            BackendPlan::MySql => {
                anyhow::bail!("STORAGE_BACKEND=mysql but this build lacks the `mysql` feature")
            }
            BackendPlan::MySqlWithFallback => {
                tracing::warn!("Database configured but the `mysql` feature is disabled, using JSON files");
            }
        }
        Ok(Self::from_store(Arc::new(FileTableStore::new(&config.data_dir))))
    }

    /// Wraps an existing store that owns no external resources.
    pub fn from_store(store: Arc<dyn TableStore>) -> Self {
        Self {
            store,
            #[cfg(feature = "mysql")]
            relational: None,
        }
    }

    /// Releases owned resources. Call once the server stopped accepting requests.
    pub async fn shutdown(&self) {
        #[cfg(feature = "mysql")]
        if let Some(accessor) = &self.relational {
            accessor.close().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;

    use crate::config::DatabaseSettings;

    fn config(storage_backend: StorageBackend, with_database: bool) -> Config {
        Config {
            data_dir: PathBuf::from("unused-data-dir"),
            storage_backend,
            database: with_database.then(|| DatabaseSettings {
                host: "127.0.0.1".to_string(),
                port: 3306,
                user: "shop".to_string(),
                password: None,
                database: "storefront".to_string(),
                ssl: false,
                connection_limit: 1,
                acquire_timeout: Duration::from_millis(100),
            }),
        }
    }

    #[test]
    fn test_resolve_backend() {
        use BackendPlan::*;
        use StorageBackend as B;

        assert_eq!(resolve_backend(B::Json, false), Ok(Json));
        assert_eq!(resolve_backend(B::Json, true), Ok(Json));
        assert_eq!(resolve_backend(B::MySql, true), Ok(MySql));
        assert_eq!(
            resolve_backend(B::MySql, false),
            Err(RepositoryError::BackendUnavailable)
        );
        assert_eq!(resolve_backend(B::Auto, true), Ok(MySqlWithFallback));
        assert_eq!(resolve_backend(B::Auto, false), Ok(Json));
    }

    #[tokio::test]
    async fn test_build_json_store() {
        let storage = Storage::build(&config(StorageBackend::Json, true)).unwrap();
        assert_eq!(storage.store.backend_name(), "json");

        let storage = Storage::build(&config(StorageBackend::Auto, false)).unwrap();
        assert_eq!(storage.store.backend_name(), "json");
        storage.shutdown().await;
    }

    #[test]
    fn test_build_mysql_without_database_fails() {
        let err = Storage::build(&config(StorageBackend::MySql, false))
            .err()
            .unwrap();
        assert!(err.to_string().contains("DB_HOST"));
    }

    #[cfg(feature = "mysql")]
    #[tokio::test]
    async fn test_build_relational_stores() {
        let storage = Storage::build(&config(StorageBackend::MySql, true)).unwrap();
        assert_eq!(storage.store.backend_name(), "mysql");
        storage.shutdown().await;

        let storage = Storage::build(&config(StorageBackend::Auto, true)).unwrap();
        assert_eq!(storage.store.backend_name(), "mysql+json");
        storage.shutdown().await;
    }
}
