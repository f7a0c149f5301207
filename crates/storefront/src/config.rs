use std::{env, path::PathBuf, str::FromStr, time::Duration};

use thiserror::Error;

/// Errors raised while reading configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid STORAGE_BACKEND '{0}': expected 'auto', 'json' or 'mysql'")]
    InvalidBackend(String),
    #[error("Invalid {key} '{value}': expected a positive whole number")]
    InvalidNumber { key: &'static str, value: String },
}

/// Which record store the server should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageBackend {
    /// MySQL with JSON fallback when the database is configured, JSON otherwise.
    #[default]
    Auto,
    /// JSON files only.
    Json,
    /// MySQL only; startup fails when the database is not configured.
    MySql,
}

impl FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "auto" => Ok(StorageBackend::Auto),
            "json" => Ok(StorageBackend::Json),
            "mysql" => Ok(StorageBackend::MySql),
            other => Err(ConfigError::InvalidBackend(other.to_string())),
        }
    }
}

/// Connection parameters for the relational backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: Option<String>,
    pub database: String,
    /// Encrypt the connection without verifying the server certificate.
    pub ssl: bool,
    /// Maximum pooled connections (default: 10)
    pub connection_limit: u32,
    /// How long a caller waits for a pooled connection (default: 5s)
    pub acquire_timeout: Duration,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory holding one `<table>.json` document per table (default: "data")
    pub data_dir: PathBuf,
    /// Requested storage backend (default: auto)
    pub storage_backend: StorageBackend,
    /// Relational connection parameters, present only when DB_HOST, DB_USER
    /// and DB_NAME are all set.
    pub database: Option<DatabaseSettings>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `DATA_DIR` - JSON table directory (default: "data")
    /// - `STORAGE_BACKEND` - `auto`, `json` or `mysql` (default: "auto")
    /// - `DB_HOST`, `DB_USER`, `DB_NAME` - required for the relational backend
    /// - `DB_PASSWORD` - optional password
    /// - `DB_PORT` - MySQL port (default: 3306)
    /// - `DB_SSL` - "true" to require TLS
    /// - `DB_CONNECTION_LIMIT` - pool size (default: 10)
    /// - `DB_ACQUIRE_TIMEOUT_SECS` - pool acquire timeout (default: 5)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let storage_backend = non_empty("STORAGE_BACKEND")
            .map(|v| v.parse::<StorageBackend>())
            .transpose()?
            .unwrap_or_default();

        let database = match (non_empty("DB_HOST"), non_empty("DB_USER"), non_empty("DB_NAME")) {
            (Some(host), Some(user), Some(database)) => Some(DatabaseSettings {
                host,
                port: positive_number("DB_PORT", non_empty("DB_PORT"), 3306)?,
                user,
                password: lookup("DB_PASSWORD"),
                database,
                ssl: non_empty("DB_SSL").is_some_and(|v| v == "true"),
                connection_limit: positive_number(
                    "DB_CONNECTION_LIMIT",
                    non_empty("DB_CONNECTION_LIMIT"),
                    10,
                )?,
                acquire_timeout: Duration::from_secs(positive_number(
                    "DB_ACQUIRE_TIMEOUT_SECS",
                    non_empty("DB_ACQUIRE_TIMEOUT_SECS"),
                    5,
                )?),
            }),
            _ => None,
        };

        Ok(Self {
            data_dir: non_empty("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("data")),
            storage_backend,
            database,
        })
    }

    /// Whether the relational backend has the parameters it needs.
    ///
    /// Does not check that the database is actually reachable.
    pub fn database_available(&self) -> bool {
        self.database.is_some()
    }
}

/// Parses an optional setting that must be a whole number above zero.
fn positive_number<T>(key: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr + PartialOrd + From<u8>,
{
    let Some(value) = value else {
        return Ok(default);
    };

    match value.trim().parse::<T>() {
        Ok(number) if number >= T::from(1) => Ok(number),
        _ => Err(ConfigError::InvalidNumber { key, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_default_values() {
        let config = config(&[]).unwrap();

        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.storage_backend, StorageBackend::Auto);
        assert!(config.database.is_none());
        assert!(!config.database_available());
    }

    #[test]
    fn test_database_requires_host_user_and_name() {
        let partial = config(&[("DB_HOST", "localhost"), ("DB_USER", "shop")]).unwrap();
        assert!(!partial.database_available());

        let blank_name = config(&[
            ("DB_HOST", "localhost"),
            ("DB_USER", "shop"),
            ("DB_NAME", "  "),
        ])
        .unwrap();
        assert!(!blank_name.database_available());
    }

    #[test]
    fn test_database_settings() {
        let config = config(&[
            ("DB_HOST", "db.internal"),
            ("DB_USER", "shop"),
            ("DB_NAME", "storefront"),
            ("DB_PASSWORD", "secret"),
            ("DB_PORT", "3307"),
            ("DB_SSL", "true"),
            ("DB_CONNECTION_LIMIT", "4"),
            ("DB_ACQUIRE_TIMEOUT_SECS", "2"),
        ])
        .unwrap();

        let db = config.database.unwrap();
        assert_eq!(db.host, "db.internal");
        assert_eq!(db.port, 3307);
        assert_eq!(db.password.as_deref(), Some("secret"));
        assert!(db.ssl);
        assert_eq!(db.connection_limit, 4);
        assert_eq!(db.acquire_timeout, Duration::from_secs(2));
    }

    #[test]
    fn test_database_defaults() {
        let config = config(&[
            ("DB_HOST", "localhost"),
            ("DB_USER", "shop"),
            ("DB_NAME", "storefront"),
            ("DB_PORT", " "),
        ])
        .unwrap();

        let db = config.database.unwrap();
        assert_eq!(db.port, 3306);
        assert_eq!(db.password, None);
        assert!(!db.ssl);
        assert_eq!(db.connection_limit, 10);
        assert_eq!(db.acquire_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_invalid_numeric_settings_are_rejected() {
        let with = |key: &str, value: &str| {
            config(&[
                ("DB_HOST", "localhost"),
                ("DB_USER", "shop"),
                ("DB_NAME", "storefront"),
                (key, value),
            ])
        };

        assert_eq!(
            with("DB_PORT", "not-a-port").unwrap_err(),
            ConfigError::InvalidNumber {
                key: "DB_PORT",
                value: "not-a-port".to_string()
            }
        );
        assert_eq!(
            with("DB_PORT", "70000").unwrap_err(),
            ConfigError::InvalidNumber {
                key: "DB_PORT",
                value: "70000".to_string()
            }
        );
        assert_eq!(
            with("DB_CONNECTION_LIMIT", "0").unwrap_err(),
            ConfigError::InvalidNumber {
                key: "DB_CONNECTION_LIMIT",
                value: "0".to_string()
            }
        );
        assert_eq!(
            with("DB_ACQUIRE_TIMEOUT_SECS", "-1").unwrap_err(),
            ConfigError::InvalidNumber {
                key: "DB_ACQUIRE_TIMEOUT_SECS",
                value: "-1".to_string()
            }
        );
        assert_eq!(
            with("DB_CONNECTION_LIMIT", " 8 ")
                .unwrap()
                .database
                .unwrap()
                .connection_limit,
            8
        );
    }

    #[test]
    fn test_numeric_settings_ignored_without_database() {
        let config = config(&[("DB_PORT", "oops")]).unwrap();
        assert!(config.database.is_none());
    }

    #[test]
    fn test_storage_backend_parsing() {
        assert_eq!("JSON".parse(), Ok(StorageBackend::Json));
        assert_eq!("mysql".parse(), Ok(StorageBackend::MySql));
        assert_eq!("auto".parse(), Ok(StorageBackend::Auto));
        assert_eq!(
            config(&[("STORAGE_BACKEND", "redis")]).unwrap_err(),
            ConfigError::InvalidBackend("redis".to_string())
        );
    }
}
