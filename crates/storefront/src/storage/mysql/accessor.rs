//! Pooled statement execution.

use std::collections::HashSet;
use std::sync::Mutex;

use serde_json::Value;
use sqlx::mysql::{MySqlArguments, MySqlConnectOptions, MySqlPool, MySqlPoolOptions, MySqlSslMode};
use sqlx::query::Query;
use sqlx::MySql;

use storefront_core::storage::{Record, RepositoryError, Result, Table};

use super::conversions::row_to_record;
use super::error::map_sqlx_error;
use super::schema;
use super::statements::Statement;
use crate::config::DatabaseSettings;

/// Outcome of a data-modifying statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExecOutcome {
    pub affected_rows: u64,
    pub last_insert_id: u64,
}

/// Owned handle to the MySQL connection pool.
///
/// Created once at startup and shared by reference; [`close`](Self::close)
/// drains the pool during shutdown. An accessor built with
/// [`unavailable`](Self::unavailable) has no pool and fails every call with
/// [`RepositoryError::BackendUnavailable`].
#[derive(Debug)]
pub struct RelationalAccessor {
    pool: Option<MySqlPool>,
    provisioned: Mutex<HashSet<Table>>,
}

impl RelationalAccessor {
    /// Builds the pool without opening a connection.
    ///
    /// Connections are established on first use, so an unreachable server
    /// surfaces as `ConnectionFailed` on the first query rather than here.
    pub fn connect_lazy(settings: &DatabaseSettings) -> Self {
        let mut options = MySqlConnectOptions::new()
            .host(&settings.host)
            .port(settings.port)
            .username(&settings.user)
            .database(&settings.database)
            .ssl_mode(if settings.ssl {
                MySqlSslMode::Required
            } else {
                MySqlSslMode::Disabled
            });
        if let Some(password) = &settings.password {
            options = options.password(password);
        }

        let pool = MySqlPoolOptions::new()
            .max_connections(settings.connection_limit)
            .acquire_timeout(settings.acquire_timeout)
            .connect_lazy_with(options);

        tracing::info!(
            host = %settings.host,
            port = settings.port,
            database = %settings.database,
            connection_limit = settings.connection_limit,
            "MySQL pool configured"
        );

        Self::with_pool(Some(pool))
    }

    /// An accessor with no database behind it.
    pub fn unavailable() -> Self {
        Self::with_pool(None)
    }

    fn with_pool(pool: Option<MySqlPool>) -> Self {
        Self {
            pool,
            provisioned: Mutex::new(HashSet::new()),
        }
    }

    /// Whether a pool was configured. Does not check connectivity.
    pub fn is_available(&self) -> bool {
        self.pool.is_some()
    }

    fn pool(&self) -> Result<&MySqlPool> {
        self.pool.as_ref().ok_or(RepositoryError::BackendUnavailable)
    }

    /// Runs a query and decodes every returned row.
    pub async fn fetch_all(&self, statement: &Statement) -> Result<Vec<Record>> {
        let pool = self.pool()?;
        let rows = bind_params(sqlx::query(&statement.sql), &statement.params)
            .fetch_all(pool)
            .await
            .map_err(map_sqlx_error)?;

        rows.iter().map(row_to_record).collect()
    }

    /// Runs a data-modifying statement.
    pub async fn execute(&self, statement: &Statement) -> Result<ExecOutcome> {
        let pool = self.pool()?;
        let result = bind_params(sqlx::query(&statement.sql), &statement.params)
            .execute(pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(ExecOutcome {
            affected_rows: result.rows_affected(),
            last_insert_id: result.last_insert_id(),
        })
    }

    /// Creates `table` if it does not exist, once per accessor.
    pub async fn ensure_table(&self, table: Table) -> Result<()> {
        if self.is_provisioned(table) {
            return Ok(());
        }

        let pool = self.pool()?;
        sqlx::query(schema::create_table(table))
            .execute(pool)
            .await
            .map_err(map_sqlx_error)?;

        if let Ok(mut provisioned) = self.provisioned.lock() {
            provisioned.insert(table);
        }
        tracing::debug!(%table, "Table provisioned");
        Ok(())
    }

    fn is_provisioned(&self, table: Table) -> bool {
        self.provisioned
            .lock()
            .map(|provisioned| provisioned.contains(&table))
            .unwrap_or(false)
    }

    /// Closes every pooled connection. Later calls fail with `ConnectionFailed`.
    pub async fn close(&self) {
        if let Some(pool) = &self.pool {
            pool.close().await;
            tracing::info!("MySQL pool closed");
        }
    }
}

fn bind_params<'q>(
    mut query: Query<'q, MySql, MySqlArguments>,
    params: &[Value],
) -> Query<'q, MySql, MySqlArguments> {
    for param in params {
        query = match param {
            Value::Null => query.bind(None::<String>),
            Value::Bool(b) => query.bind(*b),
            Value::Number(n) => match (n.as_i64(), n.as_u64()) {
                (Some(i), _) => query.bind(i),
                (None, Some(u)) => query.bind(u),
                _ => query.bind(n.as_f64().unwrap_or_default()),
            },
            Value::String(s) => query.bind(s.clone()),
            other => query.bind(other.to_string()),
        };
    }
    query
}
