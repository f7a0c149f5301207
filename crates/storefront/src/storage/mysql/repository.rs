//! MySQL table store implementation.
//!
//! Implements `storefront_core::storage::TableStore` on top of a shared
//! [`RelationalAccessor`].

use std::sync::Arc;

use async_trait::async_trait;

use storefront_core::storage::{
    AffectedRows, InsertResult, Query, Record, RepositoryError, Result, Table, TableStore,
};

use super::accessor::RelationalAccessor;
use super::statements;

/// MySQL-backed table store.
///
/// Each call provisions its table on first use and then runs one bound
/// statement. No transactions span calls.
#[derive(Debug, Clone)]
pub struct MySqlStore {
    accessor: Arc<RelationalAccessor>,
}

impl MySqlStore {
    pub fn new(accessor: Arc<RelationalAccessor>) -> Self {
        Self { accessor }
    }
}

#[async_trait]
impl TableStore for MySqlStore {
    async fn select(&self, table: Table, query: &Query) -> Result<Vec<Record>> {
        let statement = statements::select(table, query)?;
        self.accessor.ensure_table(table).await?;
        self.accessor.fetch_all(&statement).await
    }

    async fn insert(&self, table: Table, values: Record) -> Result<InsertResult> {
        let statement = statements::insert(table, &values)?;
        self.accessor.ensure_table(table).await?;
        let outcome = self.accessor.execute(&statement).await?;

        let insert_id = i64::try_from(outcome.last_insert_id).map_err(|_| {
            RepositoryError::InvalidData(format!(
                "insert id {} out of range",
                outcome.last_insert_id
            ))
        })?;
        tracing::debug!(%table, insert_id, "Inserted row");
        Ok(InsertResult { insert_id })
    }

    async fn update(&self, table: Table, id: i64, values: Record) -> Result<AffectedRows> {
        let Some(statement) = statements::update(table, id, &values)? else {
            return Ok(AffectedRows::none());
        };
        self.accessor.ensure_table(table).await?;
        let outcome = self.accessor.execute(&statement).await?;
        Ok(AffectedRows::new(outcome.affected_rows))
    }

    async fn delete(&self, table: Table, id: i64) -> Result<AffectedRows> {
        self.accessor.ensure_table(table).await?;
        let outcome = self.accessor.execute(&statements::delete(table, id)).await?;
        Ok(AffectedRows::new(outcome.affected_rows))
    }

    async fn delete_all(&self, table: Table) -> Result<AffectedRows> {
        self.accessor.ensure_table(table).await?;
        let outcome = self.accessor.execute(&statements::delete_all(table)).await?;
        Ok(AffectedRows::new(outcome.affected_rows))
    }

    fn backend_name(&self) -> &'static str {
        "mysql"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store() -> MySqlStore {
        MySqlStore::new(Arc::new(RelationalAccessor::unavailable()))
    }

    #[tokio::test]
    async fn test_unconfigured_store_reports_backend_unavailable() {
        let store = store();

        assert_eq!(
            store
                .select(Table::Products, &Query::all())
                .await
                .unwrap_err(),
            RepositoryError::BackendUnavailable
        );
        assert_eq!(
            store.delete(Table::Cart, 1).await.unwrap_err(),
            RepositoryError::BackendUnavailable
        );
    }

    #[tokio::test]
    async fn test_invalid_column_is_rejected_before_any_query() {
        let store = store();
        let values = json!({"name; DROP TABLE products": 1})
            .as_object()
            .cloned()
            .unwrap();

        let err = store.insert(Table::Products, values).await.unwrap_err();
        assert!(matches!(err, RepositoryError::InvalidData(_)));
        assert!(!err.is_fallback_trigger());
    }

    #[tokio::test]
    async fn test_empty_update_touches_nothing() {
        let updated = store()
            .update(Table::Products, 1, Record::new())
            .await
            .unwrap();
        assert!(updated.is_none());
    }
}
