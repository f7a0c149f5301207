//! Fallback table store decorator.
//!
//! Wraps a primary `TableStore` and retries any call that fails with a
//! fallback-eligible error against a secondary store:
//!
//! - **Success on primary**: returned as is, secondary never touched
//! - **Eligible failure** (`BackendUnavailable`, `ConnectionFailed`,
//!   `QueryFailed`): logged, then the same call runs once on the secondary
//! - **Other failures**: propagated unchanged
//!
//! The two stores are never synchronized. A write serviced by one backend is
//! invisible to the other.
//!
//! # Example
//!
//! ```ignore
//! let primary = Arc::new(MySqlStore::new(accessor));
//! let secondary = Arc::new(FileTableStore::new("data"));
//! let store = FallbackStore::new(primary, secondary);
//! ```

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use storefront_core::storage::{
    AffectedRows, InsertResult, Query, Record, Result, Table, TableStore,
};

/// Table store that falls back from `P` to `S`.
///
/// # Type Parameters
///
/// * `P` - The preferred store (usually MySQL)
/// * `S` - The store used when the preferred one fails (usually JSON files)
pub struct FallbackStore<P, S>
where
    P: TableStore,
    S: TableStore,
{
    primary: Arc<P>,
    secondary: Arc<S>,
}

impl<P, S> FallbackStore<P, S>
where
    P: TableStore,
    S: TableStore,
{
    pub fn new(primary: Arc<P>, secondary: Arc<S>) -> Self {
        Self { primary, secondary }
    }

    async fn with_fallback<T, PF, SF>(
        &self,
        operation: &'static str,
        table: Table,
        primary: PF,
        secondary: impl FnOnce() -> SF,
    ) -> Result<T>
    where
        PF: Future<Output = Result<T>>,
        SF: Future<Output = Result<T>>,
    {
        match primary.await {
            Err(err) if err.is_fallback_trigger() => {
                tracing::warn!(
                    operation,
                    %table,
                    primary = self.primary.backend_name(),
                    secondary = self.secondary.backend_name(),
                    error = %err,
                    "Primary store failed, falling back"
                );
                secondary().await
            }
            result => result,
        }
    }
}

#[async_trait]
impl<P, S> TableStore for FallbackStore<P, S>
where
    P: TableStore + 'static,
    S: TableStore + 'static,
{
    async fn select(&self, table: Table, query: &Query) -> Result<Vec<Record>> {
        self.with_fallback(
            "select",
            table,
            self.primary.select(table, query),
            || self.secondary.select(table, query),
        )
        .await
    }

    async fn insert(&self, table: Table, values: Record) -> Result<InsertResult> {
        self.with_fallback(
            "insert",
            table,
            self.primary.insert(table, values.clone()),
            || self.secondary.insert(table, values),
        )
        .await
    }

    async fn update(&self, table: Table, id: i64, values: Record) -> Result<AffectedRows> {
        self.with_fallback(
            "update",
            table,
            self.primary.update(table, id, values.clone()),
            || self.secondary.update(table, id, values),
        )
        .await
    }

    async fn delete(&self, table: Table, id: i64) -> Result<AffectedRows> {
        self.with_fallback(
            "delete",
            table,
            self.primary.delete(table, id),
            || self.secondary.delete(table, id),
        )
        .await
    }

    async fn delete_all(&self, table: Table) -> Result<AffectedRows> {
        self.with_fallback(
            "delete_all",
            table,
            self.primary.delete_all(table),
            || self.secondary.delete_all(table),
        )
        .await
    }

    fn backend_name(&self) -> &'static str {
        "mysql+json"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use serde_json::json;
    use storefront_core::storage::RepositoryError;

    /// Store that fails every call with a fixed error and counts calls.
    struct FailingStore {
        error: RepositoryError,
        calls: AtomicUsize,
    }

    impl FailingStore {
        fn new(error: RepositoryError) -> Self {
            Self {
                error,
                calls: AtomicUsize::new(0),
            }
        }

        fn fail<T>(&self) -> Result<T> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(self.error.clone())
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TableStore for FailingStore {
        async fn select(&self, _table: Table, _query: &Query) -> Result<Vec<Record>> {
            self.fail()
        }

        async fn insert(&self, _table: Table, _values: Record) -> Result<InsertResult> {
            self.fail()
        }

        async fn update(&self, _table: Table, _id: i64, _values: Record) -> Result<AffectedRows> {
            self.fail()
        }

        async fn delete(&self, _table: Table, _id: i64) -> Result<AffectedRows> {
            self.fail()
        }

        async fn delete_all(&self, _table: Table) -> Result<AffectedRows> {
            self.fail()
        }

        fn backend_name(&self) -> &'static str {
            "failing"
        }
    }

    /// Store that records which operations reached it.
    #[derive(Default)]
    struct RecordingStore {
        seen: Mutex<Vec<String>>,
    }

    impl RecordingStore {
        fn note(&self, op: &str, table: Table) {
            self.seen.lock().unwrap().push(format!("{op} {table}"));
        }

        fn seen(&self) -> Vec<String> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TableStore for RecordingStore {
        async fn select(&self, table: Table, _query: &Query) -> Result<Vec<Record>> {
            self.note("select", table);
            Ok(vec![json!({"id": 1}).as_object().cloned().unwrap()])
        }

        async fn insert(&self, table: Table, _values: Record) -> Result<InsertResult> {
            self.note("insert", table);
            Ok(InsertResult { insert_id: 7 })
        }

        async fn update(&self, table: Table, _id: i64, _values: Record) -> Result<AffectedRows> {
            self.note("update", table);
            Ok(AffectedRows::new(1))
        }

        async fn delete(&self, table: Table, _id: i64) -> Result<AffectedRows> {
            self.note("delete", table);
            Ok(AffectedRows::new(1))
        }

        async fn delete_all(&self, table: Table) -> Result<AffectedRows> {
            self.note("delete_all", table);
            Ok(AffectedRows::new(3))
        }

        fn backend_name(&self) -> &'static str {
            "recording"
        }
    }

    #[tokio::test]
    async fn test_eligible_failures_fall_back_once() {
        for error in [
            RepositoryError::BackendUnavailable,
            RepositoryError::ConnectionFailed("refused".into()),
            RepositoryError::QueryFailed("no such table".into()),
        ] {
            let primary = Arc::new(FailingStore::new(error));
            let secondary = Arc::new(RecordingStore::default());
            let store = FallbackStore::new(primary.clone(), secondary.clone());

            let created = store.insert(Table::Cart, Record::new()).await.unwrap();

            assert_eq!(created.insert_id, 7);
            assert_eq!(primary.calls(), 1);
            assert_eq!(secondary.seen(), vec!["insert cart"]);
        }
    }

    #[tokio::test]
    async fn test_every_operation_falls_back() {
        let primary = Arc::new(FailingStore::new(RepositoryError::BackendUnavailable));
        let secondary = Arc::new(RecordingStore::default());
        let store = FallbackStore::new(primary.clone(), secondary.clone());

        assert_eq!(
            store
                .select(Table::Products, &Query::all())
                .await
                .unwrap()
                .len(),
            1
        );
        assert_eq!(
            store
                .update(Table::Products, 1, Record::new())
                .await
                .unwrap()
                .affected_rows,
            1
        );
        assert_eq!(
            store.delete(Table::Products, 1).await.unwrap().affected_rows,
            1
        );
        assert_eq!(
            store.delete_all(Table::Reviews).await.unwrap().affected_rows,
            3
        );

        assert_eq!(primary.calls(), 4);
        assert_eq!(
            secondary.seen(),
            vec![
                "select products",
                "update products",
                "delete products",
                "delete_all reviews"
            ]
        );
    }

    #[tokio::test]
    async fn test_non_eligible_errors_propagate() {
        for error in [
            RepositoryError::InvalidData("bad column".into()),
            RepositoryError::Serialization("bad row".into()),
            RepositoryError::Io("disk full".into()),
        ] {
            let primary = Arc::new(FailingStore::new(error.clone()));
            let secondary = Arc::new(RecordingStore::default());
            let store = FallbackStore::new(primary, secondary.clone());

            let err = store.delete(Table::Cart, 1).await.unwrap_err();

            assert_eq!(err, error);
            assert!(secondary.seen().is_empty());
        }
    }

    #[tokio::test]
    async fn test_primary_success_skips_secondary() {
        let primary = Arc::new(RecordingStore::default());
        let secondary = Arc::new(FailingStore::new(RepositoryError::BackendUnavailable));
        let store = FallbackStore::new(primary.clone(), secondary.clone());

        store.delete_all(Table::Reviews).await.unwrap();

        assert_eq!(primary.seen(), vec!["delete_all reviews"]);
        assert_eq!(secondary.calls(), 0);
    }

    #[tokio::test]
    async fn test_secondary_error_is_returned() {
        let primary = Arc::new(FailingStore::new(RepositoryError::BackendUnavailable));
        let secondary = Arc::new(FailingStore::new(RepositoryError::Io("disk full".into())));
        let store = FallbackStore::new(primary, secondary);

        assert_eq!(
            store.delete(Table::Cart, 1).await.unwrap_err(),
            RepositoryError::Io("disk full".into())
        );
    }

    #[test]
    fn test_backend_name() {
        let store = FallbackStore::new(
            Arc::new(RecordingStore::default()),
            Arc::new(RecordingStore::default()),
        );
        assert_eq!(store.backend_name(), "mysql+json");
    }
}
