use async_trait::async_trait;

use super::{AffectedRows, InsertResult, Query, Record, Result, Table};

/// Uniform CRUD access to untyped tables.
///
/// Implemented by the file-backed store, the relational store and the
/// fallback decorator, so handlers never know which backend serves them.
#[async_trait]
pub trait TableStore: Send + Sync {
    /// Returns every record of `table` matching `query`.
    async fn select(&self, table: Table, query: &Query) -> Result<Vec<Record>>;

    /// Appends a record and returns its assigned id.
    async fn insert(&self, table: Table, values: Record) -> Result<InsertResult>;

    /// Shallow-merges `values` into the record with the given id.
    ///
    /// The `id` field is never overwritten. When `values` holds nothing else,
    /// no record is touched and zero rows are reported.
    async fn update(&self, table: Table, id: i64, values: Record) -> Result<AffectedRows>;

    /// Removes the record with the given id.
    async fn delete(&self, table: Table, id: i64) -> Result<AffectedRows>;

    /// Removes every record of `table`.
    async fn delete_all(&self, table: Table) -> Result<AffectedRows>;

    /// Short name of the backend, for logs and health output.
    fn backend_name(&self) -> &'static str;
}
