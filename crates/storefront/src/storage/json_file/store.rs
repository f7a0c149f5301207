//! File-backed table store implementation.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use storefront_core::storage::{
    apply_query, merge_record, new_record, next_id, position_of, AffectedRows, InsertResult,
    Query, Record, RepositoryError, Result, Table, TableStore, ID_FIELD,
};

/// Table store persisting every table as a JSON document on disk.
#[derive(Debug)]
pub struct FileTableStore {
    data_dir: PathBuf,
    locks: HashMap<Table, Mutex<()>>,
    write_seq: AtomicU64,
}

impl FileTableStore {
    /// Creates a store rooted at `data_dir`.
    ///
    /// The directory is created lazily on the first write.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            locks: Table::ALL.into_iter().map(|t| (t, Mutex::new(()))).collect(),
            write_seq: AtomicU64::new(0),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn table_path(&self, table: Table) -> PathBuf {
        self.data_dir.join(table.file_name())
    }

    fn lock(&self, table: Table) -> &Mutex<()> {
        // Every Table variant is registered in `new`.
        &self.locks[&table]
    }

    /// Reads a snapshot of the whole table.
    ///
    /// A missing file is an empty table. This does not take the table lock;
    /// callers combining it with [`write_table`](Self::write_table) race with
    /// every other writer.
    pub async fn read_table(&self, table: Table) -> Result<Vec<Record>> {
        let path = self.table_path(table);
        let contents = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(RepositoryError::Io(format!(
                    "Failed to read {}: {e}",
                    path.display()
                )))
            }
        };

        parse_table(table, &contents)
    }

    /// Replaces the whole table with `records`.
    ///
    /// The document is written to a sibling temporary file and renamed into
    /// place, so readers never observe a half-written table. Like
    /// [`read_table`](Self::read_table), this does not take the table lock.
    pub async fn write_table(&self, table: Table, records: &[Record]) -> Result<()> {
        tokio::fs::create_dir_all(&self.data_dir)
            .await
            .map_err(|e| {
                RepositoryError::Io(format!(
                    "Failed to create {}: {e}",
                    self.data_dir.display()
                ))
            })?;

        let contents = serde_json::to_string_pretty(records)
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;

        let path = self.table_path(table);
        let seq = self.write_seq.fetch_add(1, Ordering::Relaxed);
        let tmp_path = self
            .data_dir
            .join(format!(".{}.{}.{seq}.tmp", table.file_name(), std::process::id()));

        tokio::fs::write(&tmp_path, contents)
            .await
            .map_err(|e| RepositoryError::Io(format!("Failed to write {}: {e}", tmp_path.display())))?;
        tokio::fs::rename(&tmp_path, &path)
            .await
            .map_err(|e| RepositoryError::Io(format!("Failed to replace {}: {e}", path.display())))?;

        Ok(())
    }
}

fn parse_table(table: Table, contents: &str) -> Result<Vec<Record>> {
    if contents.trim().is_empty() {
        return Ok(Vec::new());
    }

    let document: Value = serde_json::from_str(contents)
        .map_err(|e| RepositoryError::Serialization(format!("{table}.json: {e}")))?;

    let Value::Array(rows) = document else {
        return Err(RepositoryError::Serialization(format!(
            "{table}.json: expected an array of records"
        )));
    };

    rows.into_iter()
        .map(|row| match row {
            Value::Object(record) => Ok(record),
            other => Err(RepositoryError::Serialization(format!(
                "{table}.json: expected a record, found {other}"
            ))),
        })
        .collect()
}

#[async_trait]
impl TableStore for FileTableStore {
    async fn select(&self, table: Table, query: &Query) -> Result<Vec<Record>> {
        let records = self.read_table(table).await?;
        Ok(apply_query(&records, query))
    }

    async fn insert(&self, table: Table, values: Record) -> Result<InsertResult> {
        let _guard = self.lock(table).lock().await;

        let mut records = self.read_table(table).await?;
        let insert_id = next_id(&records);
        records.push(new_record(insert_id, values));
        self.write_table(table, &records).await?;

        tracing::debug!(%table, insert_id, "Inserted record");
        Ok(InsertResult { insert_id })
    }

    async fn update(&self, table: Table, id: i64, values: Record) -> Result<AffectedRows> {
        if values.keys().all(|key| key == ID_FIELD) {
            return Ok(AffectedRows::none());
        }

        let _guard = self.lock(table).lock().await;

        let mut records = self.read_table(table).await?;
        let Some(index) = position_of(&records, id) else {
            return Ok(AffectedRows::none());
        };
        merge_record(&mut records[index], values);
        self.write_table(table, &records).await?;

        Ok(AffectedRows::new(1))
    }

    async fn delete(&self, table: Table, id: i64) -> Result<AffectedRows> {
        let _guard = self.lock(table).lock().await;

        let mut records = self.read_table(table).await?;
        let Some(index) = position_of(&records, id) else {
            return Ok(AffectedRows::none());
        };
        records.remove(index);
        self.write_table(table, &records).await?;

        Ok(AffectedRows::new(1))
    }

    async fn delete_all(&self, table: Table) -> Result<AffectedRows> {
        let _guard = self.lock(table).lock().await;

        let removed = self.read_table(table).await?.len() as u64;
        self.write_table(table, &[]).await?;

        tracing::debug!(%table, removed, "Cleared table");
        Ok(AffectedRows::new(removed))
    }

    fn backend_name(&self) -> &'static str {
        "json"
    }
}
