//! JSON file storage backend.
//!
//! Each table lives in its own pretty-printed JSON array document at
//! `<data_dir>/<table>.json`. Mutations hold a per-table lock across the whole
//! read-modify-write cycle, so concurrent inserts within one process never
//! reuse an id. Separate processes sharing a data directory are not
//! coordinated.
//!
//! # Example
//!
//! ```rust,ignore
//! use storefront::storage::json_file::FileTableStore;
//!
//! let store = FileTableStore::new("data");
//! let created = store.insert(Table::Products, record).await?;
//! ```

mod store;

pub use store::FileTableStore;
