//! Functional core of the storefront: record-store contract, pure query
//! evaluation and storefront domain logic. No I/O lives here.

pub mod serde;
pub mod shop;
pub mod storage;
