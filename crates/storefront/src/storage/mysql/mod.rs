//! MySQL storage backend.
//!
//! [`RelationalAccessor`] owns the connection pool and runs bound statements;
//! [`MySqlStore`] implements the table-store trait on top of it. Statements are
//! built by pure functions in `statements` so they can be tested without a
//! database.

mod accessor;
mod conversions;
mod error;
mod repository;
mod schema;
mod statements;

pub use accessor::RelationalAccessor;
pub use repository::MySqlStore;
