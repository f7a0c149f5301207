pub mod cart;
pub mod error;
pub mod health;
pub mod orders;
pub mod products;
pub mod reviews;
pub mod search;

pub use error::{ApiJson, AppError};

use chrono::{SecondsFormat, Utc};

/// Current time as an RFC 3339 string with millisecond precision.
pub(crate) fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
