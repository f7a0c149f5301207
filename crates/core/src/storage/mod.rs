mod error;
mod http_mapping;
mod query;
mod traits;
mod types;

pub use error::{RepositoryError, Result};
pub use http_mapping::repository_error_to_status_code;
pub use query::{
    apply_query, matches_query, merge_record, new_record, next_id, position_of, record_id,
    sort_records,
};
pub use traits::TableStore;
pub use types::{
    AffectedRows, FieldFilter, InsertResult, OrderBy, Query, Record, SortDirection, Table,
    ID_FIELD,
};
