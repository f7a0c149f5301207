//! In-memory evaluation of table operations.
//!
//! Pure functions over record slices, shared by any backend that keeps a whole
//! table in memory.

use std::cmp::Ordering;

use serde_json::Value;

use super::{OrderBy, Query, Record, SortDirection, ID_FIELD};

/// Reads the integer id of a record, if it has one.
pub fn record_id(record: &Record) -> Option<i64> {
    record.get(ID_FIELD).and_then(Value::as_i64)
}

/// Returns true when the record satisfies every filter of the query.
pub fn matches_query(record: &Record, query: &Query) -> bool {
    query
        .filters
        .iter()
        .all(|(field, filter)| filter.matches(record.get(field)))
}

/// Numeric sort key; missing or non-numeric values sort as zero.
fn sort_key(record: &Record, field: &str) -> f64 {
    match record.get(field) {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        Some(Value::Bool(b)) => f64::from(u8::from(*b)),
        _ => 0.0,
    }
}

/// Stable sort of records on one numeric field.
pub fn sort_records(records: &mut [Record], order_by: &OrderBy) {
    records.sort_by(|a, b| {
        let ordering = sort_key(a, &order_by.field)
            .partial_cmp(&sort_key(b, &order_by.field))
            .unwrap_or(Ordering::Equal);
        match order_by.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}

/// Filters and sorts a table snapshot.
pub fn apply_query(records: &[Record], query: &Query) -> Vec<Record> {
    let mut selected: Vec<Record> = records
        .iter()
        .filter(|record| matches_query(record, query))
        .cloned()
        .collect();

    if let Some(order_by) = &query.order_by {
        sort_records(&mut selected, order_by);
    }

    selected
}

/// Next synthetic id: `max(existing ids) + 1`, or `1` for an empty table.
pub fn next_id(records: &[Record]) -> i64 {
    records
        .iter()
        .filter_map(record_id)
        .max()
        .map_or(1, |max| max + 1)
}

/// Builds the stored form of a new record: the assigned id followed by the
/// supplied values. A caller-supplied `id` is discarded.
pub fn new_record(id: i64, values: Record) -> Record {
    let mut record = Record::new();
    record.insert(ID_FIELD.to_string(), Value::from(id));
    for (key, value) in values {
        if key != ID_FIELD {
            record.insert(key, value);
        }
    }
    record
}

/// Shallow merge of `values` into `record`, leaving the id untouched.
pub fn merge_record(record: &mut Record, values: Record) {
    for (key, value) in values {
        if key != ID_FIELD {
            record.insert(key, value);
        }
    }
}

/// Index of the first record carrying `id`.
pub fn position_of(records: &[Record], id: i64) -> Option<usize> {
    records.iter().position(|r| record_id(r) == Some(id))
}
