//! Row to record conversion.
//!
//! Integer columns become JSON integers, floating columns JSON numbers,
//! `NULL` becomes `null` and everything else a string.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::{Number, Value};
use sqlx::mysql::MySqlRow;
use sqlx::{Column, Row, TypeInfo, ValueRef};

use storefront_core::storage::{Record, Result};

use super::error::map_sqlx_error;

/// Decodes every column of a row into a record.
pub fn row_to_record(row: &MySqlRow) -> Result<Record> {
    let mut record = Record::new();
    for (index, column) in row.columns().iter().enumerate() {
        let value = column_value(row, index, column.type_info().name())
            .map_err(map_sqlx_error)?;
        record.insert(column.name().to_string(), value);
    }
    Ok(record)
}

fn float(value: f64) -> Value {
    Number::from_f64(value).map_or(Value::Null, Value::Number)
}

fn column_value(row: &MySqlRow, index: usize, type_name: &str) -> sqlx::Result<Value> {
    if row.try_get_raw(index)?.is_null() {
        return Ok(Value::Null);
    }

    let value = match type_name {
        "BOOLEAN" | "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => {
            Value::from(row.try_get::<i64, _>(index)?)
        }
        "YEAR" => Value::from(row.try_get_unchecked::<i64, _>(index)?),
        "TINYINT UNSIGNED" | "SMALLINT UNSIGNED" | "MEDIUMINT UNSIGNED" | "INT UNSIGNED"
        | "BIGINT UNSIGNED" => Value::from(row.try_get::<u64, _>(index)?),
        "FLOAT" => float(f64::from(row.try_get::<f32, _>(index)?)),
        "DOUBLE" => float(row.try_get::<f64, _>(index)?),
        "DECIMAL" => {
            let text = row.try_get_unchecked::<String, _>(index)?;
            match text.parse::<f64>() {
                Ok(number) => float(number),
                Err(_) => Value::from(text),
            }
        }
        "DATETIME" | "TIMESTAMP" => {
            Value::from(row.try_get::<NaiveDateTime, _>(index)?.to_string())
        }
        "DATE" => Value::from(row.try_get::<NaiveDate, _>(index)?.to_string()),
        "TIME" => Value::from(row.try_get::<NaiveTime, _>(index)?.to_string()),
        "BINARY" | "VARBINARY" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB" => {
            let bytes = row.try_get_unchecked::<Vec<u8>, _>(index)?;
            Value::from(String::from_utf8_lossy(&bytes).into_owned())
        }
        _ => Value::from(row.try_get_unchecked::<String, _>(index)?),
    };

    Ok(value)
}
