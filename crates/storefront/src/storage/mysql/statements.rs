//! SQL statement builders.
//!
//! Every value travels as a bound parameter. Column names come from callers,
//! so they are validated as plain identifiers and backtick-quoted; table names
//! come from the closed [`Table`] enum.

use serde_json::Value;

use storefront_core::storage::{
    FieldFilter, Query, Record, RepositoryError, Result, Table, ID_FIELD,
};

/// A SQL string together with its positional parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
}

impl Statement {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }
}

/// Accepts `[A-Za-z_][A-Za-z0-9_]*`.
pub fn validate_identifier(name: &str) -> Result<&str> {
    let mut chars = name.chars();
    let valid = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

    if valid {
        Ok(name)
    } else {
        Err(RepositoryError::InvalidData(format!(
            "invalid column name: {name:?}"
        )))
    }
}

fn column(name: &str) -> Result<String> {
    Ok(format!("`{}`", validate_identifier(name)?))
}

fn table_name(table: Table) -> String {
    format!("`{}`", table.as_str())
}

/// `SELECT * FROM t [WHERE ...] [ORDER BY f ASC|DESC]`
pub fn select(table: Table, query: &Query) -> Result<Statement> {
    let mut statement = Statement::new(format!("SELECT * FROM {}", table_name(table)));

    let mut conditions = Vec::with_capacity(query.filters.len());
    for (field, filter) in &query.filters {
        let column = column(field)?;
        match filter {
            FieldFilter::Eq(Value::Null) => conditions.push(format!("{column} IS NULL")),
            FieldFilter::Eq(value) => {
                conditions.push(format!("{column} = ?"));
                statement.params.push(value.clone());
            }
            FieldFilter::AnyOf(values) if values.is_empty() => conditions.push("1 = 0".into()),
            FieldFilter::AnyOf(values) => {
                let placeholders = vec!["?"; values.len()].join(", ");
                conditions.push(format!("{column} IN ({placeholders})"));
                statement.params.extend(values.iter().cloned());
            }
        }
    }

    if !conditions.is_empty() {
        statement.sql.push_str(" WHERE ");
        statement.sql.push_str(&conditions.join(" AND "));
    }

    if let Some(order_by) = &query.order_by {
        statement.sql.push_str(&format!(
            " ORDER BY {} {}",
            column(&order_by.field)?,
            order_by.direction.as_sql()
        ));
    }

    Ok(statement)
}

/// `INSERT INTO t (...) VALUES (...)`; a supplied `id` is left to the database.
pub fn insert(table: Table, values: &Record) -> Result<Statement> {
    let mut columns = Vec::with_capacity(values.len());
    let mut params = Vec::with_capacity(values.len());
    for (field, value) in values.iter().filter(|(field, _)| *field != ID_FIELD) {
        columns.push(column(field)?);
        params.push(value.clone());
    }

    let placeholders = vec!["?"; params.len()].join(", ");
    Ok(Statement {
        sql: format!(
            "INSERT INTO {} ({}) VALUES ({placeholders})",
            table_name(table),
            columns.join(", ")
        ),
        params,
    })
}

/// `UPDATE t SET ... WHERE id = ?`, or `None` when there is nothing to set.
pub fn update(table: Table, id: i64, values: &Record) -> Result<Option<Statement>> {
    let mut assignments = Vec::with_capacity(values.len());
    let mut params = Vec::with_capacity(values.len() + 1);
    for (field, value) in values.iter().filter(|(field, _)| *field != ID_FIELD) {
        assignments.push(format!("{} = ?", column(field)?));
        params.push(value.clone());
    }

    if assignments.is_empty() {
        return Ok(None);
    }

    params.push(Value::from(id));
    Ok(Some(Statement {
        sql: format!(
            "UPDATE {} SET {} WHERE `id` = ?",
            table_name(table),
            assignments.join(", ")
        ),
        params,
    }))
}

pub fn delete(table: Table, id: i64) -> Statement {
    Statement {
        sql: format!("DELETE FROM {} WHERE `id` = ?", table_name(table)),
        params: vec![Value::from(id)],
    }
}

pub fn delete_all(table: Table) -> Statement {
    Statement::new(format!("DELETE FROM {}", table_name(table)))
}
