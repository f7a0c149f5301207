use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::RepositoryError;

/// A single untyped row: a flat mapping of field name to scalar value.
pub type Record = Map<String, Value>;

/// Name of the synthetic integer primary key carried by every record.
pub const ID_FIELD: &str = "id";

/// Logical tables known to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Products,
    Cart,
    Orders,
    Reviews,
    Users,
    SearchHistory,
}

impl Table {
    pub const ALL: [Table; 6] = [
        Table::Products,
        Table::Cart,
        Table::Orders,
        Table::Reviews,
        Table::Users,
        Table::SearchHistory,
    ];

    /// Table name as used on disk and in SQL.
    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Products => "products",
            Table::Cart => "cart",
            Table::Orders => "orders",
            Table::Reviews => "reviews",
            Table::Users => "users",
            Table::SearchHistory => "search_history",
        }
    }

    /// File name of the JSON document holding this table.
    pub fn file_name(&self) -> String {
        format!("{}.json", self.as_str())
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Table {
    type Err = RepositoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Table::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| RepositoryError::InvalidData(format!("unknown table: {s}")))
    }
}

/// Filter condition on a single field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldFilter {
    /// Field must equal the value exactly.
    Eq(Value),
    /// Field must equal one of the values.
    AnyOf(Vec<Value>),
}

impl FieldFilter {
    /// Returns true when `value` satisfies this filter.
    ///
    /// A missing field is treated as `null`.
    pub fn matches(&self, value: Option<&Value>) -> bool {
        let value = value.unwrap_or(&Value::Null);
        match self {
            FieldFilter::Eq(expected) => values_equal(expected, value),
            FieldFilter::AnyOf(options) => options.iter().any(|o| values_equal(o, value)),
        }
    }
}

/// Strict equality that still treats `1` and `1.0` as the same number.
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x == y,
            _ => x.as_f64() == y.as_f64(),
        },
        _ => a == b,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Sort on one numeric field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub field: String,
    pub direction: SortDirection,
}

impl OrderBy {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }

    /// Parses the textual `"<field> [ASC|DESC]"` form.
    ///
    /// The direction is case-insensitive and defaults to ascending.
    pub fn parse(input: &str) -> Result<Self, RepositoryError> {
        let mut parts = input.split_whitespace();
        let field = parts
            .next()
            .ok_or_else(|| RepositoryError::InvalidData("empty order by clause".to_string()))?;

        let direction = match parts.next() {
            None => SortDirection::Asc,
            Some(d) if d.eq_ignore_ascii_case("asc") => SortDirection::Asc,
            Some(d) if d.eq_ignore_ascii_case("desc") => SortDirection::Desc,
            Some(d) => {
                return Err(RepositoryError::InvalidData(format!(
                    "invalid sort direction: {d}"
                )))
            }
        };

        if parts.next().is_some() {
            return Err(RepositoryError::InvalidData(format!(
                "invalid order by clause: {input}"
            )));
        }

        Ok(Self {
            field: field.to_string(),
            direction,
        })
    }
}

/// Parameters of a select: conjunctive field filters plus an optional sort.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filters: Vec<(String, FieldFilter)>,
    pub order_by: Option<OrderBy>,
}

impl Query {
    /// A query matching every record, unsorted.
    pub fn all() -> Self {
        Self::default()
    }

    /// Shorthand for selecting a single record by id.
    pub fn by_id(id: i64) -> Self {
        Self::all().where_eq(ID_FIELD, id)
    }

    pub fn where_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters
            .push((field.into(), FieldFilter::Eq(value.into())));
        self
    }

    pub fn where_any<V: Into<Value>>(
        mut self,
        field: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        let values = values.into_iter().map(Into::into).collect();
        self.filters
            .push((field.into(), FieldFilter::AnyOf(values)));
        self
    }

    pub fn order_by(mut self, order_by: OrderBy) -> Self {
        self.order_by = Some(order_by);
        self
    }
}

/// Result of an insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertResult {
    pub insert_id: i64,
}

/// Number of records touched by an update or delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AffectedRows {
    pub affected_rows: u64,
}

impl AffectedRows {
    pub fn new(affected_rows: u64) -> Self {
        Self { affected_rows }
    }

    pub fn none() -> Self {
        Self::new(0)
    }

    pub fn is_none(&self) -> bool {
        self.affected_rows == 0
    }
}
