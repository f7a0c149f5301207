//! Typed views over storefront records.
//!
//! Records come back from either backend with loose typing (the relational
//! store may hand out `0`/`1` for flags, the JSON store whatever was written),
//! so conversions read fields leniently.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::storage::{record_id, Record, RepositoryError};

/// Image used when a product has none.
pub const DEFAULT_IMAGE: &str = "/2.png";

/// Name shown for cart lines whose product no longer exists.
pub const UNKNOWN_PRODUCT: &str = "Unknown";

fn number(record: &Record, field: &str) -> Option<f64> {
    match record.get(field)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        Value::Bool(b) => Some(f64::from(u8::from(*b))),
        _ => None,
    }
}

fn integer(record: &Record, field: &str) -> Option<i64> {
    match record.get(field)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    }
}

fn text(record: &Record, field: &str) -> Option<String> {
    match record.get(field)? {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

fn flag(record: &Record, field: &str) -> bool {
    number(record, field).is_some_and(|n| n != 0.0)
}

fn require_id(record: &Record, entity_type: &str) -> Result<i64, RepositoryError> {
    record_id(record).ok_or_else(|| {
        RepositoryError::Serialization(format!("{entity_type} record without an integer id"))
    })
}

fn into_record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        _ => Record::new(),
    }
}

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub price: f64,
    pub gender_id: Option<i64>,
    pub sale: bool,
    pub sale_price: Option<f64>,
    pub image: String,
}

impl Product {
    pub fn from_record(record: &Record) -> Result<Self, RepositoryError> {
        Ok(Self {
            id: require_id(record, "Product")?,
            name: text(record, "name").unwrap_or_default(),
            price: number(record, "price").unwrap_or(0.0),
            gender_id: integer(record, "gender_id"),
            sale: flag(record, "sale"),
            sale_price: number(record, "sale_price"),
            image: text(record, "image")
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_IMAGE.to_string()),
        })
    }
}

/// A stored cart row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: i64,
    pub product_id: i64,
    pub quantity: i64,
    /// Unit price captured when the item was added, if any.
    pub price: Option<f64>,
}

impl CartItem {
    pub fn from_record(record: &Record) -> Result<Self, RepositoryError> {
        Ok(Self {
            id: require_id(record, "CartItem")?,
            product_id: integer(record, "product_id").unwrap_or_default(),
            quantity: integer(record, "quantity").unwrap_or_default(),
            price: number(record, "price"),
        })
    }

    /// Record for a new cart row.
    pub fn new_record(product_id: i64, quantity: i64, price: f64) -> Record {
        into_record(json!({
            "product_id": product_id,
            "quantity": quantity,
            "price": price,
        }))
    }
}

/// A cart row joined with its product, as shown to shoppers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub product_name: String,
    pub price: f64,
    pub image: String,
    pub total: f64,
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub items: String,
    pub subtotal: f64,
    pub shipping: f64,
    pub total: f64,
    pub card_last4: String,
    pub expiry_date: String,
    pub cardholder_name: String,
    pub email: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub status: String,
    pub created_at: String,
}

impl Order {
    pub fn from_record(record: &Record) -> Result<Self, RepositoryError> {
        Ok(Self {
            id: require_id(record, "Order")?,
            items: text(record, "items").unwrap_or_else(|| "[]".to_string()),
            subtotal: number(record, "subtotal").unwrap_or(0.0),
            shipping: number(record, "shipping").unwrap_or(0.0),
            total: number(record, "total").unwrap_or(0.0),
            card_last4: text(record, "card_last4").unwrap_or_default(),
            expiry_date: text(record, "expiry_date").unwrap_or_default(),
            cardholder_name: text(record, "cardholder_name").unwrap_or_default(),
            email: text(record, "email").unwrap_or_default(),
            address: text(record, "address").unwrap_or_default(),
            city: text(record, "city").unwrap_or_default(),
            postal_code: text(record, "postal_code").unwrap_or_default(),
            status: text(record, "status").unwrap_or_default(),
            created_at: text(record, "created_at").unwrap_or_default(),
        })
    }
}

/// A product review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: i64,
    pub product_id: Option<i64>,
    pub name: String,
    pub rating: i64,
    pub comment: String,
    pub created_at: Option<String>,
}

impl Review {
    pub fn from_record(record: &Record) -> Result<Self, RepositoryError> {
        Ok(Self {
            id: require_id(record, "Review")?,
            product_id: integer(record, "product_id"),
            name: text(record, "name").unwrap_or_default(),
            rating: integer(record, "rating").unwrap_or(5),
            comment: text(record, "comment").unwrap_or_default(),
            created_at: text(record, "created_at"),
        })
    }
}

/// A recorded search term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchEntry {
    pub id: i64,
    pub search_term: String,
    pub created_at: Option<String>,
}

impl SearchEntry {
    pub fn from_record(record: &Record) -> Result<Self, RepositoryError> {
        Ok(Self {
            id: require_id(record, "SearchEntry")?,
            search_term: text(record, "search_term").unwrap_or_default(),
            created_at: text(record, "created_at"),
        })
    }

    /// Record for a new search-history row.
    pub fn new_record(search_term: &str, created_at: &str) -> Record {
        into_record(json!({
            "search_term": search_term,
            "created_at": created_at,
        }))
    }
}

/// Converts every record with `convert`, failing on the first bad one.
pub fn from_records<T>(
    records: &[Record],
    convert: fn(&Record) -> Result<T, RepositoryError>,
) -> Result<Vec<T>, RepositoryError> {
    records.iter().map(convert).collect()
}
