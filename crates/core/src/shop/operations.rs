use std::cmp::Ordering;

use chrono::{DateTime, FixedOffset};
use serde_json::{Map, Value};

use super::error::ShopError;
use super::requests::{
    quantity_too_large, PlaceOrderRequest, ReviewRequest, MAX_CART_QUANTITY, REVIEW_NAME_MAX_CHARS,
};
use super::types::{CartItem, CartLine, Product, DEFAULT_IMAGE, UNKNOWN_PRODUCT};
use crate::storage::Record;

/// Most search-history entries returned at once.
pub const SEARCH_HISTORY_LIMIT: usize = 100;

/// Status recorded for every placed order.
pub const ORDER_STATUS_COMPLETED: &str = "completed";

/// Unit price a shopper pays: the sale price when the product is on sale and
/// has one, otherwise the list price.
pub fn effective_price(product: &Product) -> f64 {
    match product.sale_price {
        Some(sale_price) if product.sale => sale_price,
        _ => product.price,
    }
}

/// Joins cart rows with their products.
///
/// A captured cart price wins over the current product price. Rows whose
/// product is gone are kept, named [`UNKNOWN_PRODUCT`].
pub fn cart_lines(items: &[CartItem], products: &[Product]) -> Vec<CartLine> {
    items
        .iter()
        .map(|item| {
            let product = products.iter().find(|p| p.id == item.product_id);
            let price = item
                .price
                .or_else(|| product.map(effective_price))
                .unwrap_or(0.0);

            CartLine {
                id: item.id,
                product_id: item.product_id,
                quantity: item.quantity,
                product_name: product
                    .map(|p| p.name.clone())
                    .unwrap_or_else(|| UNKNOWN_PRODUCT.to_string()),
                price,
                image: product
                    .map(|p| p.image.clone())
                    .unwrap_or_else(|| DEFAULT_IMAGE.to_string()),
                total: price * item.quantity as f64,
            }
        })
        .collect()
}

/// Total number of units in the cart, saturating at `i64::MAX`.
pub fn cart_count(items: &[CartItem]) -> i64 {
    items
        .iter()
        .fold(0i64, |count, item| count.saturating_add(item.quantity.max(0)))
}

/// Quantity of an existing cart line after adding `added` more units.
///
/// The result never exceeds [`MAX_CART_QUANTITY`].
pub fn merged_quantity(current: i64, added: i64) -> Result<i64, ShopError> {
    current
        .max(0)
        .checked_add(added)
        .filter(|quantity| *quantity <= MAX_CART_QUANTITY)
        .ok_or_else(quantity_too_large)
}

/// Ratings are clamped to 1..=5; a missing rating counts as 5.
pub fn clamp_rating(rating: Option<i64>) -> i64 {
    rating.map_or(5, |r| r.clamp(1, 5))
}

/// Truncates on a character boundary.
pub fn truncate_chars(value: &str, max_chars: usize) -> String {
    value.chars().take(max_chars).collect()
}

/// Last four digits of a card number, ignoring whitespace.
pub fn mask_card_number(card_number: &str) -> String {
    let digits: Vec<char> = card_number.chars().filter(|c| !c.is_whitespace()).collect();
    let start = digits.len().saturating_sub(4);
    digits[start..].iter().collect()
}

/// Validated review fields, ready to be stored.
pub fn review_fields(request: &ReviewRequest) -> Result<Record, ShopError> {
    let (Some(name), Some(comment)) = (&request.name, &request.comment) else {
        return Err(ShopError::validation("name and comment are required"));
    };

    let mut record = Map::new();
    record.insert(
        "name".into(),
        Value::from(truncate_chars(name, REVIEW_NAME_MAX_CHARS)),
    );
    record.insert("rating".into(), Value::from(clamp_rating(request.rating)));
    record.insert("comment".into(), Value::from(comment.clone()));
    Ok(record)
}

/// Validates a checkout request and builds the order record.
///
/// Only the last four card digits are kept; the security code is never stored.
pub fn order_record(request: &PlaceOrderRequest, created_at: &str) -> Result<Record, ShopError> {
    if request.cart_items.is_empty() {
        return Err(ShopError::validation("Cart is empty"));
    }

    let payment = request
        .payment
        .as_ref()
        .filter(|p| p.card_number.is_some() && p.expiry_date.is_some() && p.cvv.is_some())
        .ok_or_else(|| ShopError::validation("Payment information is required"))?;

    let totals = request
        .totals
        .as_ref()
        .filter(|t| t.grand.is_some())
        .ok_or_else(|| ShopError::validation("Totals are required"))?;

    let items = serde_json::to_string(&request.cart_items)
        .map_err(|e| ShopError::validation(format!("Invalid cart items: {e}")))?;

    let card_number = payment.card_number.as_deref().unwrap_or_default();
    let shipping = &request.shipping;

    let mut record = Map::new();
    record.insert("items".into(), Value::from(items));
    record.insert("subtotal".into(), Value::from(totals.subtotal.unwrap_or(0.0)));
    record.insert("shipping".into(), Value::from(totals.shipping.unwrap_or(0.0)));
    record.insert("total".into(), Value::from(totals.grand.unwrap_or(0.0)));
    record.insert("card_last4".into(), Value::from(mask_card_number(card_number)));
    record.insert(
        "expiry_date".into(),
        Value::from(payment.expiry_date.clone().unwrap_or_default()),
    );
    record.insert(
        "cardholder_name".into(),
        Value::from(payment.cardholder_name.clone().unwrap_or_default()),
    );
    record.insert("email".into(), Value::from(shipping.email.clone()));
    record.insert("address".into(), Value::from(shipping.address.clone()));
    record.insert("city".into(), Value::from(shipping.city.clone()));
    record.insert("postal_code".into(), Value::from(shipping.postal_code.clone()));
    record.insert("status".into(), Value::from(ORDER_STATUS_COMPLETED));
    record.insert("created_at".into(), Value::from(created_at));
    Ok(record)
}

/// Products whose name contains `term`, case-insensitively.
pub fn search_products(products: Vec<Product>, term: &str) -> Vec<Product> {
    let needle = term.to_lowercase();
    products
        .into_iter()
        .filter(|p| p.name.to_lowercase().contains(&needle))
        .collect()
}

fn parse_timestamp(value: Option<&str>) -> Option<DateTime<FixedOffset>> {
    value.and_then(|v| DateTime::parse_from_rfc3339(v).ok())
}

/// Orders items newest first by an RFC 3339 timestamp.
///
/// Items without a parseable timestamp sort last, keeping their relative order.
pub fn sort_newest_first<T>(items: &mut [T], created_at: impl Fn(&T) -> Option<&str>) {
    items.sort_by(|a, b| {
        match (
            parse_timestamp(created_at(a)),
            parse_timestamp(created_at(b)),
        ) {
            (Some(a), Some(b)) => b.cmp(&a),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shop::requests::{OrderTotals, PaymentDetails};
    use serde_json::json;

    fn product(id: i64, name: &str, price: f64, sale: bool, sale_price: Option<f64>) -> Product {
        Product {
            id,
            name: name.to_string(),
            price,
            gender_id: Some(1),
            sale,
            sale_price,
            image: DEFAULT_IMAGE.to_string(),
        }
    }

    #[test]
    fn test_effective_price() {
        assert_eq!(effective_price(&product(1, "a", 50.0, false, Some(30.0))), 50.0);
        assert_eq!(effective_price(&product(1, "a", 50.0, true, Some(30.0))), 30.0);
        assert_eq!(effective_price(&product(1, "a", 50.0, true, None)), 50.0);
    }

    #[test]
    fn test_cart_lines_join_and_unknown_product() {
        let products = vec![product(1, "Red Shoes", 60.0, true, Some(40.0))];
        let items = vec![
            CartItem {
                id: 1,
                product_id: 1,
                quantity: 2,
                price: None,
            },
            CartItem {
                id: 2,
                product_id: 99,
                quantity: 1,
                price: Some(5.0),
            },
            CartItem {
                id: 3,
                product_id: 1,
                quantity: 1,
                price: Some(55.0),
            },
        ];

        let lines = cart_lines(&items, &products);

        assert_eq!(lines[0].product_name, "Red Shoes");
        assert_eq!(lines[0].price, 40.0);
        assert_eq!(lines[0].total, 80.0);

        assert_eq!(lines[1].product_name, UNKNOWN_PRODUCT);
        assert_eq!(lines[1].image, DEFAULT_IMAGE);
        assert_eq!(lines[1].total, 5.0);

        assert_eq!(lines[2].price, 55.0);
        assert_eq!(lines[2].total, 55.0);
    }

    #[test]
    fn test_cart_count() {
        let items = vec![
            CartItem {
                id: 1,
                product_id: 1,
                quantity: 2,
                price: None,
            },
            CartItem {
                id: 2,
                product_id: 2,
                quantity: 3,
                price: None,
            },
        ];
        assert_eq!(cart_count(&items), 5);
        assert_eq!(cart_count(&[]), 0);
    }

    #[test]
    fn test_cart_count_saturates() {
        let items = vec![
            CartItem {
                id: 1,
                product_id: 1,
                quantity: i64::MAX,
                price: None,
            },
            CartItem {
                id: 2,
                product_id: 2,
                quantity: i64::MAX,
                price: None,
            },
        ];
        assert_eq!(cart_count(&items), i64::MAX);
    }

    #[test]
    fn test_merged_quantity() {
        assert_eq!(merged_quantity(2, 3).unwrap(), 5);
        assert_eq!(merged_quantity(1, MAX_CART_QUANTITY - 1).unwrap(), MAX_CART_QUANTITY);
        assert!(merged_quantity(1, MAX_CART_QUANTITY).is_err());
        assert!(merged_quantity(1, i64::MAX).is_err());
        assert!(merged_quantity(i64::MAX, 1).is_err());
    }

    #[test]
    fn test_clamp_rating() {
        assert_eq!(clamp_rating(None), 5);
        assert_eq!(clamp_rating(Some(0)), 1);
        assert_eq!(clamp_rating(Some(9)), 5);
        assert_eq!(clamp_rating(Some(3)), 3);
    }

    #[test]
    fn test_mask_card_number() {
        assert_eq!(mask_card_number("4111 1111 1111 1234"), "1234");
        assert_eq!(mask_card_number("12"), "12");
    }

    #[test]
    fn test_review_fields_truncates_name() {
        let request = ReviewRequest {
            name: Some("x".repeat(100)),
            rating: Some(7),
            comment: Some("<b>great</b>".to_string()),
        };
        let record = review_fields(&request).unwrap();
        assert_eq!(record["name"].as_str().unwrap().chars().count(), 80);
        assert_eq!(record["rating"], json!(5));
        assert_eq!(record["comment"], json!("<b>great</b>"));

        assert!(review_fields(&ReviewRequest::default()).is_err());
    }

    fn order_request() -> PlaceOrderRequest {
        PlaceOrderRequest {
            cart_items: vec![json!({"id": 1, "quantity": 2})],
            totals: Some(OrderTotals {
                subtotal: Some(100.0),
                shipping: Some(5.0),
                grand: Some(105.0),
            }),
            payment: Some(PaymentDetails {
                card_number: Some("4111 1111 1111 4242".to_string()),
                expiry_date: Some("12/30".to_string()),
                cvv: Some("321".to_string()),
                cardholder_name: Some("Ada".to_string()),
            }),
            shipping: Default::default(),
        }
    }

    #[test]
    fn test_order_record_masks_card_and_drops_cvv() {
        let record = order_record(&order_request(), "2026-01-01T00:00:00Z").unwrap();
        assert_eq!(record["card_last4"], json!("4242"));
        assert_eq!(record["total"], json!(105.0));
        assert_eq!(record["status"], json!("completed"));
        assert!(!record.contains_key("cvv"));
        assert_eq!(record["items"], json!(r#"[{"id":1,"quantity":2}]"#));
    }

    #[test]
    fn test_order_record_validation() {
        let mut empty = order_request();
        empty.cart_items.clear();
        assert_eq!(
            order_record(&empty, "t").unwrap_err(),
            ShopError::validation("Cart is empty")
        );

        let mut no_payment = order_request();
        no_payment.payment = Some(PaymentDetails::default());
        assert_eq!(
            order_record(&no_payment, "t").unwrap_err(),
            ShopError::validation("Payment information is required")
        );

        let mut no_totals = order_request();
        no_totals.totals = Some(OrderTotals::default());
        assert_eq!(
            order_record(&no_totals, "t").unwrap_err(),
            ShopError::validation("Totals are required")
        );
    }

    #[test]
    fn test_search_products_case_insensitive() {
        let products = vec![
            product(1, "Red Shoes", 1.0, false, None),
            product(2, "Blue Hat", 1.0, false, None),
        ];
        let found = search_products(products, "SHOE");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, 1);
    }

    #[test]
    fn test_sort_newest_first() {
        let mut items = vec![
            (1, Some("2026-01-01T00:00:00Z")),
            (2, None),
            (3, Some("2026-03-01T00:00:00+00:00")),
            (4, Some("2026-02-01T00:00:00Z")),
        ];
        sort_newest_first(&mut items, |(_, ts)| *ts);
        let ids: Vec<i32> = items.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![3, 4, 1, 2]);
    }
}
