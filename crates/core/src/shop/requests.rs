//! API request types for storefront operations.
//!
//! Following the Functional Core pattern, these are pure data types; the
//! `into_record` / `validate` methods turn them into store records or
//! validation errors without touching any backend.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::ShopError;
use super::types::DEFAULT_IMAGE;
use crate::serde::{
    deserialize_optional_bool, deserialize_optional_f64, deserialize_optional_i64,
    deserialize_optional_string,
};
use crate::storage::Record;

/// Maximum stored length of a reviewer name, in characters.
pub const REVIEW_NAME_MAX_CHARS: usize = 80;

/// Most units of one product a cart line may hold.
pub const MAX_CART_QUANTITY: i64 = 1000;

/// Query parameters for listing products.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListProductsQuery {
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub gender: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub sale: Option<bool>,
}

/// Request payload for creating a product.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateProductRequest {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_f64")]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub gender_id: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub sale: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_optional_f64")]
    pub sale_price: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub image: Option<String>,
}

impl CreateProductRequest {
    /// Validates required fields and builds the product record.
    pub fn into_record(self) -> Result<Record, ShopError> {
        let (Some(name), Some(price), Some(gender_id)) = (self.name, self.price, self.gender_id)
        else {
            return Err(ShopError::validation("name, price, gender_id are required"));
        };

        let mut record = Map::new();
        record.insert("name".into(), Value::from(name));
        record.insert("price".into(), Value::from(price));
        record.insert("gender_id".into(), Value::from(gender_id));
        record.insert("sale".into(), Value::from(i64::from(self.sale.unwrap_or(false))));
        record.insert(
            "sale_price".into(),
            self.sale_price.filter(|p| *p != 0.0).map_or(Value::Null, Value::from),
        );
        record.insert(
            "image".into(),
            Value::from(self.image.unwrap_or_else(|| DEFAULT_IMAGE.to_string())),
        );
        Ok(record)
    }
}

/// Request payload for a partial product update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProductRequest {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_f64")]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub gender_id: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub sale: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_optional_f64")]
    pub sale_price: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub image: Option<String>,
}

impl UpdateProductRequest {
    /// Builds the changed-fields record; an empty update is rejected.
    pub fn into_record(self) -> Result<Record, ShopError> {
        let mut record = Map::new();
        if let Some(name) = self.name {
            record.insert("name".into(), Value::from(name));
        }
        if let Some(price) = self.price {
            record.insert("price".into(), Value::from(price));
        }
        if let Some(gender_id) = self.gender_id {
            record.insert("gender_id".into(), Value::from(gender_id));
        }
        if let Some(sale) = self.sale {
            record.insert("sale".into(), Value::from(i64::from(sale)));
        }
        if let Some(sale_price) = self.sale_price {
            let value = if sale_price == 0.0 {
                Value::Null
            } else {
                Value::from(sale_price)
            };
            record.insert("sale_price".into(), value);
        }
        if let Some(image) = self.image {
            record.insert("image".into(), Value::from(image));
        }

        if record.is_empty() {
            return Err(ShopError::validation("No fields to update"));
        }
        Ok(record)
    }
}

/// Request payload for adding a product to the cart.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AddToCartRequest {
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub product_id: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub quantity: Option<i64>,
}

impl AddToCartRequest {
    /// Returns `(product_id, quantity)` when both are present and positive.
    pub fn validate(&self) -> Result<(i64, i64), ShopError> {
        match (self.product_id, self.quantity) {
            (Some(_), Some(quantity)) if quantity > MAX_CART_QUANTITY => {
                Err(quantity_too_large())
            }
            (Some(product_id), Some(quantity)) if product_id > 0 && quantity > 0 => {
                Ok((product_id, quantity))
            }
            _ => Err(ShopError::validation(
                "product_id and quantity are required",
            )),
        }
    }
}

/// Request payload for changing a cart line quantity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCartRequest {
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub quantity: Option<i64>,
}

impl UpdateCartRequest {
    /// Quantity clamped to at least one.
    pub fn validate(&self) -> Result<i64, ShopError> {
        match self.quantity {
            Some(quantity) if quantity > MAX_CART_QUANTITY => Err(quantity_too_large()),
            Some(quantity) => Ok(quantity.max(1)),
            None => Err(ShopError::validation("quantity is required")),
        }
    }
}

pub(crate) fn quantity_too_large() -> ShopError {
    ShopError::validation(format!(
        "quantity cannot exceed {MAX_CART_QUANTITY} per item"
    ))
}

/// Order totals computed by the checkout page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderTotals {
    #[serde(default, deserialize_with = "deserialize_optional_f64")]
    pub subtotal: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_f64")]
    pub shipping: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_f64")]
    pub grand: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetails {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub card_number: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub expiry_date: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub cvv: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub cardholder_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingDetails {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub postal_code: String,
}

/// Request payload for placing an order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    #[serde(default)]
    pub cart_items: Vec<Value>,
    #[serde(default)]
    pub totals: Option<OrderTotals>,
    #[serde(default)]
    pub payment: Option<PaymentDetails>,
    #[serde(default)]
    pub shipping: ShippingDetails,
}

/// Request payload for creating or replacing a review.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReviewRequest {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub rating: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub comment: Option<String>,
}

/// Query parameters selecting the product a review belongs to.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReviewsQuery {
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub product_id: Option<i64>,
}

/// Query parameters for product search.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_product_requires_fields() {
        let request: CreateProductRequest =
            serde_json::from_value(json!({"name": "Red Shoes", "price": 59.9})).unwrap();
        assert_eq!(
            request.into_record().unwrap_err(),
            ShopError::validation("name, price, gender_id are required")
        );
    }

    #[test]
    fn test_create_product_record_defaults() {
        let request: CreateProductRequest =
            serde_json::from_value(json!({"name": "Red Shoes", "price": "59.9", "gender_id": 1}))
                .unwrap();
        let record = request.into_record().unwrap();
        assert_eq!(
            Value::Object(record),
            json!({
                "name": "Red Shoes",
                "price": 59.9,
                "gender_id": 1,
                "sale": 0,
                "sale_price": null,
                "image": "/2.png"
            })
        );
    }

    #[test]
    fn test_update_product_only_changed_fields() {
        let request: UpdateProductRequest =
            serde_json::from_value(json!({"price": 49.9, "sale": true})).unwrap();
        let record = request.into_record().unwrap();
        assert_eq!(Value::Object(record), json!({"price": 49.9, "sale": 1}));
    }

    #[test]
    fn test_empty_update_is_rejected() {
        let request = UpdateProductRequest::default();
        assert_eq!(
            request.into_record().unwrap_err(),
            ShopError::validation("No fields to update")
        );
    }

    #[test]
    fn test_add_to_cart_validation() {
        let ok = AddToCartRequest {
            product_id: Some(1),
            quantity: Some(2),
        };
        assert_eq!(ok.validate().unwrap(), (1, 2));

        let zero = AddToCartRequest {
            product_id: Some(1),
            quantity: Some(0),
        };
        assert!(zero.validate().is_err());
        assert!(AddToCartRequest::default().validate().is_err());

        let huge = AddToCartRequest {
            product_id: Some(1),
            quantity: Some(i64::MAX),
        };
        assert_eq!(
            huge.validate().unwrap_err(),
            ShopError::validation("quantity cannot exceed 1000 per item")
        );
    }

    #[test]
    fn test_update_cart_clamps_quantity() {
        let request = UpdateCartRequest { quantity: Some(-3) };
        assert_eq!(request.validate().unwrap(), 1);
        assert!(UpdateCartRequest::default().validate().is_err());

        let at_limit = UpdateCartRequest {
            quantity: Some(MAX_CART_QUANTITY),
        };
        assert_eq!(at_limit.validate().unwrap(), MAX_CART_QUANTITY);
        let huge = UpdateCartRequest {
            quantity: Some(i64::MAX),
        };
        assert!(huge.validate().is_err());
    }

    #[test]
    fn test_place_order_request_camel_case() {
        let request: PlaceOrderRequest = serde_json::from_value(json!({
            "cartItems": [{"id": 1}],
            "totals": {"subtotal": 10, "shipping": 5, "grand": 15},
            "payment": {"cardNumber": "4111 1111 1111 1111", "expiryDate": "12/30", "cvv": "123"},
            "shipping": {"email": "a@b.c", "postalCode": "H0H"}
        }))
        .unwrap();

        assert_eq!(request.cart_items.len(), 1);
        assert_eq!(request.totals.unwrap().grand, Some(15.0));
        assert_eq!(request.shipping.postal_code, "H0H");
        assert_eq!(
            request.payment.unwrap().card_number.as_deref(),
            Some("4111 1111 1111 1111")
        );
    }
}
