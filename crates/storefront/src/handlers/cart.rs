use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::{json, Map, Value};

use storefront_core::shop::{
    cart_count, cart_lines, effective_price, from_records, merged_quantity, AddToCartRequest,
    CartItem, CartLine, Product, ShopError, UpdateCartRequest,
};
use storefront_core::storage::{self, OrderBy, Table};

use super::products::find_product;
use crate::{
    handlers::{ApiJson, AppError},
    state::AppState,
};

async fn cart_items(state: &AppState, query: &storage::Query) -> anyhow::Result<Vec<CartItem>> {
    let records = state.store.select(Table::Cart, query).await?;
    Ok(from_records(&records, CartItem::from_record)?)
}

/// List cart lines with product details (GET /api/cart), newest first.
pub async fn list_cart(State(state): State<AppState>) -> Result<Json<Vec<CartLine>>, AppError> {
    let items = cart_items(&state, &storage::Query::all().order_by(OrderBy::desc("id"))).await?;

    let product_ids: Vec<i64> = items.iter().map(|item| item.product_id).collect();
    let records = state
        .store
        .select(
            Table::Products,
            &storage::Query::all().where_any("id", product_ids),
        )
        .await?;
    let products = from_records(&records, Product::from_record)?;

    Ok(Json(cart_lines(&items, &products)))
}

/// Total number of units in the cart (GET /api/cart/count).
pub async fn count_cart(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let items = cart_items(&state, &storage::Query::all()).await?;
    Ok(Json(json!({ "count": cart_count(&items) })))
}

/// Add a product to the cart (POST /api/cart).
///
/// An existing line for the same product has its quantity increased;
/// otherwise a new line is created with the product's current unit price.
pub async fn add_to_cart(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<AddToCartRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (product_id, quantity) = payload.validate()?;

    let product = find_product(state.store.as_ref(), product_id)
        .await?
        .ok_or(ShopError::ProductNotFound)?;

    let existing = cart_items(
        &state,
        &storage::Query::all().where_eq("product_id", product_id),
    )
    .await?;

    if let Some(item) = existing.first() {
        let mut values = Map::new();
        values.insert(
            "quantity".into(),
            Value::from(merged_quantity(item.quantity, quantity)?),
        );
        state.store.update(Table::Cart, item.id, values).await?;

        tracing::info!(cart_item_id = item.id, product_id, quantity, "Increased cart quantity");
        return Ok((StatusCode::OK, Json(json!({ "success": true, "id": item.id }))));
    }

    let values = CartItem::new_record(product_id, quantity, effective_price(&product));
    let created = state.store.insert(Table::Cart, values).await?;

    tracing::info!(cart_item_id = created.insert_id, product_id, quantity, "Added to cart");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "id": created.insert_id })),
    ))
}

/// Set the quantity of a cart line (PUT /api/cart/{id}).
pub async fn update_cart_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ApiJson(payload): ApiJson<UpdateCartRequest>,
) -> Result<Json<Value>, AppError> {
    let quantity = payload.validate()?;

    let mut values = Map::new();
    values.insert("quantity".into(), Value::from(quantity));
    let updated = state.store.update(Table::Cart, id, values).await?;
    if updated.is_none() {
        return Err(ShopError::CartItemNotFound.into());
    }

    Ok(Json(json!({ "success": true })))
}

/// Remove a cart line (DELETE /api/cart/{id}).
pub async fn delete_cart_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let deleted = state.store.delete(Table::Cart, id).await?;
    if deleted.is_none() {
        return Err(ShopError::CartItemNotFound.into());
    }

    Ok(Json(json!({ "success": true })))
}
