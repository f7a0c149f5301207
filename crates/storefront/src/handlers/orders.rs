use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;

use storefront_core::shop::{order_record, Order, PlaceOrderRequest};
use storefront_core::storage::{self, RepositoryError, Table};

use super::timestamp;
use crate::{
    handlers::{ApiJson, AppError},
    state::AppState,
};

/// Place an order (POST /api/orders).
///
/// Only the last four card digits are persisted.
pub async fn place_order(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<PlaceOrderRequest>,
) -> Result<impl IntoResponse, AppError> {
    tracing::debug!(
        cart_items = payload.cart_items.len(),
        has_payment = payload.payment.is_some(),
        has_totals = payload.totals.is_some(),
        "Received order"
    );

    let values = order_record(&payload, &timestamp())?;
    let created = state.store.insert(Table::Orders, values).await?;

    tracing::info!(order_id = created.insert_id, "Order placed");
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "orderId": created.insert_id,
            "message": "Order placed successfully",
        })),
    ))
}

/// Get a placed order (GET /api/orders/{id}).
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Order>, AppError> {
    let records = state
        .store
        .select(Table::Orders, &storage::Query::by_id(id))
        .await?;
    let record = records.first().ok_or(RepositoryError::NotFound {
        entity_type: "Order",
        id: id.to_string(),
    })?;

    Ok(Json(Order::from_record(record)?))
}
