use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::{json, Value};

use storefront_core::shop::{
    from_records, review_fields, sort_newest_first, Review, ReviewRequest, ReviewsQuery,
    ShopError,
};
use storefront_core::storage::{self, OrderBy, Table};

use super::timestamp;
use crate::{
    handlers::{ApiJson, AppError},
    state::AppState,
};

/// List reviews (GET /api/reviews?product_id=), newest first.
///
/// Without a product id every review is returned.
pub async fn list_reviews(
    State(state): State<AppState>,
    Query(params): Query<ReviewsQuery>,
) -> Result<Json<Vec<Review>>, AppError> {
    let mut query = storage::Query::all().order_by(OrderBy::desc("id"));
    if let Some(product_id) = params.product_id {
        query = query.where_eq("product_id", product_id);
    }

    let records = state.store.select(Table::Reviews, &query).await?;
    let mut reviews = from_records(&records, Review::from_record)?;
    sort_newest_first(&mut reviews, |review| review.created_at.as_deref());

    Ok(Json(reviews))
}

/// Create a review (POST /api/reviews?product_id=).
pub async fn create_review(
    State(state): State<AppState>,
    Query(params): Query<ReviewsQuery>,
    ApiJson(payload): ApiJson<ReviewRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut values = review_fields(&payload)?;
    values.insert(
        "product_id".into(),
        params.product_id.map_or(Value::Null, Value::from),
    );
    values.insert("created_at".into(), Value::from(timestamp()));

    let created = state.store.insert(Table::Reviews, values).await?;
    let records = state
        .store
        .select(Table::Reviews, &storage::Query::by_id(created.insert_id))
        .await?;
    let review = records
        .first()
        .map(Review::from_record)
        .transpose()?
        .ok_or(ShopError::ReviewNotFound)?;

    tracing::info!(review_id = review.id, product_id = ?review.product_id, "Created review");
    Ok((StatusCode::CREATED, Json(review)))
}

/// Replace a review's name, rating and comment (PUT /api/reviews/{id}).
pub async fn update_review(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ApiJson(payload): ApiJson<ReviewRequest>,
) -> Result<Json<Value>, AppError> {
    let values = review_fields(&payload)?;
    let updated = state.store.update(Table::Reviews, id, values).await?;
    if updated.is_none() {
        return Err(ShopError::ReviewNotFound.into());
    }

    Ok(Json(json!({ "message": "Review updated successfully" })))
}

/// Delete a review (DELETE /api/reviews/{id}).
pub async fn delete_review(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let deleted = state.store.delete(Table::Reviews, id).await?;
    if deleted.is_none() {
        return Err(ShopError::ReviewNotFound.into());
    }

    Ok(Json(json!({ "message": "Review deleted successfully" })))
}

/// Remove every review (DELETE /api/reviews).
pub async fn clear_reviews(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let removed = state.store.delete_all(Table::Reviews).await?;

    tracing::info!(deleted = removed.affected_rows, "Cleared reviews");
    Ok(Json(json!({
        "message": "All reviews cleared successfully",
        "deletedCount": removed.affected_rows,
    })))
}
