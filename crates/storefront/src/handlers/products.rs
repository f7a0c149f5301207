use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use storefront_core::shop::{
    from_records, CreateProductRequest, ListProductsQuery, Product, ShopError,
    UpdateProductRequest,
};
use storefront_core::storage::{self, OrderBy, Table, TableStore};

use crate::{
    handlers::{ApiJson, AppError},
    state::AppState,
};

/// Loads one product, or `None` when the id is unknown.
pub(crate) async fn find_product(store: &dyn TableStore, id: i64) -> anyhow::Result<Option<Product>> {
    let records = store.select(Table::Products, &storage::Query::by_id(id)).await?;
    Ok(records.first().map(Product::from_record).transpose()?)
}

/// List products (GET /api/products?gender=&sale=), newest first.
pub async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<ListProductsQuery>,
) -> Result<Json<Vec<Product>>, AppError> {
    let mut query = storage::Query::all().order_by(OrderBy::desc("id"));
    if let Some(gender_id) = params.gender {
        query = query.where_eq("gender_id", gender_id);
    }
    if let Some(sale) = params.sale {
        query = query.where_eq("sale", i64::from(sale));
    }

    let records = state.store.select(Table::Products, &query).await?;
    Ok(Json(from_records(&records, Product::from_record)?))
}

/// Get a single product (GET /api/products/{id}).
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Product>, AppError> {
    let product = find_product(state.store.as_ref(), id)
        .await?
        .ok_or(ShopError::ProductNotFound)?;
    Ok(Json(product))
}

/// Create a product (POST /api/products).
pub async fn create_product(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateProductRequest>,
) -> Result<impl IntoResponse, AppError> {
    let values = payload.into_record()?;
    let created = state.store.insert(Table::Products, values).await?;

    let product = find_product(state.store.as_ref(), created.insert_id)
        .await?
        .ok_or(ShopError::ProductNotFound)?;

    tracing::info!(product_id = product.id, name = %product.name, "Created product");
    Ok((StatusCode::CREATED, Json(product)))
}

/// Partially update a product (PUT /api/products/{id}).
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ApiJson(payload): ApiJson<UpdateProductRequest>,
) -> Result<Json<Product>, AppError> {
    let values = payload.into_record()?;
    let updated = state.store.update(Table::Products, id, values).await?;
    if updated.is_none() {
        return Err(ShopError::ProductNotFound.into());
    }

    let product = find_product(state.store.as_ref(), id)
        .await?
        .ok_or(ShopError::ProductNotFound)?;

    tracing::info!(product_id = id, "Updated product");
    Ok(Json(product))
}

/// Delete a product (DELETE /api/products/{id}), returning what was removed.
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Product>, AppError> {
    let product = find_product(state.store.as_ref(), id)
        .await?
        .ok_or(ShopError::ProductNotFound)?;
    state.store.delete(Table::Products, id).await?;

    tracing::info!(product_id = id, "Deleted product");
    Ok(Json(product))
}
