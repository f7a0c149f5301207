use axum::{
    extract::{Query, State},
    Json,
};

use storefront_core::shop::{
    from_records, search_products, sort_newest_first, Product, SearchEntry, SearchQuery,
    SEARCH_HISTORY_LIMIT,
};
use storefront_core::storage::{self, OrderBy, Table};

use super::timestamp;
use crate::{handlers::AppError, state::AppState};

/// Search products by name (GET /api/search?q=).
///
/// A blank term returns nothing and is not recorded.
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<Vec<Product>>, AppError> {
    let term = params.q.as_deref().map(str::trim).unwrap_or_default();
    if term.is_empty() {
        return Ok(Json(Vec::new()));
    }

    state
        .store
        .insert(Table::SearchHistory, SearchEntry::new_record(term, &timestamp()))
        .await?;

    let records = state
        .store
        .select(
            Table::Products,
            &storage::Query::all().order_by(OrderBy::desc("id")),
        )
        .await?;
    let products = from_records(&records, Product::from_record)?;
    let found = search_products(products, term);

    tracing::debug!(term, results = found.len(), "Product search");
    Ok(Json(found))
}

/// Recent search terms (GET /api/search-history), newest first.
pub async fn search_history(
    State(state): State<AppState>,
) -> Result<Json<Vec<SearchEntry>>, AppError> {
    let records = state
        .store
        .select(
            Table::SearchHistory,
            &storage::Query::all().order_by(OrderBy::desc("id")),
        )
        .await?;
    let mut history = from_records(&records, SearchEntry::from_record)?;
    sort_newest_first(&mut history, |entry| entry.created_at.as_deref());
    history.truncate(SEARCH_HISTORY_LIMIT);

    Ok(Json(history))
}
