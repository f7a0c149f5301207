use std::time::Duration;

use axum::{
    http::{header, Method, StatusCode},
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::{
    handlers::{
        cart::{add_to_cart, count_cart, delete_cart_item, list_cart, update_cart_item},
        health::{healthz, livez},
        orders::{get_order, place_order},
        products::{create_product, delete_product, get_product, list_products, update_product},
        reviews::{clear_reviews, create_review, delete_review, list_reviews, update_review},
        search::{search, search_history},
    },
    state::AppState,
};

/// Create the application router with all routes and middleware.
pub fn create_app(state: AppState) -> Router {
    // CORS configuration for API endpoints
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    let api_routes = Router::new()
        // Product routes
        .route("/products", get(list_products).post(create_product))
        .route(
            "/products/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        // Cart routes
        .route("/cart", get(list_cart).post(add_to_cart))
        .route("/cart/count", get(count_cart))
        .route("/cart/{id}", put(update_cart_item).delete(delete_cart_item))
        // Order routes
        .route("/orders", post(place_order))
        .route("/orders/{id}", get(get_order))
        // Review routes
        .route(
            "/reviews",
            get(list_reviews).post(create_review).delete(clear_reviews),
        )
        .route("/reviews/{id}", put(update_review).delete(delete_review))
        // Search routes
        .route("/search", get(search))
        .route("/search-history", get(search_history))
        .layer(cors);

    Router::new()
        .route("/livez", get(livez))
        .route("/healthz", get(healthz))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(10),
        ))
        .with_state(state)
}
