//! API Routes
//!
//! Configures the Axum router for the catalog endpoints.

use std::time::Duration;

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use super::handlers::{
    cache_stats, create_product, delete_product, get_product, health_handler, list_products,
    update_product, AppState,
};

/// Creates the main router.
///
/// # Middleware
/// - Timeout: requests exceeding `request_timeout` are cancelled with 408;
///   dropping the handler future cancels its in-flight store and cache calls
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState, request_timeout: Duration) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/products", get(list_products).post(create_product))
        .route(
            "/api/products/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/cache/stats", get(cache_stats))
        .route("/health", get(health_handler))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
