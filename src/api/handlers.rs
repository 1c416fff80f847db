//! API Handlers
//!
//! Each handler maps one HTTP request onto a catalog call.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::catalog::ProductCatalog;
use crate::error::{CatalogError, Result};
use crate::models::{
    ErrorResponse, HealthResponse, NewProduct, Product, ProductPatch, StatsResponse,
};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<ProductCatalog>,
}

impl AppState {
    pub fn new(catalog: Arc<ProductCatalog>) -> Self {
        Self { catalog }
    }
}

/// Turns body extraction failures into validation errors.
fn body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| CatalogError::Validation(rejection.body_text()))
}

/// Handler for POST /api/products
pub async fn create_product(
    State(state): State<AppState>,
    payload: std::result::Result<Json<NewProduct>, JsonRejection>,
) -> Result<(StatusCode, Json<Product>)> {
    let product = state.catalog.create(body(payload)?).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Handler for GET /api/products
pub async fn list_products(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    Ok(Json(state.catalog.list().await?))
}

/// Handler for GET /api/products/:id
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>> {
    Ok(Json(state.catalog.get(&id).await?))
}

/// Handler for PUT /api/products/:id
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<ProductPatch>, JsonRejection>,
) -> Result<Json<Product>> {
    Ok(Json(state.catalog.update(&id, body(payload)?).await?))
}

/// Handler for DELETE /api/products/:id
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>> {
    Ok(Json(state.catalog.delete(&id).await?))
}

/// Handler for GET /cache/stats
///
/// 404 when the configured cache backend does not track statistics.
pub async fn cache_stats(State(state): State<AppState>) -> Response {
    match state.catalog.cache_stats().await {
        Some(stats) => Json(StatsResponse::from(stats)).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("cache backend does not report statistics")),
        )
            .into_response(),
    }
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
