//! Error types for the catalog service
//!
//! `CatalogError` is what callers of either transport see. `CacheError` stays
//! inside the service: the catalog absorbs it and degrades to the store.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Catalog Error Enum ==
/// Unified error type surfaced to callers.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    /// No product matches the identifier
    #[error("Product not found: {0}")]
    NotFound(String),

    /// Malformed input, rejected before reaching the store
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Store (or another required backend) could not be reached
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    /// Anything else
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CatalogError {
    /// Short machine-readable tag used by the message transport.
    pub fn kind(&self) -> &'static str {
        match self {
            CatalogError::NotFound(_) => "not_found",
            CatalogError::Validation(_) => "validation",
            CatalogError::BackendUnavailable(_) => "unavailable",
            CatalogError::Internal(_) => "internal",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            CatalogError::NotFound(_) => StatusCode::NOT_FOUND,
            CatalogError::Validation(_) => StatusCode::BAD_REQUEST,
            CatalogError::BackendUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            CatalogError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            CatalogError::BackendUnavailable(msg) => tracing::error!("Backend unavailable: {}", msg),
            CatalogError::NotFound(id) => tracing::debug!("Product not found: {}", id),
            _ => {}
        }

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Cache Error Enum ==
/// Failures reported by a cache backend.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CacheError {
    /// The backend refused the entry (key too long, value too large)
    #[error("Cache rejected entry: {0}")]
    Rejected(String),

    /// The backend could not be reached or returned an error
    #[error("Cache backend error: {0}")]
    Backend(String),
}

impl From<redis::RedisError> for CacheError {
    fn from(err: redis::RedisError) -> Self {
        CacheError::Backend(err.to_string())
    }
}

// == Result Type Aliases ==
/// Convenience Result type for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Result type for cache backend operations.
pub type CacheResult<T> = std::result::Result<T, CacheError>;
