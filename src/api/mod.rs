//! API Module
//!
//! HTTP adapter over the product catalog.
//!
//! # Endpoints
//! - `POST /api/products` - Create a product
//! - `GET /api/products` - List products
//! - `GET /api/products/:id` - Fetch one product
//! - `PUT /api/products/:id` - Partially update a product
//! - `DELETE /api/products/:id` - Delete a product
//! - `GET /cache/stats` - Cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
