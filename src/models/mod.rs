//! Domain and transport models for the catalog
//!
//! `Product` is the stored record. The request types are the create and
//! update payloads shared by both transports. The response types are the
//! HTTP-only bodies.

pub mod product;
pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use product::Product;
pub use requests::{NewProduct, ProductPatch};
pub use responses::{ErrorResponse, HealthResponse, StatsResponse};
