//! Product Catalog - CRUD service with cache-aside response caching
//!
//! Products are persisted in a document store and served over HTTP and a TCP
//! message transport. Both transports share one [`ProductCatalog`], which
//! keeps a TTL cache in front of the store and invalidates it on every write.

pub mod api;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
pub mod service;
pub mod store;
pub mod tasks;
pub mod transport;

pub use api::AppState;
pub use catalog::{ProductCatalog, TtlPolicy};
pub use config::Config;
pub use error::{CacheError, CatalogError};
pub use service::ProductService;
pub use tasks::spawn_cleanup_task;
