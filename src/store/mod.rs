//! Store Module
//!
//! Persistence of product records. [`ProductStore`] is the seam the service
//! layer talks to; [`connect`] picks a backend from the configured address.

mod memory;
mod redis;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{CatalogError, Result};
use crate::models::{NewProduct, Product, ProductPatch};

pub use memory::MemoryProductStore;
pub use self::redis::RedisProductStore;

/// Persistence contract for product records.
///
/// Every lookup by id signals [`CatalogError::NotFound`] when no record
/// matches; backend outages surface as [`CatalogError::BackendUnavailable`].
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Persists a new product and returns it with its assigned id.
    async fn create(&self, fields: NewProduct) -> Result<Product>;

    async fn get(&self, id: &str) -> Result<Product>;

    /// All products, in creation order.
    async fn list(&self) -> Result<Vec<Product>>;

    /// Applies a partial update and returns the stored result.
    async fn update(&self, id: &str, patch: ProductPatch) -> Result<Product>;

    /// Removes a product and returns the record as it was.
    async fn delete(&self, id: &str) -> Result<Product>;
}

/// Opens the store named by `uri`: `memory://` or `redis://host:port[/db]`.
pub async fn connect(uri: &str) -> Result<Arc<dyn ProductStore>> {
    if uri.starts_with("memory://") {
        Ok(Arc::new(MemoryProductStore::new()))
    } else if uri.starts_with("redis://") || uri.starts_with("rediss://") {
        Ok(Arc::new(RedisProductStore::connect(uri).await?))
    } else {
        Err(CatalogError::Internal(format!(
            "Unsupported store address: {}. Use memory:// or redis://",
            uri
        )))
    }
}

/// Fresh opaque product identifier.
pub(crate) fn new_product_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
