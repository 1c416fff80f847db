//! Product Service
//!
//! Thin delegation over the product store. No caching happens here; errors
//! from the store, NotFound included, pass through unchanged.

use std::sync::Arc;

use crate::error::Result;
use crate::models::{NewProduct, Product, ProductPatch};
use crate::store::ProductStore;

#[derive(Clone)]
pub struct ProductService {
    store: Arc<dyn ProductStore>,
}

impl ProductService {
    pub fn new(store: Arc<dyn ProductStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, fields: NewProduct) -> Result<Product> {
        self.store.create(fields).await
    }

    pub async fn find_all(&self) -> Result<Vec<Product>> {
        self.store.list().await
    }

    pub async fn find_one(&self, id: &str) -> Result<Product> {
        self.store.get(id).await
    }

    pub async fn update(&self, id: &str, patch: ProductPatch) -> Result<Product> {
        self.store.update(id, patch).await
    }

    pub async fn remove(&self, id: &str) -> Result<Product> {
        self.store.delete(id).await
    }
}
