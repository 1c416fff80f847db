//! Catalog Module
//!
//! Cache-aside orchestration around the product service. Reads consult the
//! cache first and fill it on a miss; writes go to the store and then
//! invalidate every key the mutation could have made stale.
//!
//! # Keys
//! - `all_products`: the full list, long TTL
//! - `product_<id>`: a single product, short TTL
//!
//! # Consistency
//! No locks are taken. A read that misses, fetches, and writes back *after* a
//! concurrent write has invalidated the key leaves a stale entry in place until
//! its TTL runs out. Single-product entries keep a short TTL to bound that
//! window.
//!
//! Cache failures never fail a request. On reads the catalog falls back to the
//! store. On writes the failed invalidation is logged and the mutation stands.

mod keys;

#[cfg(test)]
mod property_tests;

use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::cache::{Cache, CacheStats};
use crate::error::{CatalogError, Result};
use crate::models::{NewProduct, Product, ProductPatch};
use crate::service::ProductService;

pub use keys::{CacheKey, TtlPolicy, ALL_PRODUCTS_KEY, PRODUCT_KEY_PREFIX};

/// The cache-aside orchestrator shared by every transport adapter.
#[derive(Clone)]
pub struct ProductCatalog {
    service: ProductService,
    cache: Arc<dyn Cache>,
    ttl: TtlPolicy,
}

impl ProductCatalog {
    pub fn new(service: ProductService, cache: Arc<dyn Cache>, ttl: TtlPolicy) -> Self {
        Self {
            service,
            cache,
            ttl,
        }
    }

    // == Reads ==

    /// Lists all products, served from `all_products` when cached.
    pub async fn list(&self) -> Result<Vec<Product>> {
        let key = CacheKey::AllProducts;
        if let Some(products) = self.read_cached::<Vec<Product>>(key).await {
            debug!("Cache hit for {}", key);
            return Ok(products);
        }

        debug!("Fetching all products - Cache miss");
        let products = self.service.find_all().await?;
        self.fill(key, &products).await;
        Ok(products)
    }

    /// Fetches one product, served from `product_<id>` when cached.
    ///
    /// NotFound is never cached: every lookup of a missing id reaches the store.
    pub async fn get(&self, id: &str) -> Result<Product> {
        validate_id(id)?;
        let key = CacheKey::Product(id);
        if let Some(product) = self.read_cached::<Product>(key).await {
            debug!("Cache hit for {}", key);
            return Ok(product);
        }

        debug!("Cache miss for product {}", id);
        let product = self.service.find_one(id).await?;
        self.fill(key, &product).await;
        Ok(product)
    }

    // == Writes ==

    /// Creates a product and drops the cached list. The new product's own key
    /// is left to be filled by its first read.
    pub async fn create(&self, fields: NewProduct) -> Result<Product> {
        if let Some(msg) = fields.validate() {
            return Err(CatalogError::Validation(msg));
        }

        let product = self.service.create(fields).await?;
        self.invalidate(&[CacheKey::AllProducts]).await;
        Ok(product)
    }

    /// Applies a partial update, then drops the list and the product's key.
    /// NotFound leaves the cache untouched.
    pub async fn update(&self, id: &str, patch: ProductPatch) -> Result<Product> {
        validate_id(id)?;
        if let Some(msg) = patch.validate() {
            return Err(CatalogError::Validation(msg));
        }

        let product = self.service.update(id, patch).await?;
        self.invalidate(&[CacheKey::AllProducts, CacheKey::Product(id)])
            .await;
        Ok(product)
    }

    /// Deletes a product, then drops the list and the product's key.
    /// NotFound leaves the cache untouched.
    pub async fn delete(&self, id: &str) -> Result<Product> {
        validate_id(id)?;

        let product = self.service.remove(id).await?;
        self.invalidate(&[CacheKey::AllProducts, CacheKey::Product(id)])
            .await;
        Ok(product)
    }

    pub async fn cache_stats(&self) -> Option<CacheStats> {
        self.cache.stats().await
    }

    // == Cache plumbing ==

    /// Cached value for `key`, or None on a miss, a backend error or an
    /// undecodable payload.
    async fn read_cached<T: DeserializeOwned>(&self, key: CacheKey<'_>) -> Option<T> {
        let raw = match self.cache.get(&key.to_string()).await {
            Ok(raw) => raw?,
            Err(e) => {
                warn!("Cache read for {} failed, falling back to store: {}", key, e);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Discarding undecodable cache entry {}: {}", key, e);
                None
            }
        }
    }

    async fn fill<T: Serialize>(&self, key: CacheKey<'_>, value: &T) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Failed to serialize value for {}: {}", key, e);
                return;
            }
        };

        if let Err(e) = self
            .cache
            .set(&key.to_string(), raw, self.ttl.ttl_for(key))
            .await
        {
            warn!("Cache fill for {} failed: {}", key, e);
        }
    }

    async fn invalidate(&self, keys: &[CacheKey<'_>]) {
        for key in keys {
            if let Err(e) = self.cache.delete(&key.to_string()).await {
                warn!(
                    "Cache invalidation for {} failed, entry may be stale until TTL: {}",
                    key, e
                );
            }
        }
    }
}

fn validate_id(id: &str) -> Result<()> {
    if id.trim().is_empty() {
        Err(CatalogError::Validation("id must not be empty".to_string()))
    } else {
        Ok(())
    }
}
