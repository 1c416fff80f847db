//! In-process cache backend
//!
//! Shares one [`CacheEngine`] behind an async RwLock so request tasks and the
//! expiry sweep can use it concurrently.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::cache::{Cache, CacheEngine, CacheStats};
use crate::error::CacheResult;

#[derive(Debug, Clone)]
pub struct MemoryCache {
    engine: Arc<RwLock<CacheEngine>>,
}

impl MemoryCache {
    pub fn new(max_entries: usize, default_ttl_secs: u64) -> Self {
        Self {
            engine: Arc::new(RwLock::new(CacheEngine::new(max_entries, default_ttl_secs))),
        }
    }

    /// Drops every expired entry. Used by the background sweep.
    pub async fn purge_expired(&self) -> usize {
        self.engine.write().await.purge_expired()
    }

    pub async fn len(&self) -> usize {
        self.engine.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.engine.read().await.is_empty()
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        // Write lock: a read updates LRU order and stats
        Ok(self.engine.write().await.get(key))
    }

    async fn set(&self, key: &str, value: String, ttl_secs: u64) -> CacheResult<()> {
        let ttl = (ttl_secs > 0).then(|| Duration::from_secs(ttl_secs));
        self.engine.write().await.set(key, value, ttl)
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        self.engine.write().await.delete(key);
        Ok(())
    }

    async fn stats(&self) -> Option<CacheStats> {
        Some(self.engine.read().await.stats())
    }
}
