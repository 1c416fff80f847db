//! Cache Module
//!
//! Key/value cache with per-entry TTL, used as a disposable acceleration
//! layer in front of the product store. Two backends implement [`Cache`]:
//! the in-process [`MemoryCache`] (TTL expiry plus LRU capacity eviction) and
//! the shared [`RedisCache`].

mod engine;
mod entry;
mod lru;
mod memory;
mod redis;
mod stats;


use async_trait::async_trait;

use crate::error::CacheResult;

// Re-export public types
pub use engine::CacheEngine;
pub use entry::CacheEntry;
pub use lru::LruTracker;
pub use memory::MemoryCache;
pub use self::redis::RedisCache;
pub use stats::CacheStats;

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Maximum allowed value size in bytes
pub const MAX_VALUE_SIZE: usize = 1024 * 1024; // 1 MB

// == Cache Trait ==
/// Contract every cache backend provides.
///
/// A TTL of `0` means "use the backend's default TTL". Implementations must be
/// safe for concurrent use; callers hold them behind an `Arc`.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Returns the stored value, or `None` on a miss or an expired entry.
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Stores `value` under `key`, replacing any previous entry and its TTL.
    async fn set(&self, key: &str, value: String, ttl_secs: u64) -> CacheResult<()>;

    /// Removes `key`. Removing an absent key is not an error.
    async fn delete(&self, key: &str) -> CacheResult<()>;

    /// Hit/miss statistics, for backends that track them.
    async fn stats(&self) -> Option<CacheStats> {
        None
    }
}
