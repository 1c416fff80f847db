//! Cache Entry Module
//!
//! A single cached value together with its expiry deadline.

use std::time::{Duration, Instant};

// == Cache Entry ==
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The stored (serialized) value
    pub value: String,
    /// Expiry deadline, None = no expiration
    pub expires_at: Option<Instant>,
}

impl CacheEntry {
    /// Creates a new cache entry that expires `ttl` from now.
    ///
    /// A TTL too large to represent as an `Instant` never expires.
    pub fn new(value: String, ttl: Duration) -> Self {
        Self {
            value,
            expires_at: Instant::now().checked_add(ttl),
        }
    }

    // == Is Expired ==
    /// An entry is expired once `now >= expires_at`, so a fully elapsed TTL
    /// is never served.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|expires| now >= expires)
    }
}
