//! Cache Engine Module
//!
//! Synchronous core of the in-process cache: a HashMap of entries with LRU
//! tracking, lazy TTL expiry and a hard entry-count ceiling.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::cache::{CacheEntry, CacheStats, LruTracker, MAX_KEY_LENGTH, MAX_VALUE_SIZE};
use crate::error::{CacheError, CacheResult};

// == Cache Engine ==
#[derive(Debug)]
pub struct CacheEngine {
    entries: HashMap<String, CacheEntry>,
    lru: LruTracker,
    stats: CacheStats,
    /// Maximum number of entries allowed
    max_entries: usize,
    /// TTL applied when a caller passes none
    default_ttl: Duration,
}

impl CacheEngine {
    /// Creates an engine holding at most `max_entries` entries (minimum 1).
    pub fn new(max_entries: usize, default_ttl_secs: u64) -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            stats: CacheStats::new(),
            max_entries: max_entries.max(1),
            default_ttl: Duration::from_secs(default_ttl_secs),
        }
    }

    // == Set ==
    /// Stores a value, replacing any previous entry and resetting its TTL.
    ///
    /// A new key at capacity evicts the least recently used entry first.
    /// `ttl` of `None` applies the default TTL.
    pub fn set(&mut self, key: &str, value: String, ttl: Option<Duration>) -> CacheResult<()> {
        if key.len() > MAX_KEY_LENGTH {
            return Err(CacheError::Rejected(format!(
                "key exceeds maximum length of {} bytes",
                MAX_KEY_LENGTH
            )));
        }
        if value.len() > MAX_VALUE_SIZE {
            return Err(CacheError::Rejected(format!(
                "value exceeds maximum size of {} bytes",
                MAX_VALUE_SIZE
            )));
        }

        if !self.entries.contains_key(key) {
            while self.entries.len() >= self.max_entries {
                match self.lru.evict_oldest() {
                    Some(evicted) => {
                        self.entries.remove(&evicted);
                        self.stats.record_eviction();
                    }
                    None => break,
                }
            }
        }

        let ttl = ttl.unwrap_or(self.default_ttl);
        self.entries
            .insert(key.to_string(), CacheEntry::new(value, ttl));
        self.lru.touch(key);
        Ok(())
    }

    // == Get ==
    /// Returns the value if present and unexpired. Expired entries are
    /// dropped on the spot and count as misses.
    pub fn get(&mut self, key: &str) -> Option<String> {
        let now = Instant::now();
        match self.entries.get(key) {
            Some(entry) if entry.is_expired_at(now) => {
                self.entries.remove(key);
                self.lru.remove(key);
                self.stats.record_miss();
                None
            }
            Some(entry) => {
                let value = entry.value.clone();
                self.stats.record_hit();
                self.lru.touch(key);
                Some(value)
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    // == Delete ==
    /// Removes an entry. Returns whether one was present.
    pub fn delete(&mut self, key: &str) -> bool {
        self.lru.remove(key);
        self.entries.remove(key).is_some()
    }

    // == Purge Expired ==
    /// Removes every expired entry and returns how many were dropped.
    pub fn purge_expired(&mut self) -> usize {
        let now = Instant::now();
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            self.entries.remove(key);
            self.lru.remove(key);
        }
        expired.len()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            total_entries: self.entries.len(),
            ..self.stats.clone()
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
