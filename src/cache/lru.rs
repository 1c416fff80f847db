//! LRU Tracker Module
//!
//! Least-recently-used ordering for capacity eviction. Every touch stamps the
//! key with a fresh tick; the smallest tick is the eviction candidate.

use std::collections::{BTreeMap, HashMap};

// == LRU Tracker ==
#[derive(Debug, Default)]
pub struct LruTracker {
    /// Monotonic access counter
    tick: u64,
    /// Last access tick per key
    by_key: HashMap<String, u64>,
    /// Keys ordered by last access (oldest first)
    by_tick: BTreeMap<u64, String>,
}

impl LruTracker {
    pub fn new() -> Self {
        Self::default()
    }

    // == Touch ==
    /// Marks a key as most recently used, inserting it if new.
    pub fn touch(&mut self, key: &str) {
        self.tick += 1;
        if let Some(previous) = self.by_key.insert(key.to_string(), self.tick) {
            self.by_tick.remove(&previous);
        }
        self.by_tick.insert(self.tick, key.to_string());
    }

    // == Remove ==
    pub fn remove(&mut self, key: &str) {
        if let Some(tick) = self.by_key.remove(key) {
            self.by_tick.remove(&tick);
        }
    }

    // == Evict Oldest ==
    /// Removes and returns the least recently used key.
    pub fn evict_oldest(&mut self) -> Option<String> {
        let (_, key) = self.by_tick.pop_first()?;
        self.by_key.remove(&key);
        Some(key)
    }
}
