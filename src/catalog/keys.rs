//! Cache keys and TTL policy for catalog reads.

use std::fmt;

use crate::config::Config;

/// Sentinel key for the whole product list.
pub const ALL_PRODUCTS_KEY: &str = "all_products";

/// Prefix for single-product keys (`product_<id>`).
pub const PRODUCT_KEY_PREFIX: &str = "product_";

/// A cache key derived from the operation and, for single items, the id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheKey<'a> {
    AllProducts,
    Product(&'a str),
}

impl fmt::Display for CacheKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::AllProducts => f.write_str(ALL_PRODUCTS_KEY),
            CacheKey::Product(id) => write!(f, "{}{}", PRODUCT_KEY_PREFIX, id),
        }
    }
}

/// TTLs per key shape: long for the list, short for single products.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtlPolicy {
    pub list_ttl_secs: u64,
    pub item_ttl_secs: u64,
}

impl TtlPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            list_ttl_secs: config.list_ttl,
            item_ttl_secs: config.item_ttl,
        }
    }

    pub fn ttl_for(&self, key: CacheKey<'_>) -> u64 {
        match key {
            CacheKey::AllProducts => self.list_ttl_secs,
            CacheKey::Product(_) => self.item_ttl_secs,
        }
    }
}

impl Default for TtlPolicy {
    fn default() -> Self {
        Self {
            list_ttl_secs: 10_000,
            item_ttl_secs: 30,
        }
    }
}
