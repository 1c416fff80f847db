//! Configuration Module
//!
//! Handles loading service configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Which cache backend sits in front of the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheBackend {
    /// In-process TTL + LRU cache
    Memory,
    /// Shared Redis server
    Redis,
}

impl FromStr for CacheBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" | "in_memory" | "inmemory" => Ok(CacheBackend::Memory),
            "redis" => Ok(CacheBackend::Redis),
            other => Err(format!(
                "Unknown cache backend: {}. Valid backends: memory, redis",
                other
            )),
        }
    }
}

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub http_port: u16,
    /// TCP message-dispatch port
    pub tcp_port: u16,
    /// Document store address (`memory://` or `redis://host:port/db`)
    pub store_uri: String,
    /// Cache backend selection
    pub cache_backend: CacheBackend,
    /// Redis cache host
    pub redis_host: String,
    /// Redis cache port
    pub redis_port: u16,
    /// Namespace for Redis cache keys, None = unprefixed
    pub cache_key_prefix: Option<String>,
    /// Fallback TTL in seconds for entries set without one
    pub cache_default_ttl: u64,
    /// Maximum number of entries in the in-process cache
    pub cache_max_entries: usize,
    /// TTL in seconds for the whole-collection entry
    pub list_ttl: u64,
    /// TTL in seconds for single-product entries
    pub item_ttl: u64,
    /// Interval in seconds between expiry sweeps of the in-process cache
    pub cleanup_interval: u64,
    /// Per-request deadline in milliseconds
    pub request_timeout_ms: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `PORT` - HTTP port (default: 3000)
    /// - `MICROSERVICE_PORT` - TCP message port (default: 3001)
    /// - `STORE_URI` - Document store address (default: `memory://`)
    /// - `CACHE_BACKEND` - `memory` or `redis` (default: memory)
    /// - `REDIS_HOST` / `REDIS_PORT` - Redis cache address (default: localhost:6379)
    /// - `CACHE_KEY_PREFIX` - Namespace for Redis cache keys (default: none)
    /// - `CACHE_TTL` - Default TTL in seconds (default: 3600)
    /// - `CACHE_MAX` - Maximum cache entries (default: 50)
    /// - `CACHE_LIST_TTL` - TTL for the product list (default: 10000)
    /// - `CACHE_ITEM_TTL` - TTL for single products (default: 30)
    /// - `CLEANUP_INTERVAL` - Expiry sweep frequency in seconds (default: 1)
    /// - `REQUEST_TIMEOUT_MS` - Request deadline (default: 5000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            http_port: parse_env("PORT", defaults.http_port),
            tcp_port: parse_env("MICROSERVICE_PORT", defaults.tcp_port),
            store_uri: env::var("STORE_URI").unwrap_or(defaults.store_uri),
            cache_backend: parse_env("CACHE_BACKEND", defaults.cache_backend),
            redis_host: env::var("REDIS_HOST").unwrap_or(defaults.redis_host),
            redis_port: parse_env("REDIS_PORT", defaults.redis_port),
            cache_key_prefix: env::var("CACHE_KEY_PREFIX")
                .ok()
                .and_then(|prefix| non_empty(&prefix)),
            cache_default_ttl: parse_env("CACHE_TTL", defaults.cache_default_ttl),
            cache_max_entries: parse_env("CACHE_MAX", defaults.cache_max_entries),
            list_ttl: parse_env("CACHE_LIST_TTL", defaults.list_ttl),
            item_ttl: parse_env("CACHE_ITEM_TTL", defaults.item_ttl),
            cleanup_interval: parse_env("CLEANUP_INTERVAL", defaults.cleanup_interval),
            request_timeout_ms: parse_env("REQUEST_TIMEOUT_MS", defaults.request_timeout_ms),
        }
    }

    /// Redis URL for the cache backend.
    pub fn redis_url(&self) -> String {
        format!("redis://{}:{}", self.redis_host, self.redis_port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_port: 3000,
            tcp_port: 3001,
            store_uri: "memory://".to_string(),
            cache_backend: CacheBackend::Memory,
            redis_host: "localhost".to_string(),
            redis_port: 6379,
            cache_key_prefix: None,
            cache_default_ttl: 3600,
            cache_max_entries: 50,
            list_ttl: 10_000,
            item_ttl: 30,
            cleanup_interval: 1,
            request_timeout_ms: 5000,
        }
    }
}

/// Reads `key` and parses it, falling back to `default` when unset or invalid.
fn parse_env<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}
