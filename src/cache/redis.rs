//! Redis cache backend
//!
//! Entries are plain string keys written with `SET EX`. Capacity is governed
//! by the server's own `maxmemory` policy.

use std::fmt;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};

use crate::cache::Cache;
use crate::error::{CacheError, CacheResult};

#[derive(Clone)]
pub struct RedisCache {
    connection: ConnectionManager,
    key_prefix: Option<String>,
    default_ttl_secs: u64,
}

impl fmt::Debug for RedisCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisCache")
            .field("key_prefix", &self.key_prefix)
            .field("default_ttl_secs", &self.default_ttl_secs)
            .field("connection", &"<ConnectionManager>")
            .finish()
    }
}

impl RedisCache {
    /// Connects to the Redis server at `url` (e.g. `redis://127.0.0.1:6379`).
    pub async fn connect(url: &str, default_ttl_secs: u64) -> CacheResult<Self> {
        let client = Client::open(url)
            .map_err(|e| CacheError::Backend(format!("Failed to create Redis client: {}", e)))?;
        let connection = ConnectionManager::new(client)
            .await
            .map_err(|e| CacheError::Backend(format!("Failed to connect to Redis: {}", e)))?;

        Ok(Self {
            connection,
            key_prefix: None,
            default_ttl_secs: default_ttl_secs.max(1),
        })
    }

    /// Namespaces every key as `<prefix>:<key>`.
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }

    fn prefix_key(&self, key: &str) -> String {
        match &self.key_prefix {
            Some(prefix) => format!("{}:{}", prefix, key),
            None => key.to_string(),
        }
    }
}

#[async_trait]
impl Cache for RedisCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let mut conn = self.connection.clone();
        let value: Option<String> = conn.get(self.prefix_key(key)).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: String, ttl_secs: u64) -> CacheResult<()> {
        let mut conn = self.connection.clone();
        let ttl = if ttl_secs == 0 {
            self.default_ttl_secs
        } else {
            ttl_secs
        };
        let _: () = conn.set_ex(self.prefix_key(key), value, ttl).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        let mut conn = self.connection.clone();
        let _: i64 = conn.del(self.prefix_key(key)).await?;
        Ok(())
    }
}
