//! Redis-backed document store
//!
//! Each product is a JSON document in the `products` hash, keyed by id.
//! Creation order lives in the `products:order` sorted set, scored from the
//! `products:seq` counter.

use std::fmt;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};

use super::{new_product_id, ProductStore};
use crate::error::{CatalogError, Result};
use crate::models::{NewProduct, Product, ProductPatch};

const DOCUMENTS_KEY: &str = "products";
const ORDER_KEY: &str = "products:order";
const SEQ_KEY: &str = "products:seq";

/// Rewrites a document only while it still exists, so an update racing a
/// delete cannot bring the record back. Returns 1 when written.
const UPDATE_IF_PRESENT: &str = r#"
    if redis.call("hexists", KEYS[1], ARGV[1]) == 1 then
        redis.call("hset", KEYS[1], ARGV[1], ARGV[2])
        return 1
    else
        return 0
    end
"#;

#[derive(Clone)]
pub struct RedisProductStore {
    connection: ConnectionManager,
}

impl fmt::Debug for RedisProductStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisProductStore")
            .field("connection", &"<ConnectionManager>")
            .finish()
    }
}

// Not logged here; each transport logs outages once
fn unavailable(err: redis::RedisError) -> CatalogError {
    CatalogError::BackendUnavailable(format!("store: {}", err))
}

fn decode(raw: &str) -> Result<Product> {
    serde_json::from_str(raw)
        .map_err(|e| CatalogError::Internal(format!("corrupt product document: {}", e)))
}

fn encode(product: &Product) -> Result<String> {
    serde_json::to_string(product)
        .map_err(|e| CatalogError::Internal(format!("failed to encode product: {}", e)))
}

impl RedisProductStore {
    pub async fn connect(url: &str) -> Result<Self> {
        let client = Client::open(url).map_err(|e| {
            CatalogError::BackendUnavailable(format!("invalid store address: {}", e))
        })?;
        let connection = ConnectionManager::new(client).await.map_err(unavailable)?;
        Ok(Self { connection })
    }

    /// Overwrites an existing document. NotFound if it was deleted meanwhile.
    async fn replace(&self, product: &Product) -> Result<()> {
        let document = encode(product)?;
        let mut conn = self.connection.clone();
        let written: i32 = redis::Script::new(UPDATE_IF_PRESENT)
            .key(DOCUMENTS_KEY)
            .arg(&product.id)
            .arg(document)
            .invoke_async(&mut conn)
            .await
            .map_err(unavailable)?;

        if written == 0 {
            return Err(CatalogError::NotFound(product.id.clone()));
        }
        Ok(())
    }

    async fn fetch(&self, id: &str) -> Result<Product> {
        let mut conn = self.connection.clone();
        let raw: Option<String> = conn.hget(DOCUMENTS_KEY, id).await.map_err(unavailable)?;
        match raw {
            Some(raw) => decode(&raw),
            None => Err(CatalogError::NotFound(id.to_string())),
        }
    }
}

#[async_trait]
impl ProductStore for RedisProductStore {
    async fn create(&self, fields: NewProduct) -> Result<Product> {
        let product = Product::from_new(new_product_id(), fields);
        let document = encode(&product)?;
        let mut conn = self.connection.clone();

        let seq: i64 = conn.incr(SEQ_KEY, 1).await.map_err(unavailable)?;
        redis::pipe()
            .atomic()
            .hset(DOCUMENTS_KEY, &product.id, document)
            .ignore()
            .zadd(ORDER_KEY, &product.id, seq)
            .ignore()
            .query_async::<()>(&mut conn)
            .await
            .map_err(unavailable)?;

        Ok(product)
    }

    async fn get(&self, id: &str) -> Result<Product> {
        self.fetch(id).await
    }

    async fn list(&self) -> Result<Vec<Product>> {
        let mut conn = self.connection.clone();
        let ids: Vec<String> = conn.zrange(ORDER_KEY, 0, -1).await.map_err(unavailable)?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let raw: Vec<Option<String>> = redis::cmd("HMGET")
            .arg(DOCUMENTS_KEY)
            .arg(&ids)
            .query_async(&mut conn)
            .await
            .map_err(unavailable)?;

        // A document deleted between the two reads is skipped
        raw.into_iter().flatten().map(|doc| decode(&doc)).collect()
    }

    async fn update(&self, id: &str, patch: ProductPatch) -> Result<Product> {
        let mut product = self.fetch(id).await?;
        product.apply(patch);
        self.replace(&product).await?;
        Ok(product)
    }

    async fn delete(&self, id: &str) -> Result<Product> {
        let product = self.fetch(id).await?;

        let mut conn = self.connection.clone();
        let (removed,): (i64,) = redis::pipe()
            .atomic()
            .hdel(DOCUMENTS_KEY, id)
            .zrem(ORDER_KEY, id)
            .ignore()
            .query_async(&mut conn)
            .await
            .map_err(unavailable)?;

        if removed == 0 {
            // Lost a race with another delete
            return Err(CatalogError::NotFound(id.to_string()));
        }
        Ok(product)
    }
}
