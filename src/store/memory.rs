//! In-process document store
//!
//! Documents live in a sequence-ordered map so listing preserves creation
//! order; a side index resolves ids to sequence numbers.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{new_product_id, ProductStore};
use crate::error::{CatalogError, Result};
use crate::models::{NewProduct, Product, ProductPatch};

#[derive(Debug, Default)]
struct Documents {
    next_seq: u64,
    by_seq: BTreeMap<u64, Product>,
    index: HashMap<String, u64>,
}

#[derive(Debug, Default)]
pub struct MemoryProductStore {
    documents: RwLock<Documents>,
}

impl MemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn not_found(id: &str) -> CatalogError {
    CatalogError::NotFound(id.to_string())
}

#[async_trait]
impl ProductStore for MemoryProductStore {
    async fn create(&self, fields: NewProduct) -> Result<Product> {
        let product = Product::from_new(new_product_id(), fields);
        let mut docs = self.documents.write().await;
        docs.next_seq += 1;
        let seq = docs.next_seq;
        docs.index.insert(product.id.clone(), seq);
        docs.by_seq.insert(seq, product.clone());
        Ok(product)
    }

    async fn get(&self, id: &str) -> Result<Product> {
        let docs = self.documents.read().await;
        docs.index
            .get(id)
            .and_then(|seq| docs.by_seq.get(seq))
            .cloned()
            .ok_or_else(|| not_found(id))
    }

    async fn list(&self) -> Result<Vec<Product>> {
        let docs = self.documents.read().await;
        Ok(docs.by_seq.values().cloned().collect())
    }

    async fn update(&self, id: &str, patch: ProductPatch) -> Result<Product> {
        let mut docs = self.documents.write().await;
        let seq = *docs.index.get(id).ok_or_else(|| not_found(id))?;
        let product = docs.by_seq.get_mut(&seq).ok_or_else(|| not_found(id))?;
        product.apply(patch);
        Ok(product.clone())
    }

    async fn delete(&self, id: &str) -> Result<Product> {
        let mut docs = self.documents.write().await;
        let seq = docs.index.remove(id).ok_or_else(|| not_found(id))?;
        docs.by_seq.remove(&seq).ok_or_else(|| not_found(id))
    }
}
