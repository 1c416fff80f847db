//! Property-based tests for the cache-aside catalog.
//!
//! Without concurrency the catalog must be indistinguishable from reading the
//! store directly, whatever mix of reads and writes came before.

use std::sync::Arc;

use proptest::prelude::*;

use crate::cache::MemoryCache;
use crate::catalog::{ProductCatalog, TtlPolicy};
use crate::error::CatalogError;
use crate::models::{NewProduct, ProductPatch};
use crate::service::ProductService;
use crate::store::{MemoryProductStore, ProductStore};

#[derive(Debug, Clone)]
enum CatalogOp {
    Create { name: String, price: u32 },
    List,
    /// Index into the ids created so far; out-of-range means an unknown id
    Get(usize),
    Update { target: usize, price: u32 },
    Delete(usize),
}

fn op_strategy() -> impl Strategy<Value = CatalogOp> {
    prop_oneof![
        ("[A-Za-z]{1,12}", 0u32..10_000).prop_map(|(name, price)| CatalogOp::Create { name, price }),
        Just(CatalogOp::List),
        (0usize..8).prop_map(CatalogOp::Get),
        ((0usize..8), 0u32..10_000).prop_map(|(target, price)| CatalogOp::Update { target, price }),
        (0usize..8).prop_map(CatalogOp::Delete),
    ]
}

fn id_at(ids: &[String], idx: usize) -> String {
    ids.get(idx)
        .cloned()
        .unwrap_or_else(|| format!("unknown-{}", idx))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    // After every operation, catalog reads equal direct store reads.
    #[test]
    fn prop_catalog_reads_match_store(
        capacity in 1usize..8,
        ops in prop::collection::vec(op_strategy(), 1..40),
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        runtime.block_on(async move {
            let store = Arc::new(MemoryProductStore::new());
            let catalog = ProductCatalog::new(
                ProductService::new(store.clone()),
                Arc::new(MemoryCache::new(capacity, 3600)),
                TtlPolicy::default(),
            );
            let mut ids: Vec<String> = Vec::new();

            for op in ops {
                match op {
                    CatalogOp::Create { name, price } => {
                        let product = catalog
                            .create(NewProduct { name, description: None, price: price as f64 })
                            .await
                            .unwrap();
                        ids.push(product.id);
                    }
                    CatalogOp::List => {}
                    CatalogOp::Get(idx) => {
                        let id = id_at(&ids, idx);
                        prop_assert_eq!(catalog.get(&id).await, store.get(&id).await);
                    }
                    CatalogOp::Update { target, price } => {
                        let id = id_at(&ids, target);
                        let patch = ProductPatch { price: Some(price as f64), ..Default::default() };
                        let result = catalog.update(&id, patch).await;
                        if let Err(err) = result {
                            prop_assert!(matches!(err, CatalogError::NotFound(_)));
                        }
                    }
                    CatalogOp::Delete(idx) => {
                        let id = id_at(&ids, idx);
                        if let Err(err) = catalog.delete(&id).await {
                            prop_assert!(matches!(err, CatalogError::NotFound(_)));
                        }
                    }
                }

                prop_assert_eq!(catalog.list().await.unwrap(), store.list().await.unwrap());
            }
            Ok(())
        })?;
    }
}
