//! Command dispatch for the message transport
//!
//! Parses a request into a command, runs it against the catalog under the
//! request deadline, and packages the outcome as a response.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error};

use super::message::{MessageRequest, MessageResponse};
use crate::catalog::ProductCatalog;
use crate::error::CatalogError;

pub const GET_PRODUCTS: &str = "get_products";
pub const GET_PRODUCT: &str = "get_product";

pub const NO_HANDLER_MESSAGE: &str =
    "There is no matching message handler defined in the remote service.";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DispatchError {
    #[error("There is no matching message handler defined in the remote service.")]
    NoHandler(String),

    #[error("Malformed message: {0}")]
    Malformed(String),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

impl DispatchError {
    /// Value of `err.status` in the response.
    pub fn status(&self) -> &'static str {
        match self {
            DispatchError::NoHandler(_) => "no_handler",
            DispatchError::Malformed(_) => "validation",
            DispatchError::Catalog(e) => e.kind(),
        }
    }

    pub(super) fn into_response(self, id: impl Into<String>) -> MessageResponse {
        if let DispatchError::Catalog(CatalogError::BackendUnavailable(msg)) = &self {
            error!("Backend unavailable: {}", msg);
        }
        MessageResponse::error(id, self.status(), self.to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Command {
    GetProducts,
    GetProduct(String),
}

impl Command {
    fn parse(request: &MessageRequest) -> Result<Self, DispatchError> {
        match request.pattern.cmd.as_str() {
            GET_PRODUCTS => Ok(Command::GetProducts),
            GET_PRODUCT => match &request.data {
                Value::String(id) => Ok(Command::GetProduct(id.clone())),
                other => Err(CatalogError::Validation(format!(
                    "{} expects the product id as a string, got {}",
                    GET_PRODUCT, other
                ))
                .into()),
            },
            other => Err(DispatchError::NoHandler(other.to_string())),
        }
    }
}

/// Routes message-transport commands to the shared catalog.
#[derive(Clone)]
pub struct MessageDispatcher {
    catalog: Arc<ProductCatalog>,
    request_timeout: Duration,
}

impl MessageDispatcher {
    pub fn new(catalog: Arc<ProductCatalog>, request_timeout: Duration) -> Self {
        Self {
            catalog,
            request_timeout,
        }
    }

    /// Handles one raw frame. Unparseable frames, including ones that are not
    /// UTF-8, get an error with an empty id.
    pub async fn dispatch_frame(&self, frame: &[u8]) -> MessageResponse {
        match serde_json::from_slice::<MessageRequest>(frame) {
            Ok(request) => self.dispatch(request).await,
            Err(e) => DispatchError::Malformed(e.to_string()).into_response(""),
        }
    }

    /// Runs a request under the configured deadline.
    pub async fn dispatch(&self, request: MessageRequest) -> MessageResponse {
        let id = request.id.clone();
        match tokio::time::timeout(self.request_timeout, self.execute(request)).await {
            Ok(Ok(value)) => MessageResponse::ok(id, value),
            Ok(Err(e)) => e.into_response(id),
            Err(_) => DispatchError::Catalog(CatalogError::BackendUnavailable(
                "request deadline exceeded".to_string(),
            ))
            .into_response(id),
        }
    }

    async fn execute(&self, request: MessageRequest) -> Result<Value, DispatchError> {
        let value = match Command::parse(&request)? {
            Command::GetProducts => {
                debug!("Getting products via microservice");
                serde_json::to_value(self.catalog.list().await?)
            }
            Command::GetProduct(id) => {
                debug!("Getting product {} via microservice", id);
                serde_json::to_value(self.catalog.get(&id).await?)
            }
        };
        value.map_err(|e| CatalogError::Internal(e.to_string()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use async_trait::async_trait;

    use crate::cache::MemoryCache;
    use crate::catalog::TtlPolicy;
    use crate::error::Result;
    use crate::models::{NewProduct, Product, ProductPatch};
    use crate::service::ProductService;
    use crate::store::{MemoryProductStore, ProductStore};

    /// Store whose list call outlasts any short deadline.
    #[derive(Default)]
    struct SlowStore {
        inner: MemoryProductStore,
    }

    #[async_trait]
    impl ProductStore for SlowStore {
        async fn create(&self, fields: NewProduct) -> Result<Product> {
            self.inner.create(fields).await
        }

        async fn get(&self, id: &str) -> Result<Product> {
            self.inner.get(id).await
        }

        async fn list(&self) -> Result<Vec<Product>> {
            tokio::time::sleep(Duration::from_millis(500)).await;
            self.inner.list().await
        }

        async fn update(&self, id: &str, patch: ProductPatch) -> Result<Product> {
            self.inner.update(id, patch).await
        }

        async fn delete(&self, id: &str) -> Result<Product> {
            self.inner.delete(id).await
        }
    }

    fn test_dispatcher() -> (MessageDispatcher, Arc<ProductCatalog>) {
        let catalog = Arc::new(ProductCatalog::new(
            ProductService::new(Arc::new(MemoryProductStore::new())),
            Arc::new(MemoryCache::new(50, 3600)),
            TtlPolicy::default(),
        ));
        (
            MessageDispatcher::new(catalog.clone(), Duration::from_secs(5)),
            catalog,
        )
    }

    #[test]
    fn test_parse_commands() {
        let req = MessageRequest::new("1", GET_PRODUCTS, Value::Null);
        assert_eq!(Command::parse(&req), Ok(Command::GetProducts));

        let req = MessageRequest::new("1", GET_PRODUCT, json!("abc"));
        assert_eq!(Command::parse(&req), Ok(Command::GetProduct("abc".into())));

        let req = MessageRequest::new("1", GET_PRODUCT, json!({"id": "abc"}));
        assert!(matches!(
            Command::parse(&req),
            Err(DispatchError::Catalog(CatalogError::Validation(_)))
        ));

        let req = MessageRequest::new("1", "create_product", Value::Null);
        assert!(matches!(Command::parse(&req), Err(DispatchError::NoHandler(_))));
    }

    #[tokio::test]
    async fn test_dispatch_get_products() {
        let (dispatcher, catalog) = test_dispatcher();
        let created = catalog
            .create(NewProduct {
                name: "Mug".to_string(),
                description: None,
                price: 8.0,
            })
            .await
            .unwrap();

        let resp = dispatcher
            .dispatch(MessageRequest::new("a1", GET_PRODUCTS, Value::Null))
            .await;
        assert_eq!(resp.id, "a1");
        assert_eq!(resp.response, Some(json!([created])));
    }

    #[tokio::test]
    async fn test_dispatch_get_missing_product() {
        let (dispatcher, _) = test_dispatcher();
        let resp = dispatcher
            .dispatch(MessageRequest::new("a2", GET_PRODUCT, json!("missing")))
            .await;

        assert_eq!(resp.id, "a2");
        assert_eq!(resp.err.unwrap().status, "not_found");
    }

    #[tokio::test]
    async fn test_dispatch_unknown_command() {
        let (dispatcher, _) = test_dispatcher();
        let resp = dispatcher
            .dispatch(MessageRequest::new("a3", "delete_everything", Value::Null))
            .await;

        let err = resp.err.unwrap();
        assert_eq!(err.status, "no_handler");
        assert_eq!(err.message, NO_HANDLER_MESSAGE);
    }

    #[tokio::test]
    async fn test_dispatch_malformed_frame() {
        let (dispatcher, _) = test_dispatcher();
        let resp = dispatcher.dispatch_frame(b"{not json").await;

        assert_eq!(resp.id, "");
        assert_eq!(resp.err.unwrap().status, "validation");
    }

    #[tokio::test]
    async fn test_dispatch_non_utf8_frame() {
        let (dispatcher, _) = test_dispatcher();
        let resp = dispatcher.dispatch_frame(b"\xff\xfe").await;

        assert_eq!(resp.id, "");
        assert_eq!(resp.err.unwrap().status, "validation");
    }

    #[tokio::test]
    async fn test_dispatch_past_deadline_is_unavailable() {
        let catalog = Arc::new(ProductCatalog::new(
            ProductService::new(Arc::new(SlowStore::default())),
            Arc::new(MemoryCache::new(50, 3600)),
            TtlPolicy::default(),
        ));
        let dispatcher = MessageDispatcher::new(catalog, Duration::from_millis(50));

        let resp = dispatcher
            .dispatch(MessageRequest::new("slow", GET_PRODUCTS, Value::Null))
            .await;

        assert_eq!(resp.id, "slow");
        let err = resp.err.unwrap();
        assert_eq!(err.status, "unavailable");
        assert!(err.message.contains("deadline"));
    }
}
