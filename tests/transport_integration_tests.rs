//! Integration Tests for the message transport
//!
//! Runs a real server on an ephemeral port and talks to it over TCP.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use product_catalog::{
    cache::MemoryCache,
    models::NewProduct,
    store::MemoryProductStore,
    transport::{
        MessageClient, MessageDispatcher, MessageResponse, MessageServer, MAX_FRAME_BYTES,
        NO_HANDLER_MESSAGE,
    },
    ProductCatalog, ProductService, TtlPolicy,
};
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::oneshot;

struct TestServer {
    addr: SocketAddr,
    catalog: Arc<ProductCatalog>,
    shutdown: oneshot::Sender<()>,
}

async fn start_server() -> TestServer {
    let catalog = Arc::new(ProductCatalog::new(
        ProductService::new(Arc::new(MemoryProductStore::new())),
        Arc::new(MemoryCache::new(50, 3600)),
        TtlPolicy::default(),
    ));
    let dispatcher = MessageDispatcher::new(catalog.clone(), Duration::from_secs(5));
    let server = MessageServer::bind("127.0.0.1:0", dispatcher).await.unwrap();
    let addr = server.local_addr().unwrap();

    let (shutdown, rx) = oneshot::channel::<()>();
    tokio::spawn(server.serve(async move {
        let _ = rx.await;
    }));

    TestServer {
        addr,
        catalog,
        shutdown,
    }
}

/// Reads `count` response frames and returns them sorted by id.
async fn read_responses(reader: &mut BufReader<TcpStream>, count: usize) -> Vec<MessageResponse> {
    let mut responses = Vec::new();
    for _ in 0..count {
        let mut line = String::new();
        assert!(reader.read_line(&mut line).await.unwrap() > 0, "connection closed");
        responses.push(serde_json::from_str::<MessageResponse>(line.trim()).unwrap());
    }
    responses.sort_by(|a, b| a.id.cmp(&b.id));
    responses
}

fn new_product(name: &str, price: f64) -> NewProduct {
    NewProduct {
        name: name.to_string(),
        description: None,
        price,
    }
}

#[tokio::test]
async fn test_get_products_empty() {
    let server = start_server().await;
    let mut client = MessageClient::connect(server.addr).await.unwrap();

    let products = client.get_products().await.unwrap();
    assert!(products.is_empty());

    client.close().await.unwrap();
    let _ = server.shutdown.send(());
}

#[tokio::test]
async fn test_get_product_by_id() {
    let server = start_server().await;
    let created = server
        .catalog
        .create(new_product("Chair", 49.0))
        .await
        .unwrap();

    let mut client = MessageClient::connect(server.addr).await.unwrap();
    let fetched = client.get_product(&created.id).await.unwrap();
    assert_eq!(fetched, created);

    let listed = client.get_products().await.unwrap();
    assert_eq!(listed, vec![created]);

    let _ = server.shutdown.send(());
}

#[tokio::test]
async fn test_get_unknown_product_is_not_found() {
    let server = start_server().await;
    let mut client = MessageClient::connect(server.addr).await.unwrap();

    let err = client.get_product("missing").await.unwrap_err();
    assert!(err.is_not_found(), "unexpected error: {}", err);

    // The connection stays usable after an error response
    assert!(client.get_products().await.unwrap().is_empty());

    let _ = server.shutdown.send(());
}

#[tokio::test]
async fn test_unknown_command() {
    let server = start_server().await;
    let mut client = MessageClient::connect(server.addr).await.unwrap();

    let err = client
        .send("delete_everything", Value::Null)
        .await
        .unwrap_err();
    assert!(err.to_string().contains(NO_HANDLER_MESSAGE));

    let _ = server.shutdown.send(());
}

#[tokio::test]
async fn test_writes_through_catalog_visible_over_transport() {
    let server = start_server().await;
    let mut client = MessageClient::connect(server.addr).await.unwrap();

    // Warm the list entry through the transport
    assert!(client.get_products().await.unwrap().is_empty());

    let created = server
        .catalog
        .create(new_product("Desk", 300.0))
        .await
        .unwrap();

    let listed = client.get_products().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, created.id);

    server.catalog.delete(&created.id).await.unwrap();
    let err = client.get_product(&created.id).await.unwrap_err();
    assert!(err.is_not_found());

    let _ = server.shutdown.send(());
}

#[tokio::test]
async fn test_concurrent_clients() {
    let server = start_server().await;
    for i in 0..5 {
        server
            .catalog
            .create(new_product(&format!("Item {}", i), i as f64))
            .await
            .unwrap();
    }

    let mut handles = Vec::new();
    for _ in 0..8 {
        let addr = server.addr;
        handles.push(tokio::spawn(async move {
            let mut client = MessageClient::connect(addr).await.unwrap();
            client.get_products().await.unwrap().len()
        }));
    }

    for handle in handles {
        assert_eq!(handle.await.unwrap(), 5);
    }

    let _ = server.shutdown.send(());
}

#[tokio::test]
async fn test_non_utf8_frame_gets_error_and_connection_survives() {
    let server = start_server().await;
    let mut stream = BufReader::new(TcpStream::connect(server.addr).await.unwrap());

    stream
        .get_mut()
        .write_all(b"\xff\xfe\n{\"id\":\"2\",\"pattern\":{\"cmd\":\"get_products\"}}\n")
        .await
        .unwrap();

    let responses = read_responses(&mut stream, 2).await;
    assert_eq!(responses[0].id, "");
    assert_eq!(responses[0].err.as_ref().unwrap().status, "validation");
    assert_eq!(responses[1].id, "2");
    assert_eq!(responses[1].response, Some(Value::Array(Vec::new())));

    let _ = server.shutdown.send(());
}

#[tokio::test]
async fn test_oversized_frame_is_rejected_and_skipped() {
    let server = start_server().await;
    let mut stream = BufReader::new(TcpStream::connect(server.addr).await.unwrap());

    let mut payload = vec![b'x'; MAX_FRAME_BYTES + 10];
    payload.extend_from_slice(b"\n{\"id\":\"next\",\"pattern\":{\"cmd\":\"get_products\"}}\n");
    stream.get_mut().write_all(&payload).await.unwrap();

    let responses = read_responses(&mut stream, 2).await;
    assert_eq!(responses[0].id, "");
    assert!(responses[0].err.as_ref().unwrap().message.contains("exceeds"));
    assert_eq!(responses[1].id, "next");
    assert!(!responses[1].is_error());

    let _ = server.shutdown.send(());
}
