//! Product Catalog service binary
//!
//! Wires configuration, store, cache and catalog together and runs the HTTP
//! API and the TCP message transport side by side.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use product_catalog::api::{create_router, AppState};
use product_catalog::cache::{Cache, MemoryCache, RedisCache};
use product_catalog::config::{CacheBackend, Config};
use product_catalog::transport::{MessageDispatcher, MessageServer};
use product_catalog::{spawn_cleanup_task, store, ProductCatalog, ProductService, TtlPolicy};

/// # Startup Sequence
/// 1. Load `.env` and initialize tracing
/// 2. Load configuration from environment variables
/// 3. Open the product store and the cache backend
/// 4. Build the catalog and both transport adapters around it
/// 5. Serve until SIGINT/SIGTERM, then shut everything down
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "product_catalog=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Product Catalog service");

    let config = Config::from_env();
    info!(
        "Configuration loaded: store={}, cache={:?}, cache_max={}, list_ttl={}s, item_ttl={}s",
        config.store_uri,
        config.cache_backend,
        config.cache_max_entries,
        config.list_ttl,
        config.item_ttl
    );

    let store = store::connect(&config.store_uri)
        .await
        .with_context(|| format!("failed to open product store at {}", config.store_uri))?;
    info!("Product store ready");

    let (cache, cleanup_handle): (Arc<dyn Cache>, Option<JoinHandle<()>>) =
        match config.cache_backend {
            CacheBackend::Memory => {
                let cache = MemoryCache::new(config.cache_max_entries, config.cache_default_ttl);
                let handle = spawn_cleanup_task(cache.clone(), config.cleanup_interval);
                (Arc::new(cache), Some(handle))
            }
            CacheBackend::Redis => {
                let url = config.redis_url();
                let mut cache = RedisCache::connect(&url, config.cache_default_ttl)
                    .await
                    .with_context(|| format!("failed to connect to cache at {}", url))?;
                if let Some(prefix) = &config.cache_key_prefix {
                    cache = cache.with_key_prefix(prefix.clone());
                }
                (Arc::new(cache), None)
            }
        };
    info!("Cache backend ready");

    let catalog = Arc::new(ProductCatalog::new(
        ProductService::new(store),
        cache,
        TtlPolicy::from_config(&config),
    ));

    let (shutdown_tx, _) = broadcast::channel::<()>(1);

    // Message transport
    let dispatcher = MessageDispatcher::new(catalog.clone(), config.request_timeout());
    let message_server = MessageServer::bind(("0.0.0.0", config.tcp_port), dispatcher)
        .await
        .with_context(|| format!("failed to bind message port {}", config.tcp_port))?;
    info!("Message transport listening on {}", message_server.local_addr()?);
    let mut message_shutdown = shutdown_tx.subscribe();
    let message_task = tokio::spawn(message_server.serve(async move {
        let _ = message_shutdown.recv().await;
    }));

    // HTTP API
    let app = create_router(AppState::new(catalog), config.request_timeout());
    let addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind HTTP port {}", config.http_port))?;
    info!("HTTP API listening on http://{}", addr);

    let signal_tx = shutdown_tx.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        let _ = signal_tx.send(());
    });

    let mut http_shutdown = shutdown_tx.subscribe();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = http_shutdown.recv().await;
        })
        .await
        .context("HTTP server failed")?;

    if let Err(e) = message_task.await {
        warn!("Message transport task ended abnormally: {}", e);
    }
    if let Some(handle) = cleanup_handle {
        handle.abort();
        info!("Cache sweep task stopped");
    }

    info!("Shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
