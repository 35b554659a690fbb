//! # Product Service
//!
//! Binary entry point for the product catalog HTTP service.

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use catalog_persistence::{shared_cache, PgConnector, RecordStore, RedisCache};
use catalog_product_api::{build_router, ApiContext, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    tracing::info!(
        version = catalog_product_api::VERSION,
        "Starting product service"
    );

    // Record store: connections are opened per operation, nothing to dial yet
    tracing::info!(
        host = %config.store.host,
        port = config.store.port,
        database = %config.store.database,
        attempts = config.store_retry.attempts,
        retry_delay_secs = config.store_retry.delay.as_secs(),
        "Configuring record store"
    );
    let store = RecordStore::new(Arc::new(PgConnector::new(&config.store)), config.store_retry);

    // Redis cache connects lazily on first use
    tracing::info!(
        url = %config.cache.url(),
        timeout_ms = config.cache.timeout.as_millis(),
        "Configuring Redis cache"
    );
    let cache = shared_cache(RedisCache::new(&config.cache)?);

    tracing::info!(
        enabled = config.cache_settings.enabled,
        ttl_secs = config.cache_settings.listing_ttl.as_secs(),
        "Product listing cache"
    );

    let ctx = ApiContext::new(store, cache, config.cache_settings);
    let app = build_router(ctx);

    // Start server
    let addr = config.server_addr;
    tracing::info!(%addr, "Starting HTTP server");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shut down gracefully");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, shutting down");
        }
    }
}
