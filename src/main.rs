//! Shortlink Gateway - A short-link redirect service
//!
//! Resolves short keys through a TTL/LRU cache in front of a durable link
//! store and answers with 302 redirects.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shortlink_gateway::{
    create_router, spawn_cleanup_task, AppState, Config, LinkResolver, MemoryLinkStore,
    ResolutionCache,
};

/// Main entry point for the redirect gateway.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load and validate configuration from environment variables
/// 3. Load the link store and create the resolution cache
/// 4. Start background TTL cleanup task
/// 5. Start HTTP server on configured port
/// 6. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shortlink_gateway=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Shortlink Gateway");

    let config = Config::from_env();
    config.validate().context("invalid configuration")?;
    info!(
        "Configuration loaded: domain={}, capacity={}, positive_ttl={:?}, negative_ttl={:?}, store_timeout={:?}, port={}",
        config.short_domain,
        config.cache_capacity,
        config.positive_ttl,
        config.negative_ttl,
        config.store_timeout,
        config.server_port
    );

    let store = match &config.links_file {
        Some(path) => MemoryLinkStore::load_json(path)
            .await
            .with_context(|| format!("failed to load links from {}", path.display()))?,
        None => {
            warn!("LINKS_FILE not set, serving an empty link store");
            MemoryLinkStore::new()
        }
    };
    info!("Link store ready with {} links", store.len().await);

    let cache = Arc::new(ResolutionCache::new(config.cache_capacity));
    let resolver = LinkResolver::new(cache.clone(), Arc::new(store), config.resolver_config());
    let state = AppState::new(resolver, config.gateway_config()?);

    let cleanup_handle = spawn_cleanup_task(cache, config.cleanup_interval);
    info!("Background cleanup task started");

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cleanup_handle))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the cleanup task and allows graceful shutdown.
async fn shutdown_signal(cleanup_handle: tokio::task::JoinHandle<()>) {
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

    cleanup_handle.abort();
    warn!("Cleanup task aborted");
}
