//! Fib Service - Fibonacci sequences over HTTP
//!
//! Binary entry point: wires configuration, the shared cache, the engine and the router.

use std::net::SocketAddr;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fib_service::{
    create_router, shared_cache::connect_from_config, spawn_cleanup_task, AppState, Config,
};

/// Main entry point for the Fibonacci service.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Connect to the shared cache (bounded retries, then degraded mode)
/// 4. Build the sequence engine and application state
/// 5. Start background cleanup of rate limiters and expired cache entries
/// 6. Serve HTTP with peer addresses available to the rate limiter
/// 7. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fib_service=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Fibonacci service");

    let config = Config::from_env();
    info!(
        "Configuration loaded: backend={:?}, memo_capacity={}, ttl={}s, prefix_scan_limit={}, port={}",
        config.cache_backend,
        config.memo_capacity,
        config.cache_ttl_secs,
        config.prefix_scan_limit,
        config.server_port
    );

    let shared = connect_from_config(&config).await;
    if !shared.is_available() {
        warn!("Serving in degraded mode without a shared cache");
    }

    let state = AppState::from_config(&config, shared);
    info!("Sequence engine initialized");

    let cleanup_handle = spawn_cleanup_task(
        state.rate_limiters(),
        state.engine.shared_cache().clone(),
        config.rate_limit_cleanup_secs,
    );

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal(cleanup_handle))
    .await
    .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM), then stops the cleanup task.
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
