//! Portfolio Service Binary
//!
//! Starts the AssetFlow portfolio service.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin portfolio-service
//! ```
//!
//! # Environment Variables
//!
//! - `PORTFOLIO_HTTP_PORT`: HTTP server port (default: 8080)
//! - `PORTFOLIO_BIND_ADDRESS`: bind address (default: 0.0.0.0)
//! - `PORTFOLIO_CACHE_TTL_SECS`: cache TTL in seconds (default: 120)
//! - `PORTFOLIO_UPDATES_TOPIC`: updates topic (default: portfolio-updates)
//! - `USER_SERVICE_BASE_URL`: user service URL (default: <http://localhost:8081>)
//! - `RUST_LOG`: log level (default: info)

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::signal;

use portfolio_service::application::services::PortfolioTransactionEngine;
use portfolio_service::config::ServiceConfig;
use portfolio_service::infrastructure::cache::InMemoryCache;
use portfolio_service::infrastructure::events::LoggingEventPublisher;
use portfolio_service::infrastructure::http::{AppState, create_router};
use portfolio_service::infrastructure::persistence::InMemoryPortfolioRepository;
use portfolio_service::infrastructure::user_service::{HttpUserStatusClient, UserServiceConfig};
use portfolio_service::resilience::ResilienceRegistry;
use portfolio_service::telemetry::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    tracing::info!("Starting AssetFlow Portfolio Service");

    let config = ServiceConfig::from_env();
    tracing::info!(
        http_port = config.server.http_port,
        user_service = %config.user_service_base_url,
        cache_ttl_secs = config.cache.ttl_secs,
        "Configuration loaded"
    );

    let user_client = HttpUserStatusClient::new(UserServiceConfig {
        base_url: config.user_service_base_url.clone(),
        ..Default::default()
    })
    .map_err(|e| anyhow::anyhow!("failed to build user-service client: {e}"))?;

    let registry = ResilienceRegistry::with_defaults();
    let engine = Arc::new(PortfolioTransactionEngine::new(
        Arc::new(InMemoryPortfolioRepository::new()),
        Arc::new(user_client),
        Arc::new(InMemoryCache::new()),
        Arc::new(LoggingEventPublisher::new(
            config.events.portfolio_updates_topic.clone(),
        )),
        &registry,
        config.cache.ttl(),
    ));

    let state = AppState {
        engine,
        version: env!("CARGO_PKG_VERSION").to_string(),
    };
    let router = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.bind_address, config.server.http_port)
        .parse()
        .context("invalid bind address")?;

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "HTTP server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Resolve when Ctrl-C (or SIGTERM on unix) is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        if let Ok(mut stream) = signal::unix::signal(signal::unix::SignalKind::terminate()) {
            stream.recv().await;
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
