//! seokit server entry point.
//!
//! Loads configuration, builds the shared state, and serves the router.
//! Logs are JSON on stderr.

use std::time::Duration;

use anyhow::Result;
use axum::http::Request;
use seokit_core::AppConfig;
use seokit_server::{AppState, router};
use tower_http::trace::TraceLayer;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    let bind_addr = config.server.bind_addr.clone();
    tracing::info!(
        og_enabled = config.og_image.enabled,
        seo_enabled = config.site.enabled,
        dev_mode = config.server.dev_mode,
        "configuration loaded"
    );

    let state = AppState::with_browser(config);
    spawn_memory_sweep(&state);

    let app = router(state).layer(TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
        tracing::span!(
            Level::INFO,
            "http_request",
            method = %request.method(),
            path = %request.uri().path(),
        )
    }));

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "starting seokit server");

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    Ok(())
}

/// Periodically drop expired memory-tier entries.
fn spawn_memory_sweep(state: &AppState) {
    let cache = state.cache().clone();
    let period = cache.settings().memory_ttl.max(Duration::from_secs(1));

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.tick().await;
        loop {
            interval.tick().await;
            let removed = cache.cleanup_expired().await;
            if removed > 0 {
                tracing::debug!(removed, "expired OG memory entries dropped");
            }
        }
    });
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
