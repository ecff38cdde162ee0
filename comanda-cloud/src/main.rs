//! comanda-cloud: restaurant management service
//!
//! Long-running service that:
//! - Serves the dashboard API (JWT authenticated, per-restaurant tenancy)
//! - Pushes row changes to dashboards over WebSocket
//! - Renders the public menu
//! - Polls iFood for marketplace orders
//! - Receives Pagar.me subscription webhooks

mod api;
mod auth;
mod config;
mod db;
mod error;
mod integrations;
mod live;
mod menu;
mod services;
mod state;

use std::net::SocketAddr;

use config::Config;
use error::BoxError;
use integrations::ifood::IfoodSyncWorker;
use state::AppState;
use tokio::time::Duration;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    init_tracing();

    let config = Config::from_env()?;
    tracing::info!("Starting comanda-cloud (env: {})", config.environment);
    if config.is_development() {
        tracing::warn!("Development mode: missing secrets fall back to insecure defaults");
    }

    let state = AppState::new(&config).await?;
    let shutdown = CancellationToken::new();

    // Periodic rate limiter cleanup (every 5 minutes)
    let rate_limiter = state.rate_limiter.clone();
    let cleanup_shutdown = shutdown.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(300));
        loop {
            tokio::select! {
                _ = cleanup_shutdown.cancelled() => break,
                _ = interval.tick() => rate_limiter.cleanup().await,
            }
        }
    });

    let worker = IfoodSyncWorker::new(
        state.clone(),
        Duration::from_secs(config.ifood_poll_interval_secs),
        shutdown.clone(),
    );
    let worker_handle = tokio::spawn(worker.run());

    let app = api::create_router(state);
    let addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("comanda-cloud HTTP listening on {addr}");

    let server_shutdown = shutdown.clone();
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        wait_for_signal().await;
        server_shutdown.cancel();
    })
    .await?;

    shutdown.cancel();
    if let Err(e) = worker_handle.await {
        tracing::error!("iFood worker task failed: {e}");
    }
    tracing::info!("comanda-cloud stopped");
    Ok(())
}

/// `LOG_FORMAT=json` switches to JSON lines
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "comanda_cloud=info,tower_http=info".into());
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json")) {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn wait_for_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
