//! # userdesk-api — Binary Entry Point
//!
//! Starts the Axum HTTP server against the in-memory user directory.
//! Binds to configurable port (default 8080).

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use userdesk_api::state::{AppConfig, AppState};
use userdesk_core::InMemoryUserDirectory;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env().context("reading configuration from environment")?;
    if config.auth_secret.is_none() {
        tracing::warn!("AUTH_TOKEN not set: bearer tokens are accepted without a secret");
    }

    let directory = InMemoryUserDirectory::new();
    for (id, email) in &config.seed_users {
        directory
            .register(*id, email)
            .with_context(|| format!("seeding user {id}"))?;
    }
    tracing::info!(users = directory.len(), "User directory ready");

    let metrics = userdesk_api::middleware::metrics::install_recorder()
        .context("installing Prometheus recorder")?;
    let upkeep = metrics.clone();
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(Duration::from_secs(5));
        loop {
            tick.tick().await;
            upkeep.run_upkeep();
        }
    });

    let port = config.port;
    let state = AppState::with_config(config, Arc::new(directory)).with_metrics(metrics);
    let app = userdesk_api::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Userdesk API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    axum::serve(listener, app).await?;

    Ok(())
}
