//! huemap: hue wheel segmentation microservice
//!
//! Serves named-color partitions of the hue circle over HTTP, backed by an
//! external color-naming oracle that is sampled adaptively and cached.

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use huemap::config::{Cli, Config};
use huemap::services::oracle::HttpColorOracle;
use huemap::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("huemap=info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::resolve(&cli)?;

    info!("Starting huemap (hue wheel segmentation service)");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    info!("Oracle: {}", config.oracle_url);

    let oracle = HttpColorOracle::new(
        config.oracle_url.as_str(),
        Some(config.oracle_timeout_secs),
    )
    .map_err(|e| anyhow::anyhow!("Failed to build oracle client: {e}"))?;

    let state = AppState::with_min_span(Arc::new(oracle), config.min_span_degrees);
    let app = huemap::build_router(state);

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
    info!("Listening on http://{}:{}", config.host, config.port);
    info!(
        "Health check: http://{}:{}/health",
        config.host, config.port
    );

    axum::serve(listener, app).await?;

    Ok(())
}
