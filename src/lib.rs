//! huemap: hue wheel segmentation service
//!
//! Discovers the distinct named color regions around the hue circle at a
//! fixed saturation and lightness by adaptively sampling an external
//! color-naming oracle, and serves the resulting partition over HTTP,
//! either as one final result or as a progressive NDJSON stream.

pub mod api;
pub mod config;
pub mod error;
pub mod hue;
pub mod services;
pub mod types;

pub use crate::error::{ApiError, OracleError};

use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::services::memo::ResultMemo;
use crate::services::oracle::ColorOracle;
use crate::services::subdivision::DEFAULT_MIN_SPAN;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// The injected color-naming oracle; handlers bind it per run
    pub oracle: Arc<dyn ColorOracle>,
    /// Cross-run result memo keyed by (saturation, lightness)
    pub memo: Arc<ResultMemo>,
    /// Finest subdivision span in degrees
    pub min_span: f64,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(oracle: Arc<dyn ColorOracle>) -> Self {
        Self::with_min_span(oracle, DEFAULT_MIN_SPAN)
    }

    pub fn with_min_span(oracle: Arc<dyn ColorOracle>, min_span: f64) -> Self {
        Self {
            oracle,
            memo: Arc::new(ResultMemo::new()),
            min_span,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .route("/api/segments", get(api::segments::get_segments))
        .route("/api/segments/stream", get(api::stream::stream_segments))
        .merge(api::health::health_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
