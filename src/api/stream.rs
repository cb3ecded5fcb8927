//! Streaming segmentation endpoint.
//!
//! Progressive results go out as newline-delimited JSON: one
//! `{"segments": [...]}` object per changed snapshot, a terminal
//! `{"error": "..."}` line if the oracle fails, then stream close.

use axum::{
    body::Body,
    extract::{Query, State},
    http::header,
    response::Response,
};
use futures::StreamExt;
use serde::Serialize;
use std::convert::Infallible;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::api::segments::SegmentsQuery;
use crate::error::ApiError;
use crate::services::pipeline::{Segmenter, SnapshotEvent};
use crate::types::{HueSegment, SegmentationParams};
use crate::AppState;

#[derive(Debug, Serialize)]
struct SegmentsLine<'a> {
    segments: &'a [HueSegment],
}

#[derive(Debug, Serialize)]
struct ErrorLine {
    error: String,
}

/// GET /api/segments/stream?saturation=S&lightness=L
///
/// When the client disconnects the underlying run is cancelled and stops
/// issuing oracle calls.
pub async fn stream_segments(
    State(state): State<AppState>,
    Query(query): Query<SegmentsQuery>,
) -> Result<Response, ApiError> {
    let params = SegmentationParams::new(query.saturation, query.lightness)
        .map_err(ApiError::BadRequest)?;

    info!(
        "New segment stream for s={} l={}",
        params.saturation, params.lightness
    );

    let segmenter = Segmenter::new(Arc::clone(&state.oracle), state.min_span);
    let events = segmenter.stream(params, CancellationToken::new());

    let lines = events.filter_map(|event| async move {
        let serialized = match event {
            SnapshotEvent::Segments(segments) => serde_json::to_string(&SegmentsLine {
                segments: &segments,
            }),
            SnapshotEvent::Error(error) => serde_json::to_string(&ErrorLine { error }),
        };
        match serialized {
            Ok(line) => Some(Ok::<_, Infallible>(format!("{line}\n"))),
            Err(e) => {
                warn!("Failed to serialize stream line: {e}");
                None
            }
        }
    });

    Response::builder()
        .header(header::CONTENT_TYPE, "application/x-ndjson")
        .body(Body::from_stream(lines))
        .map_err(|e| ApiError::Internal(e.to_string()))
}
