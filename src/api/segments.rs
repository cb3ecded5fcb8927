//! Collect-all segmentation endpoint.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::error::ApiError;
use crate::services::memo::MemoKey;
use crate::services::pipeline::Segmenter;
use crate::types::{HueSegment, SegmentationParams};
use crate::AppState;

/// Query parameters shared by both segmentation endpoints
#[derive(Debug, Deserialize)]
pub struct SegmentsQuery {
    pub saturation: f64,
    pub lightness: f64,
}

#[derive(Debug, Serialize)]
pub struct SegmentsResponse {
    pub segments: Vec<HueSegment>,
}

/// GET /api/segments?saturation=S&lightness=L
///
/// Runs the segmentation to completion and returns the final merged,
/// deduplicated segment list. Results are memoized per (saturation,
/// lightness); concurrent identical requests share one computation.
pub async fn get_segments(
    State(state): State<AppState>,
    Query(query): Query<SegmentsQuery>,
) -> Result<Json<SegmentsResponse>, ApiError> {
    let params = SegmentationParams::new(query.saturation, query.lightness)
        .map_err(ApiError::BadRequest)?;

    let key = MemoKey::new(&params);
    let segmenter = Segmenter::new(Arc::clone(&state.oracle), state.min_span);
    let segments = state
        .memo
        .get_or_compute(key, move || async move { segmenter.collect(params).await })
        .await?;

    info!(
        "Resolved {} segments for s={} l={}",
        segments.len(),
        params.saturation,
        params.lightness
    );

    Ok(Json(SegmentsResponse {
        segments: segments.as_ref().clone(),
    }))
}
