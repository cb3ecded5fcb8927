//! The segmentation pipeline: drives subdivision over a fresh sampler and
//! exposes the two consumption modes: streaming snapshots and collect-all.

use futures::stream::Stream;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::OracleError;
use crate::services::oracle::ColorOracle;
use crate::services::resolver::resolve_duplicates;
use crate::services::sampler::AdaptiveSampler;
use crate::services::segments::{build_segments, merge_segments};
use crate::services::subdivision::{RunOutcome, SubdivisionEngine};
use crate::types::{HueSegment, SegmentationParams};

/// One event on the streaming side.
#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotEvent {
    /// The merged, deduplicated segment set changed.
    Segments(Vec<HueSegment>),
    /// The run failed; no further snapshots follow.
    Error(String),
}

/// Entry point for one (saturation, lightness) segmentation computation.
pub struct Segmenter {
    oracle: Arc<dyn ColorOracle>,
    min_span: f64,
}

impl Segmenter {
    pub fn new(oracle: Arc<dyn ColorOracle>, min_span: f64) -> Self {
        Self { oracle, min_span }
    }

    /// Recompute the full synchronous pipeline over everything known so far.
    fn snapshot(sampler: &AdaptiveSampler) -> Vec<HueSegment> {
        let samples = sampler.known_samples();
        resolve_duplicates(merge_segments(build_segments(&samples)))
    }

    /// Drive the computation to completion and return the final segment set.
    pub async fn collect(
        &self,
        params: SegmentationParams,
    ) -> Result<Vec<HueSegment>, OracleError> {
        let sampler =
            AdaptiveSampler::new(Arc::clone(&self.oracle), params.saturation, params.lightness);
        let engine = SubdivisionEngine::new(self.min_span);
        engine
            .run(&sampler, params, &CancellationToken::new(), || {})
            .await?;

        let segments = Self::snapshot(&sampler);
        debug!(
            "Segmentation complete: {} segments from {} samples",
            segments.len(),
            sampler.sample_count()
        );
        Ok(segments)
    }

    /// Stream a snapshot every time the merged segment set changes.
    ///
    /// Emits only non-empty, changed snapshots while running; on success a
    /// final snapshot is emitted unconditionally before the stream closes.
    /// On oracle failure a terminal [`SnapshotEvent::Error`] is emitted and
    /// nothing follows it. Cancelling `cancel` (or dropping the consumer)
    /// stops further oracle calls and closes the stream without an error
    /// event.
    pub fn stream(
        &self,
        params: SegmentationParams,
        cancel: CancellationToken,
    ) -> impl Stream<Item = SnapshotEvent> {
        let oracle = Arc::clone(&self.oracle);
        let min_span = self.min_span;
        let (tx, mut rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            let sampler =
                AdaptiveSampler::new(oracle, params.saturation, params.lightness);
            let engine = SubdivisionEngine::new(min_span);

            let mut last_emitted: Option<String> = None;
            let progress_tx = tx.clone();
            let progress_cancel = cancel.clone();
            let result = engine
                .run(&sampler, params, &cancel, || {
                    let segments = Self::snapshot(&sampler);
                    if segments.is_empty() {
                        return;
                    }
                    let serialized = match serde_json::to_string(&segments) {
                        Ok(serialized) => serialized,
                        Err(e) => {
                            warn!("Failed to serialize snapshot: {e}");
                            return;
                        }
                    };
                    if last_emitted.as_deref() == Some(serialized.as_str()) {
                        return;
                    }
                    last_emitted = Some(serialized);
                    if progress_tx
                        .send(SnapshotEvent::Segments(segments))
                        .is_err()
                    {
                        // Consumer went away; wind the run down quietly.
                        progress_cancel.cancel();
                    }
                })
                .await;

            match result {
                Ok(RunOutcome::Complete) => {
                    let _ = tx.send(SnapshotEvent::Segments(Self::snapshot(&sampler)));
                }
                Ok(RunOutcome::Cancelled) => {
                    debug!("Streaming segmentation cancelled");
                }
                Err(err) => {
                    let _ = tx.send(SnapshotEvent::Error(err.to_string()));
                }
            }
        });

        async_stream::stream! {
            while let Some(event) = rx.recv().await {
                yield event;
            }
        }
    }
}
