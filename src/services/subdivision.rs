//! Adaptive divide-and-conquer sampling of the hue circle.
//!
//! The engine decides which hues are worth asking the oracle about: every
//! maximal run of same-named hues ends up bounded by samples proving its
//! edges, while subdivision stops once a range's span reaches the configured
//! minimum. Traversal is an explicit depth-first work stack (left child
//! first), so streaming consumers see one side of the circle refined early.

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::OracleError;
use crate::services::sampler::AdaptiveSampler;
use crate::types::SegmentationParams;

/// Default finest subdivision span, in degrees.
pub const DEFAULT_MIN_SPAN: f64 = 1.0;

/// A pending hue range awaiting probing. Bounds stay unnormalized (the end
/// of the root range is 360); normalization happens at the sampler.
#[derive(Debug, Clone, Copy, PartialEq)]
struct HueRange {
    start: f64,
    end: f64,
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every range was probed or discarded.
    Complete,
    /// The run was cancelled; no further oracle calls were issued.
    Cancelled,
}

pub struct SubdivisionEngine {
    min_span: f64,
}

impl SubdivisionEngine {
    pub fn new(min_span: f64) -> Self {
        // Sub-millidegree subdivision would loop on the ceil'd midpoint.
        Self {
            min_span: min_span.max(0.001),
        }
    }

    /// Drive sampling to completion.
    ///
    /// Samples hue 0 first, unconditionally. Achromatic inputs (saturation 0,
    /// or lightness at 0 or 100) stop there: hue has no visual effect, so the
    /// whole circle is one color and the oracle is called exactly once.
    ///
    /// Otherwise ranges come off a work stack starting at `{0, 360}`. For a
    /// range wider than `min_span` the three probes (start, end, midpoint)
    /// are requested concurrently through the shared sampler; if all three
    /// agree on a name the range is uniform, otherwise its two halves are
    /// pushed. `on_progress` fires after the anchor sample and after every
    /// work item that grew the known-hue set.
    pub async fn run<F>(
        &self,
        sampler: &AdaptiveSampler,
        params: SegmentationParams,
        cancel: &CancellationToken,
        mut on_progress: F,
    ) -> Result<RunOutcome, OracleError>
    where
        F: FnMut(),
    {
        if cancel.is_cancelled() {
            return Ok(RunOutcome::Cancelled);
        }

        sampler.get(0.0).await?;
        on_progress();

        if params.is_achromatic() {
            debug!(
                "Achromatic input (s={}, l={}): single sample covers the circle",
                params.saturation, params.lightness
            );
            return Ok(RunOutcome::Complete);
        }

        let mut stack = vec![HueRange {
            start: 0.0,
            end: 360.0,
        }];

        while let Some(range) = stack.pop() {
            if cancel.is_cancelled() {
                debug!("Subdivision cancelled with {} ranges pending", stack.len() + 1);
                return Ok(RunOutcome::Cancelled);
            }

            let span = range.end - range.start;
            if span <= self.min_span {
                continue;
            }

            let midpoint = (range.start + span / 2.0).ceil();
            if midpoint <= range.start || midpoint >= range.end {
                // Degenerate split under a sub-degree min_span configuration.
                continue;
            }

            let known_before = sampler.sample_count();
            let (start_color, end_color, mid_color) = tokio::try_join!(
                sampler.get(range.start),
                sampler.get(range.end),
                sampler.get(midpoint),
            )?;
            if sampler.sample_count() > known_before {
                on_progress();
            }

            let uniform =
                start_color.name == mid_color.name && mid_color.name == end_color.name;
            if uniform {
                debug!(
                    "Range [{}, {}) uniform: {}",
                    range.start, range.end, start_color.name
                );
            } else {
                // Left child pushed last so it is processed first.
                stack.push(HueRange {
                    start: midpoint,
                    end: range.end,
                });
                stack.push(HueRange {
                    start: range.start,
                    end: midpoint,
                });
            }
        }

        Ok(RunOutcome::Complete)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use crate::services::oracle::ColorOracle;
    use crate::types::{ColorDescriptor, Hsl, Rgb};

    /// Oracle stub naming hues through a fixed function of the hue.
    struct MapOracle {
        calls: AtomicUsize,
        name_for: fn(f64) -> &'static str,
    }

    impl MapOracle {
        fn new(name_for: fn(f64) -> &'static str) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                name_for,
            })
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ColorOracle for MapOracle {
        async fn sample(
            &self,
            hue: f64,
            saturation: f64,
            lightness: f64,
        ) -> Result<ColorDescriptor, OracleError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let name = (self.name_for)(hue);
            Ok(ColorDescriptor {
                name: name.to_string(),
                rgb: Rgb {
                    value: "#000000".to_string(),
                    r: 0,
                    g: 0,
                    b: 0,
                },
                hsl: Hsl {
                    value: format!("hsl({hue}, {saturation}%, {lightness}%)"),
                    h: hue,
                    s: saturation,
                    l: lightness,
                },
            })
        }
    }

    fn chromatic() -> SegmentationParams {
        SegmentationParams::new(80.0, 50.0).unwrap()
    }

    async fn run_to_completion(
        oracle: Arc<MapOracle>,
        params: SegmentationParams,
    ) -> AdaptiveSampler {
        let sampler = AdaptiveSampler::new(oracle, params.saturation, params.lightness);
        let engine = SubdivisionEngine::new(DEFAULT_MIN_SPAN);
        let outcome = engine
            .run(&sampler, params, &CancellationToken::new(), || {})
            .await
            .unwrap();
        assert_eq!(outcome, RunOutcome::Complete);
        sampler
    }

    #[tokio::test]
    async fn uniform_space_needs_two_distinct_hues() {
        let oracle = MapOracle::new(|_| "Everywhere");
        let sampler = run_to_completion(oracle.clone(), chromatic()).await;

        // Anchor + root probes touch hues 0, 360 and 180; 0 and 360 share a
        // key, so only two oracle calls reach the stub.
        assert_eq!(oracle.call_count(), 2);
        assert_eq!(sampler.known_hues(), vec![0.0, 180.0]);
    }

    #[tokio::test]
    async fn achromatic_input_samples_once() {
        let oracle = MapOracle::new(|_| "Gray");
        let params = SegmentationParams::new(0.0, 50.0).unwrap();
        let sampler = run_to_completion(oracle.clone(), params).await;

        assert_eq!(oracle.call_count(), 1);
        assert_eq!(sampler.known_hues(), vec![0.0]);
    }

    #[tokio::test]
    async fn sharp_transition_stays_logarithmic() {
        let oracle = MapOracle::new(|hue| if hue < 90.0 { "Red" } else { "Blue" });
        let sampler = run_to_completion(oracle.clone(), chromatic()).await;

        // Bisection brackets both edges of the transition; nowhere near a
        // per-degree sweep.
        assert!(
            oracle.call_count() < 50,
            "expected O(log) calls, got {}",
            oracle.call_count()
        );
        // The boundary itself was pinned exactly.
        assert!(sampler.known_hues().contains(&90.0));
        assert!(sampler.known_hues().contains(&89.0));
    }

    #[tokio::test]
    async fn cancelled_before_start_issues_no_calls() {
        let oracle = MapOracle::new(|_| "Red");
        let sampler = AdaptiveSampler::new(oracle.clone(), 80.0, 50.0);
        let engine = SubdivisionEngine::new(DEFAULT_MIN_SPAN);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let outcome = engine
            .run(&sampler, chromatic(), &cancel, || {})
            .await
            .unwrap();
        assert_eq!(outcome, RunOutcome::Cancelled);
        assert_eq!(oracle.call_count(), 0);
    }

    #[tokio::test]
    async fn cancellation_stops_further_sampling() {
        let oracle = MapOracle::new(|hue| if hue < 90.0 { "Red" } else { "Blue" });
        let sampler = AdaptiveSampler::new(oracle.clone(), 80.0, 50.0);
        let engine = SubdivisionEngine::new(DEFAULT_MIN_SPAN);
        let cancel = CancellationToken::new();

        let observer = cancel.clone();
        let outcome = engine
            .run(&sampler, chromatic(), &cancel, || observer.cancel())
            .await
            .unwrap();

        // Cancelled right after the anchor sample: only hue 0 was resolved.
        assert_eq!(outcome, RunOutcome::Cancelled);
        assert_eq!(oracle.call_count(), 1);
    }

    #[tokio::test]
    async fn progress_fires_on_new_samples_only() {
        let oracle = MapOracle::new(|_| "Everywhere");
        let sampler = AdaptiveSampler::new(oracle, 80.0, 50.0);
        let engine = SubdivisionEngine::new(DEFAULT_MIN_SPAN);

        let mut ticks = 0usize;
        engine
            .run(&sampler, chromatic(), &CancellationToken::new(), || {
                ticks += 1;
            })
            .await
            .unwrap();

        // Anchor, then the root range (which adds hue 180). Nothing else.
        assert_eq!(ticks, 2);
    }
}
