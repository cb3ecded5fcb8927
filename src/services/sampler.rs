//! Memoizing, deduplicating sample cache for one segmentation run.
//!
//! The oracle is expensive, so the sampler guarantees it is invoked at most
//! once per distinct normalized hue (to 6-decimal precision) for the lifetime
//! of a run, no matter how many logical callers request that hue
//! concurrently. Concurrent requests for one hue join a single in-flight
//! future; a failed request is removed from the in-flight table so a later
//! call can retry.

use futures::future::{BoxFuture, FutureExt, Shared};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use crate::error::OracleError;
use crate::hue::{normalize, HueKey};
use crate::services::oracle::ColorOracle;
use crate::types::ColorDescriptor;

type InFlight = Shared<BoxFuture<'static, Result<ColorDescriptor, OracleError>>>;

#[derive(Default)]
struct SamplerState {
    /// Resolved samples, ordered by hue key
    completed: BTreeMap<HueKey, ColorDescriptor>,
    /// Requests issued but not yet resolved
    in_flight: HashMap<HueKey, InFlight>,
}

/// Per-run sampling cache bound to one oracle and one (saturation, lightness).
pub struct AdaptiveSampler {
    oracle: Arc<dyn ColorOracle>,
    saturation: f64,
    lightness: f64,
    state: Mutex<SamplerState>,
}

impl AdaptiveSampler {
    pub fn new(oracle: Arc<dyn ColorOracle>, saturation: f64, lightness: f64) -> Self {
        Self {
            oracle,
            saturation,
            lightness,
            state: Mutex::new(SamplerState::default()),
        }
    }

    /// Resolve the color at `hue`, invoking the oracle at most once per key.
    ///
    /// The in-flight entry is inserted before the oracle future is first
    /// polled, so concurrent callers for the same key share one request and
    /// one outcome (success or failure alike). A failure evicts the entry,
    /// leaving the key retryable.
    pub async fn get(&self, hue: f64) -> Result<ColorDescriptor, OracleError> {
        let key = HueKey::new(normalize(hue));

        let request = {
            let mut state = self.state.lock().unwrap();
            if let Some(color) = state.completed.get(&key) {
                return Ok(color.clone());
            }
            match state.in_flight.get(&key) {
                Some(existing) => existing.clone(),
                None => {
                    let oracle = Arc::clone(&self.oracle);
                    let (saturation, lightness) = (self.saturation, self.lightness);
                    let request: InFlight = async move {
                        oracle.sample(key.hue(), saturation, lightness).await
                    }
                    .boxed()
                    .shared();
                    state.in_flight.insert(key, request.clone());
                    request
                }
            }
        };

        let result = request.await;

        let mut state = self.state.lock().unwrap();
        state.in_flight.remove(&key);
        match result {
            Ok(color) => {
                state
                    .completed
                    .entry(key)
                    .or_insert_with(|| color.clone());
                Ok(color)
            }
            Err(err) => Err(err),
        }
    }

    /// Synchronous lookup into the completed-value map only. Never invokes
    /// the oracle.
    pub fn cached(&self, hue: f64) -> Option<ColorDescriptor> {
        let key = HueKey::new(normalize(hue));
        self.state.lock().unwrap().completed.get(&key).cloned()
    }

    /// Distinct normalized hues sampled so far, ascending.
    pub fn known_hues(&self) -> Vec<f64> {
        self.state
            .lock()
            .unwrap()
            .completed
            .keys()
            .map(|key| key.hue())
            .collect()
    }

    /// Known hues paired with their colors, ascending by hue.
    pub fn known_samples(&self) -> Vec<(f64, ColorDescriptor)> {
        self.state
            .lock()
            .unwrap()
            .completed
            .iter()
            .map(|(key, color)| (key.hue(), color.clone()))
            .collect()
    }

    /// Number of distinct hues resolved so far.
    pub fn sample_count(&self) -> usize {
        self.state.lock().unwrap().completed.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use crate::types::{Hsl, Rgb};

    fn descriptor(name: &str, hue: f64) -> ColorDescriptor {
        ColorDescriptor {
            name: name.to_string(),
            rgb: Rgb {
                value: "#000000".to_string(),
                r: 0,
                g: 0,
                b: 0,
            },
            hsl: Hsl {
                value: format!("hsl({hue}, 80%, 50%)"),
                h: hue,
                s: 80.0,
                l: 50.0,
            },
        }
    }

    /// Oracle stub: counts invocations, optionally fails the first N calls.
    struct CountingOracle {
        calls: AtomicUsize,
        fail_first: usize,
        delay: Duration,
    }

    impl CountingOracle {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_first: 0,
                delay: Duration::from_millis(10),
            }
        }

        fn failing_first(n: usize) -> Self {
            Self {
                fail_first: n,
                ..Self::new()
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ColorOracle for CountingOracle {
        async fn sample(
            &self,
            hue: f64,
            _saturation: f64,
            _lightness: f64,
        ) -> Result<ColorDescriptor, OracleError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            if call < self.fail_first {
                return Err(OracleError::Status(503, "unavailable".to_string()));
            }
            Ok(descriptor("Stub", hue))
        }
    }

    #[tokio::test]
    async fn concurrent_requests_for_one_hue_share_one_call() {
        let oracle = Arc::new(CountingOracle::new());
        let sampler = AdaptiveSampler::new(oracle.clone(), 80.0, 50.0);

        // 370 normalizes onto the same key as 10
        let (a, b, c) = tokio::join!(sampler.get(10.0), sampler.get(370.0), sampler.get(10.0));
        assert!(a.is_ok() && b.is_ok() && c.is_ok());
        assert_eq!(oracle.call_count(), 1);
        assert_eq!(sampler.sample_count(), 1);
    }

    #[tokio::test]
    async fn repeated_request_hits_completed_map() {
        let oracle = Arc::new(CountingOracle::new());
        let sampler = AdaptiveSampler::new(oracle.clone(), 80.0, 50.0);

        sampler.get(42.0).await.unwrap();
        sampler.get(42.0).await.unwrap();
        assert_eq!(oracle.call_count(), 1);
        assert_eq!(sampler.cached(42.0).unwrap().name, "Stub");
        assert!(sampler.cached(43.0).is_none());
    }

    #[tokio::test]
    async fn failure_fans_out_then_key_is_retryable() {
        let oracle = Arc::new(CountingOracle::failing_first(1));
        let sampler = AdaptiveSampler::new(oracle.clone(), 80.0, 50.0);

        let (a, b) = tokio::join!(sampler.get(200.0), sampler.get(200.0));
        assert!(a.is_err(), "first waiter sees the shared failure");
        assert!(b.is_err(), "second waiter sees the shared failure");
        assert_eq!(oracle.call_count(), 1);
        assert!(sampler.cached(200.0).is_none());

        // The failed entry was evicted, so this re-invokes the oracle.
        let retried = sampler.get(200.0).await;
        assert!(retried.is_ok());
        assert_eq!(oracle.call_count(), 2);
    }

    #[tokio::test]
    async fn known_hues_are_sorted_and_distinct() {
        let oracle = Arc::new(CountingOracle::new());
        let sampler = AdaptiveSampler::new(oracle, 80.0, 50.0);

        for hue in [270.0, 0.0, 90.0, 360.0, -90.0] {
            sampler.get(hue).await.unwrap();
        }
        assert_eq!(sampler.known_hues(), vec![0.0, 90.0, 270.0]);
        let samples = sampler.known_samples();
        assert_eq!(samples.len(), 3);
        assert_eq!(samples[1].0, 90.0);
    }
}
