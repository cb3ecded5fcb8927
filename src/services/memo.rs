//! Process-wide memo of whole segmentation results, keyed by
//! (saturation, lightness).
//!
//! An explicit object owned by the application state (created at service
//! start, clearable on demand), never hidden module state. Concurrent
//! requests for one key share a single in-flight computation; a failed
//! computation vacates its slot so the key can be retried.

use futures::future::{BoxFuture, Future, FutureExt, Shared};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::OracleError;
use crate::types::{HueSegment, SegmentationParams};

/// Saturation/lightness quantized to milli-units; collapses float formatting
/// noise without conflating practically distinct inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemoKey {
    saturation_milli: u32,
    lightness_milli: u32,
}

impl MemoKey {
    pub fn new(params: &SegmentationParams) -> Self {
        Self {
            saturation_milli: (params.saturation * 1000.0).round() as u32,
            lightness_milli: (params.lightness * 1000.0).round() as u32,
        }
    }
}

type SharedComputation =
    Shared<BoxFuture<'static, Result<Arc<Vec<HueSegment>>, OracleError>>>;

#[derive(Default)]
pub struct ResultMemo {
    entries: Mutex<HashMap<MemoKey, SharedComputation>>,
}

impl ResultMemo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the memoized result for `key`, computing it at most once.
    ///
    /// The shared handle is inserted before the computation is first polled,
    /// so every concurrent caller for the same key joins the same future
    /// (first-requester-wins). On failure the slot is evicted, unless a
    /// newer computation already replaced it, so one transient error never
    /// poisons the key.
    pub async fn get_or_compute<F, Fut>(
        &self,
        key: MemoKey,
        compute: F,
    ) -> Result<Arc<Vec<HueSegment>>, OracleError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<HueSegment>, OracleError>> + Send + 'static,
    {
        let computation = {
            let mut entries = self.entries.lock().unwrap();
            match entries.get(&key) {
                Some(existing) => existing.clone(),
                None => {
                    let fut = compute();
                    let shared: SharedComputation =
                        async move { fut.await.map(Arc::new) }.boxed().shared();
                    entries.insert(key, shared.clone());
                    shared
                }
            }
        };

        let result = computation.clone().await;
        if result.is_err() {
            let mut entries = self.entries.lock().unwrap();
            if let Some(current) = entries.get(&key) {
                if current.ptr_eq(&computation) {
                    entries.remove(&key);
                }
            }
        }
        result
    }

    /// Drop every memoized entry (test teardown, operator reset).
    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }
}
