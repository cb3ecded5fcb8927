//! Canonical-name deduplication of near-duplicate color names.
//!
//! The oracle's naming dataset contains near-duplicate spellings of the same
//! name ("Screamin' Green" vs "Screamin Green"). Upstream passes treat those
//! as distinct, splitting what should be one region. This pass collapses each
//! canonical-name family down to its widest segment.
//!
//! Accepted tradeoff: when the circle reads `X, Y, X'` with `X`/`X'` in one
//! family, keeping a single `X`-family representative can leave a gap where
//! the dropped sibling sat. Consumers get fewer, cleaner names at the cost of
//! exact coverage in that case.

use std::collections::HashMap;

use tracing::debug;

use crate::types::HueSegment;

/// Collapse a name to its canonical key: lower-cased, ASCII letters and
/// digits only.
pub fn canonical_key(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Keep exactly one segment per canonical name: the one with the greatest
/// wrap-aware angular span, ties broken by earliest position. The surviving
/// entries keep their original order; dropped entries are removed outright,
/// never merged, so already-emitted streaming output is never retracted.
pub fn resolve_duplicates(segments: Vec<HueSegment>) -> Vec<HueSegment> {
    // Representative index per canonical key: widest span, earliest wins ties.
    let mut representative: HashMap<String, usize> = HashMap::new();
    for (index, segment) in segments.iter().enumerate() {
        let key = canonical_key(&segment.color.name);
        match representative.get(&key) {
            Some(&best) if segments[best].span() >= segment.span() => {}
            _ => {
                representative.insert(key, index);
            }
        }
    }

    segments
        .into_iter()
        .enumerate()
        .filter(|(index, segment)| {
            let key = canonical_key(&segment.color.name);
            let keep = representative.get(&key) == Some(index);
            if !keep {
                debug!(
                    "Dropping duplicate-name segment '{}' [{}, {})",
                    segment.color.name, segment.start_hue, segment.end_hue
                );
            }
            keep
        })
        .map(|(_, segment)| segment)
        .collect()
}
