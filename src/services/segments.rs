//! Segment construction from known samples, and adjacent/wrap merging.
//!
//! Both passes are pure and synchronous; they run after every new discovery,
//! so they must be cheap relative to an oracle call.

use crate::types::{ColorDescriptor, HueSegment};

/// Turn the sorted known samples into boundary-delimited segments covering
/// `[0, 360)`.
///
/// Segment *i* spans `[h_i, h_{i+1})` and carries the color sampled at its
/// start hue; the last segment runs to 360. Input pairs each known hue with
/// its completed sample, so every boundary has a color and the output covers
/// the circle with no gaps.
pub fn build_segments(samples: &[(f64, ColorDescriptor)]) -> Vec<HueSegment> {
    let mut segments = Vec::with_capacity(samples.len());
    for (index, (hue, color)) in samples.iter().enumerate() {
        let end_hue = match samples.get(index + 1) {
            Some((next_hue, _)) => *next_hue,
            None => 360.0,
        };
        segments.push(HueSegment {
            start_hue: *hue,
            end_hue,
            color: color.clone(),
        });
    }
    segments
}

/// Fuse adjacent same-name segments, then fuse across the 0°/360° wrap.
///
/// The forward pass absorbs each later segment's `end_hue` into the earlier
/// one when names match. If the first and last survivors also share a name,
/// they become one segment starting at the last's `start_hue` and ending at
/// the first's `end_hue + 360` (the >360 end marks the wrap); it replaces the
/// first entry and the last is dropped. A single-segment list is returned
/// unchanged.
pub fn merge_segments(segments: Vec<HueSegment>) -> Vec<HueSegment> {
    let mut merged: Vec<HueSegment> = Vec::with_capacity(segments.len());
    for segment in segments {
        match merged.last_mut() {
            Some(last) if last.color.name == segment.color.name => {
                last.end_hue = segment.end_hue;
            }
            _ => merged.push(segment),
        }
    }

    if merged.len() > 1 && merged[0].color.name == merged[merged.len() - 1].color.name {
        if let Some(last) = merged.pop() {
            merged[0].end_hue += 360.0;
            merged[0].start_hue = last.start_hue;
        }
    }

    merged
}
