//! Core data types shared across the segmentation pipeline and API layer.

use serde::{Deserialize, Serialize};

/// RGB facet of a named color, as reported by the oracle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    /// Display form, e.g. `"#32cd32"`
    pub value: String,
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// HSL facet of a named color, as reported by the oracle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hsl {
    /// Display form, e.g. `"hsl(120, 61%, 50%)"`
    pub value: String,
    /// Hue in `[0, 360)`
    pub h: f64,
    /// Saturation in `[0, 100]`
    pub s: f64,
    /// Lightness in `[0, 100]`
    pub l: f64,
}

/// A named color produced by the oracle for one queried hue.
///
/// Immutable once produced; identity is by value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorDescriptor {
    pub name: String,
    pub rgb: Rgb,
    pub hsl: Hsl,
}

/// A maximal contiguous hue interval mapped to one named color.
///
/// Represents the half-open interval `[start_hue, end_hue)` on the hue
/// circle. `end_hue` may exceed 360 to express a segment fused across the
/// 0°/360° wrap point (e.g. `350..380`). Invariant: `start_hue < end_hue`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HueSegment {
    pub start_hue: f64,
    pub end_hue: f64,
    pub color: ColorDescriptor,
}

impl HueSegment {
    /// Angular span in degrees, accounting for wrap-around representation.
    pub fn span(&self) -> f64 {
        if self.end_hue >= self.start_hue {
            self.end_hue - self.start_hue
        } else {
            self.end_hue + 360.0 - self.start_hue
        }
    }
}

/// Validated saturation/lightness pair for one segmentation run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentationParams {
    pub saturation: f64,
    pub lightness: f64,
}

impl SegmentationParams {
    /// Validate both values into `[0, 100]`.
    pub fn new(saturation: f64, lightness: f64) -> Result<Self, String> {
        if !saturation.is_finite() || !(0.0..=100.0).contains(&saturation) {
            return Err(format!(
                "saturation must be in [0, 100], got {saturation}"
            ));
        }
        if !lightness.is_finite() || !(0.0..=100.0).contains(&lightness) {
            return Err(format!("lightness must be in [0, 100], got {lightness}"));
        }
        Ok(Self {
            saturation,
            lightness,
        })
    }

    /// True when hue has no visual effect: zero saturation, or lightness at
    /// either extreme (pure black / pure white).
    pub fn is_achromatic(&self) -> bool {
        self.saturation == 0.0 || self.lightness == 0.0 || self.lightness == 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(name: &str) -> ColorDescriptor {
        ColorDescriptor {
            name: name.to_string(),
            rgb: Rgb {
                value: "#ff0000".to_string(),
                r: 255,
                g: 0,
                b: 0,
            },
            hsl: Hsl {
                value: "hsl(0, 100%, 50%)".to_string(),
                h: 0.0,
                s: 100.0,
                l: 50.0,
            },
        }
    }

    #[test]
    fn segment_serializes_camel_case() {
        let segment = HueSegment {
            start_hue: 10.0,
            end_hue: 50.0,
            color: descriptor("Red"),
        };
        let json = serde_json::to_value(&segment).unwrap();
        assert_eq!(json["startHue"], 10.0);
        assert_eq!(json["endHue"], 50.0);
        assert_eq!(json["color"]["name"], "Red");
    }

    #[test]
    fn span_handles_wrap_representation() {
        let mut segment = HueSegment {
            start_hue: 300.0,
            end_hue: 400.0,
            color: descriptor("Rose"),
        };
        assert_eq!(segment.span(), 100.0);

        // Wrap expressed with end < start (pre-normalized form)
        segment.end_hue = 40.0;
        assert_eq!(segment.span(), 100.0);
    }

    #[test]
    fn params_validation() {
        assert!(SegmentationParams::new(50.0, 50.0).is_ok());
        assert!(SegmentationParams::new(-1.0, 50.0).is_err());
        assert!(SegmentationParams::new(50.0, 101.0).is_err());
        assert!(SegmentationParams::new(f64::NAN, 50.0).is_err());
    }

    #[test]
    fn achromatic_detection() {
        assert!(SegmentationParams::new(0.0, 50.0).unwrap().is_achromatic());
        assert!(SegmentationParams::new(80.0, 0.0).unwrap().is_achromatic());
        assert!(SegmentationParams::new(80.0, 100.0).unwrap().is_achromatic());
        assert!(!SegmentationParams::new(80.0, 50.0).unwrap().is_achromatic());
    }
}
