//! HSV color bounds and their conversion to OpenCV threshold ranges.
//!
//! Configured colors use degrees for hue and fractions for saturation and value.
//! Thresholding happens on OpenCV's 8-bit HSV, where hue is in half degrees
//! (0..=179) and saturation/value are 0..=255.
//!
//! `inRange` cannot express a hue interval that wraps past 0. Such ranges are
//! shifted by half a turn and marked `inverted`; they must be tested against the
//! hue-rotated frame built in [`crate::segmentation`].

use crate::constants::{CHANNEL_FULL_SCALE, HUE_HALF_TURN, HUE_MAX_HALF_DEGREES};
use opencv::core::Scalar;
use serde::{Deserialize, Serialize};

/// One end of a configured color interval
///
/// Deserializes from `{ hue, saturation, value }` or from a packed `0xRRGGBB` integer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "HsvBoundRepr")]
pub struct HsvBound {
    /// Hue in degrees, [0, 360)
    pub hue: f64,
    /// Saturation, [0, 1]
    pub saturation: f64,
    /// Value (brightness), [0, 1]
    pub value: f64,
}

/// Accepted spellings of an [`HsvBound`] in configuration files
#[derive(Deserialize)]
#[serde(untagged)]
enum HsvBoundRepr {
    Packed(u32),
    Components { hue: f64, saturation: f64, value: f64 },
}

impl From<HsvBoundRepr> for HsvBound {
    fn from(repr: HsvBoundRepr) -> Self {
        match repr {
            HsvBoundRepr::Packed(rgb) => Self::from_rgb(rgb),
            HsvBoundRepr::Components { hue, saturation, value } => Self::new(hue, saturation, value),
        }
    }
}

impl HsvBound {
    /// Create a bound from hue degrees and saturation/value fractions
    #[must_use]
    pub const fn new(hue: f64, saturation: f64, value: f64) -> Self {
        Self { hue, saturation, value }
    }

    /// Build a bound from a packed `0xRRGGBB` color (alpha byte ignored)
    #[must_use]
    pub fn from_rgb(packed: u32) -> Self {
        let r = f64::from((packed >> 16) & 0xFF) / CHANNEL_FULL_SCALE;
        let g = f64::from((packed >> 8) & 0xFF) / CHANNEL_FULL_SCALE;
        let b = f64::from(packed & 0xFF) / CHANNEL_FULL_SCALE;

        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let delta = max - min;

        let hue = if delta == 0.0 {
            0.0
        } else if max == r {
            60.0 * ((g - b) / delta).rem_euclid(6.0)
        } else if max == g {
            60.0 * ((b - r) / delta + 2.0)
        } else {
            60.0 * ((r - g) / delta + 4.0)
        };

        let saturation = if max == 0.0 { 0.0 } else { delta / max };

        Self {
            hue: hue.rem_euclid(360.0),
            saturation,
            value: max,
        }
    }

    /// Saturation on the 8-bit channel scale
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn saturation_int(&self) -> i32 {
        (self.saturation * CHANNEL_FULL_SCALE) as i32
    }

    /// Value on the 8-bit channel scale
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn value_int(&self) -> i32 {
        (self.value * CHANNEL_FULL_SCALE) as i32
    }

    /// Hue on the half-degree scale
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn hue_half_degrees(&self) -> i32 {
        (self.hue / 2.0) as i32
    }
}

/// Threshold interval on OpenCV's 8-bit HSV representation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorRange {
    /// Lowest accepted hue, half-degrees in [0, 179]
    pub hue_low: i32,
    /// Highest accepted hue, half-degrees in [0, 179]
    pub hue_high: i32,
    /// Lowest accepted saturation in [0, 255]
    pub sat_low: i32,
    /// Highest accepted saturation in [0, 255]
    pub sat_high: i32,
    /// Lowest accepted value in [0, 255]
    pub val_low: i32,
    /// Highest accepted value in [0, 255]
    pub val_high: i32,
    /// Threshold against the hue-rotated frame instead of the plain one
    pub inverted: bool,
}

impl ColorRange {
    /// Derive a threshold range from two configured bounds
    ///
    /// Equal hues select every hue; a lower hue above the upper one wraps
    /// through red and yields an inverted range.
    #[must_use]
    pub fn from_bounds(lower: &HsvBound, upper: &HsvBound) -> Self {
        #[allow(clippy::float_cmp)]
        let (hue_low, hue_high, inverted) = if lower.hue == upper.hue {
            (0, HUE_MAX_HALF_DEGREES, false)
        } else if lower.hue > upper.hue {
            (
                lower.hue_half_degrees() - HUE_HALF_TURN,
                upper.hue_half_degrees() + HUE_HALF_TURN,
                true,
            )
        } else {
            (lower.hue_half_degrees(), upper.hue_half_degrees(), false)
        };

        Self {
            hue_low,
            hue_high,
            sat_low: lower.saturation_int(),
            sat_high: upper.saturation_int(),
            val_low: lower.value_int(),
            val_high: upper.value_int(),
            inverted,
        }
    }

    /// Lower `inRange` bound
    #[must_use]
    pub fn lower_scalar(&self) -> Scalar {
        Scalar::new(
            f64::from(self.hue_low),
            f64::from(self.sat_low),
            f64::from(self.val_low),
            0.0,
        )
    }

    /// Upper `inRange` bound
    #[must_use]
    pub fn upper_scalar(&self) -> Scalar {
        Scalar::new(
            f64::from(self.hue_high),
            f64::from(self.sat_high),
            f64::from(self.val_high),
            0.0,
        )
    }

    /// Whether the range spans the whole hue axis
    #[must_use]
    pub fn is_full_spectrum(&self) -> bool {
        !self.inverted && self.hue_low == 0 && self.hue_high == HUE_MAX_HALF_DEGREES
    }
}
