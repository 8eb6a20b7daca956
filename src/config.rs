//! Configuration management for the ball tracker

use crate::{
    ball_detection::BallSizeLimits,
    color_range::{ColorRange, HsvBound},
    constants::{
        DEFAULT_FRAME_HEIGHT, DEFAULT_FRAME_WIDTH, DEFAULT_MAX_BALL_AREA_DIVISOR, DEFAULT_MIN_BALL_AREA,
        DEFAULT_MIN_TABLE_AREA, DEFAULT_POSITION_FILTER, NORMALIZED_CENTER,
    },
    orientation::{CameraFacing, DisplayRotation},
    segmentation::PixelFormat,
    tracking::NormalizedPoint,
    Error, Result,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tracker configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Camera and frame configuration
    pub camera: CameraConfig,

    /// Table and ball colors
    pub colors: ColorConfig,

    /// Detection thresholds and smoothing
    pub tracking: TrackingConfig,
}

/// Camera and frame configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Which camera delivers frames; the front camera is mirrored
    pub facing: CameraFacing,

    /// Capture device index
    pub index: i32,

    /// Working frame width
    pub width: i32,

    /// Working frame height
    pub height: i32,

    /// Display rotation the frames are captured under
    pub rotation: DisplayRotation,

    /// Channel layout of incoming frames
    pub pixel_format: PixelFormat,
}

/// Color bounds for segmentation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    /// Lower table color bound
    pub table_lower: HsvBound,

    /// Upper table color bound
    pub table_upper: HsvBound,

    /// Lower ball color bound
    pub ball_lower: HsvBound,

    /// Upper ball color bound
    pub ball_upper: HsvBound,
}

/// Ball setpoint shown on the overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Setpoint {
    pub x: i32,
    pub y: i32,
}

impl From<Setpoint> for NormalizedPoint {
    fn from(setpoint: Setpoint) -> Self {
        Self::new(setpoint.x, setpoint.y)
    }
}

/// Detection and filtering parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    /// Weight of the previous position in exponential smoothing, [0, 1)
    pub position_filter: f64,

    /// Target ball position, normalized
    pub ball_setpoint: Setpoint,

    /// Table contour must be larger than this (px²)
    pub min_table_area: f64,

    /// Ball contour must be larger than this (px²)
    pub min_ball_area: f64,

    /// Ball contour must be smaller than table area divided by this
    pub max_ball_area_divisor: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            facing: CameraFacing::Back,
            index: 0,
            width: DEFAULT_FRAME_WIDTH,
            height: DEFAULT_FRAME_HEIGHT,
            // landscape capture: frames pass through unchanged
            rotation: DisplayRotation::Rotation90,
            pixel_format: PixelFormat::Bgr,
        }
    }
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            // blue table
            table_lower: HsvBound::new(190.0, 0.35, 0.25),
            table_upper: HsvBound::new(250.0, 1.0, 1.0),
            // red ball, wrapping through 0°
            ball_lower: HsvBound::new(340.0, 0.5, 0.35),
            ball_upper: HsvBound::new(20.0, 1.0, 1.0),
        }
    }
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            position_filter: DEFAULT_POSITION_FILTER,
            ball_setpoint: Setpoint {
                x: NORMALIZED_CENTER,
                y: NORMALIZED_CENTER,
            },
            min_table_area: DEFAULT_MIN_TABLE_AREA,
            min_ball_area: DEFAULT_MIN_BALL_AREA,
            max_ball_area_divisor: DEFAULT_MAX_BALL_AREA_DIVISOR,
        }
    }
}

impl ColorConfig {
    /// Threshold range for the table
    #[must_use]
    pub fn table_range(&self) -> ColorRange {
        ColorRange::from_bounds(&self.table_lower, &self.table_upper)
    }

    /// Threshold range for the ball
    #[must_use]
    pub fn ball_range(&self) -> ColorRange {
        ColorRange::from_bounds(&self.ball_lower, &self.ball_upper)
    }
}

impl TrackingConfig {
    /// Ball area bounds
    #[must_use]
    pub fn ball_limits(&self) -> BallSizeLimits {
        BallSizeLimits {
            min_area: self.min_ball_area,
            max_area_divisor: self.max_ball_area_divisor,
        }
    }
}

fn validate_bound(name: &str, bound: &HsvBound) -> Result<()> {
    if !(0.0..360.0).contains(&bound.hue) {
        return Err(Error::ConfigError(format!(
            "{name} hue must be in [0, 360), got {}",
            bound.hue
        )));
    }
    if !(0.0..=1.0).contains(&bound.saturation) || !(0.0..=1.0).contains(&bound.value) {
        return Err(Error::ConfigError(format!(
            "{name} saturation and value must be between 0.0 and 1.0"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::IoError(e.to_string()))?;

        serde_yaml::from_str(&content).map_err(|e| Error::ConfigError(format!("Failed to parse config: {}", e)))
    }

    /// Save configuration to a YAML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content).map_err(|e| Error::IoError(e.to_string()))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.camera.width <= 0 || self.camera.height <= 0 {
            return Err(Error::ConfigError(
                "Frame width and height must be greater than 0".to_string(),
            ));
        }

        validate_bound("Table lower", &self.colors.table_lower)?;
        validate_bound("Table upper", &self.colors.table_upper)?;
        validate_bound("Ball lower", &self.colors.ball_lower)?;
        validate_bound("Ball upper", &self.colors.ball_upper)?;

        let tracking = &self.tracking;
        if !(0.0..1.0).contains(&tracking.position_filter) {
            return Err(Error::ConfigError(
                "Position filter must be in [0.0, 1.0)".to_string(),
            ));
        }
        if !NormalizedPoint::from(tracking.ball_setpoint).is_within_table() {
            return Err(Error::ConfigError(
                "Ball setpoint must be between 1000 and 2000 on both axes".to_string(),
            ));
        }
        let areas = [tracking.min_table_area, tracking.min_ball_area, tracking.max_ball_area_divisor];
        if !areas.iter().all(|a| a.is_finite()) {
            return Err(Error::ConfigError("Area settings must be finite numbers".to_string()));
        }
        if tracking.min_table_area < 0.0 || tracking.min_ball_area < 0.0 {
            return Err(Error::ConfigError("Minimum areas must not be negative".to_string()));
        }
        if tracking.max_ball_area_divisor <= 0.0 {
            return Err(Error::ConfigError(
                "Ball area divisor must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Ball Table Tracker Configuration

# Camera and frame settings
camera:
  facing: back          # front | back | any
  index: 0
  width: 640
  height: 480
  rotation: rotation90  # rotation0 | rotation90 | rotation180 | rotation270
  pixel_format: bgr     # bgr | rgba

# Color bounds: hue in degrees [0, 360), saturation and value in [0, 1]
# A lower hue above the upper hue wraps through red.
# A bound may also be a packed 0xRRGGBB color, e.g. `ball_lower: 0xFF0000`.
colors:
  table_lower: { hue: 190.0, saturation: 0.35, value: 0.25 }
  table_upper: { hue: 250.0, saturation: 1.0, value: 1.0 }
  ball_lower: { hue: 340.0, saturation: 0.5, value: 0.35 }
  ball_upper: { hue: 20.0, saturation: 1.0, value: 1.0 }

# Detection and smoothing
tracking:
  position_filter: 0.5
  ball_setpoint: { x: 1500, y: 1500 }
  min_table_area: 1000.0
  min_ball_area: 100.0
  max_ball_area_divisor: 4.0
"#;
