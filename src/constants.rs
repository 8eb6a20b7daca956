//! Constants used throughout the tracker

/// Lower edge of the normalized table coordinate range
pub const NORMALIZED_MIN: i32 = 1000;

/// Upper edge of the normalized table coordinate range
pub const NORMALIZED_MAX: i32 = 2000;

/// Center of the normalized table coordinate range
pub const NORMALIZED_CENTER: i32 = 1500;

/// Frames the last position stays valid after the ball is lost
pub const ALLOWED_LOST_FRAMES: u32 = 5;

/// Default minimum table contour area (px²)
pub const DEFAULT_MIN_TABLE_AREA: f64 = 1000.0;

/// Default minimum ball contour area (px², exclusive)
pub const DEFAULT_MIN_BALL_AREA: f64 = 100.0;

/// Ball area must stay below table area divided by this
pub const DEFAULT_MAX_BALL_AREA_DIVISOR: f64 = 4.0;

/// Default exponential smoothing weight of the previous position
pub const DEFAULT_POSITION_FILTER: f64 = 0.5;

/// Side of the elliptical structuring element used for mask cleanup
pub const MORPH_KERNEL_SIZE: i32 = 5;

/// Largest hue on the OpenCV 8-bit half-degree scale
pub const HUE_MAX_HALF_DEGREES: i32 = 179;

/// Half of the hue circle on the half-degree scale
pub const HUE_HALF_TURN: i32 = 90;

/// Full scale of 8-bit saturation and value channels
pub const CHANNEL_FULL_SCALE: f64 = 255.0;

/// Default working frame width (px)
pub const DEFAULT_FRAME_WIDTH: i32 = 640;

/// Default working frame height (px)
pub const DEFAULT_FRAME_HEIGHT: i32 = 480;

/// Radius of the ring marking the table center
pub const CENTER_MARK_RADIUS: i32 = 5;

/// Radius of the rings around the P, Q and R reference marks
pub const REFERENCE_MARK_RADIUS: i32 = 10;

/// Radius of the ring marking the ball setpoint
pub const SETPOINT_RADIUS: i32 = 20;

/// Top-left corner of the status line, in working-frame pixels
pub const STATUS_TEXT_ORIGIN: (i32, i32) = (50, 50);
