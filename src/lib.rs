//! Ball-on-table tracking for a ball-balancing rig.
//!
//! A camera looks down on a round, uniformly colored table carrying a ball of
//! a contrasting color. For every frame this library:
//! 1. Orients the frame for the display rotation and camera facing
//! 2. Thresholds it in HSV into a table mask and a ball mask
//! 3. Finds the table as the largest table-colored blob
//! 4. Finds the ball inside the table disk
//! 5. Maps the ball center into table coordinates, `[1000, 2000]` per axis
//! 6. Smooths the position and tracks whether the ball is still seen
//! 7. Draws a debug overlay onto the frame
//!
//! # Examples
//!
//! ```no_run
//! use ball_table_tracker::{config::Config, orientation::DisplayRotation, processor::FrameProcessor};
//! use opencv::{core::Mat, prelude::*, videoio};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut processor = FrameProcessor::new(&Config::default())?;
//! let mut cap = videoio::VideoCapture::new(0, videoio::CAP_ANY)?;
//! let mut frame = Mat::default();
//!
//! while cap.read(&mut frame)? {
//!     let report = processor.process_frame(&frame, DisplayRotation::Rotation90)?;
//!     if report.position.detected {
//!         println!("Ball at ({:.0}, {:.0})", report.position.x, report.position.y);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

/// HSV color bounds and threshold ranges
pub mod color_range;

/// Frame rotation and mirroring
pub mod orientation;

/// HSV conversion, thresholding and mask cleanup
pub mod segmentation;

/// Table localization and table coordinates
pub mod table_detection;

/// Ball localization
pub mod ball_detection;

/// Position smoothing and detection state
pub mod tracking;

/// Signal filtering for smoothing ball positions
pub mod filters;

/// Debug overlay drawing
pub mod annotation;

/// Per-frame pipeline
pub mod processor;

/// Utility functions for coordinate mapping and numeric conversion
pub mod utils;

/// Error types and result handling
pub mod error;

/// Main application module
pub mod app;

/// Constants used throughout the application
pub mod constants;

/// Configuration management
pub mod config;

pub use error::{DetectionFailure, Error, Result};
