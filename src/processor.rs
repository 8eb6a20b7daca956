//! Per-frame ball tracking pipeline.
//!
//! One [`FrameProcessor`] owns everything that persists between frames: the
//! derived color ranges, the cached display orientation and the tracked
//! position. Frames are processed one at a time to completion; callers that
//! capture on several threads must serialize calls per processor.

use crate::{
    annotation::{Annotator, Palette},
    ball_detection::{detect_ball, BallObservation, BallSizeLimits},
    color_range::ColorRange,
    config::Config,
    error::DetectionFailure,
    orientation::{orient_frame, CameraFacing, DisplayRotation},
    segmentation::{morph_kernel, segment, to_bgr, Masks, PixelFormat},
    table_detection::{detect_table, TableObservation},
    filters::PositionFilter,
    tracking::{NormalizedPoint, PositionTracker, TrackedPosition},
    utils::safe_cast::f32_to_i32_clamp,
    Error, Result,
};
use log::{debug, error, info, warn};
use opencv::{core::Mat, imgproc, prelude::*};

/// Normalized ball position, or why this frame has none
pub type FrameOutcome = std::result::Result<NormalizedPoint, DetectionFailure>;

/// Geometry recovered from one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    /// Table, when one was found and large enough
    pub table: Option<TableObservation>,
    /// Ball, when one of plausible size was found on the table
    pub ball: Option<BallObservation>,
    /// Final verdict for the frame
    pub outcome: FrameOutcome,
}

impl Detection {
    fn missed(table: Option<TableObservation>, failure: DetectionFailure) -> Self {
        Self {
            table,
            ball: None,
            outcome: Err(failure),
        }
    }
}

/// Everything produced for one frame
pub struct FrameReport {
    /// Annotated frame, same size as the input
    pub annotated: Mat,
    /// Geometry and verdict
    pub detection: Detection,
    /// Tracked position after this frame
    pub position: TrackedPosition,
}

/// Stateful frame-to-position transform
pub struct FrameProcessor {
    table_range: ColorRange,
    ball_range: ColorRange,
    ball_limits: BallSizeLimits,
    min_table_area: f64,
    setpoint: NormalizedPoint,
    facing: CameraFacing,
    pixel_format: PixelFormat,
    palette: Palette,
    kernel: Mat,
    orientation: Option<DisplayRotation>,
    tracker: PositionTracker,
}

impl FrameProcessor {
    /// Create a processor from a validated configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the morphology kernel cannot be built
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;
        let processor = Self {
            table_range: config.colors.table_range(),
            ball_range: config.colors.ball_range(),
            ball_limits: config.tracking.ball_limits(),
            min_table_area: config.tracking.min_table_area,
            setpoint: config.tracking.ball_setpoint.into(),
            facing: config.camera.facing,
            pixel_format: config.camera.pixel_format,
            palette: Palette::new(config.camera.pixel_format),
            kernel: morph_kernel()?,
            orientation: None,
            tracker: PositionTracker::new(config.tracking.position_filter),
        };
        info!(
            "Frame processor ready: table range {:?}, ball range {:?}, smoothing with {}",
            processor.table_range,
            processor.ball_range,
            processor.tracker.filter().name()
        );
        processor.warn_full_spectrum();
        Ok(processor)
    }

    /// Apply a new configuration, keeping the tracked position
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid; the processor is left unchanged
    pub fn reconfigure(&mut self, config: &Config) -> Result<()> {
        config.validate()?;
        self.table_range = config.colors.table_range();
        self.ball_range = config.colors.ball_range();
        self.ball_limits = config.tracking.ball_limits();
        self.min_table_area = config.tracking.min_table_area;
        self.setpoint = config.tracking.ball_setpoint.into();
        self.facing = config.camera.facing;
        self.pixel_format = config.camera.pixel_format;
        self.palette = Palette::new(config.camera.pixel_format);
        self.tracker.set_position_filter(config.tracking.position_filter);
        self.invalidate_orientation();
        info!(
            "Frame processor reconfigured: table range {:?}, ball range {:?}",
            self.table_range, self.ball_range
        );
        self.warn_full_spectrum();
        Ok(())
    }

    fn warn_full_spectrum(&self) {
        if self.table_range.is_full_spectrum() {
            warn!("Table hue bounds are equal; every hue counts as table");
        }
        if self.ball_range.is_full_spectrum() {
            warn!("Ball hue bounds are equal; every hue counts as ball");
        }
    }

    /// Sample the display rotation again on the next frame
    pub fn invalidate_orientation(&mut self) {
        self.orientation = None;
    }

    /// Current tracked position
    #[must_use]
    pub fn position(&self) -> TrackedPosition {
        self.tracker.position()
    }

    /// Derived table threshold range
    #[must_use]
    pub fn table_range(&self) -> &ColorRange {
        &self.table_range
    }

    /// Derived ball threshold range
    #[must_use]
    pub fn ball_range(&self) -> &ColorRange {
        &self.ball_range
    }

    /// Forget the tracked ball
    pub fn reset_tracking(&mut self) {
        self.tracker.reset();
    }

    /// Process a frame and always return something displayable
    ///
    /// On a processing fault the fault is logged, the input frame is returned
    /// unchanged and the tracked position is left as it was.
    pub fn process(&mut self, frame: &Mat, rotation: DisplayRotation) -> Mat {
        match self.process_frame(frame, rotation) {
            Ok(report) => report.annotated,
            Err(e) => {
                error!("Error processing frame: {}", e);
                frame.clone()
            }
        }
    }

    /// Process a frame, surfacing processing faults to the caller
    ///
    /// The tracked position is only committed when the whole frame succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame is malformed or any `OpenCV` operation fails
    pub fn process_frame(&mut self, frame: &Mat, rotation: DisplayRotation) -> Result<FrameReport> {
        if frame.empty() {
            return Err(Error::InvalidInput("Empty frame".to_string()));
        }

        let rotation = *self.orientation.get_or_insert(rotation);
        let oriented = orient_frame(frame, rotation, self.facing)?;
        let mut annotated = oriented.try_clone()?;

        let bgr = to_bgr(&oriented, self.pixel_format)?;
        let masks = segment(&bgr, &self.table_range, &self.ball_range, &self.kernel)?;
        let detection = self.locate(&masks)?;

        let mut tracker = self.tracker.clone();
        let position = tracker.record(detection.outcome.ok());

        self.annotate(&mut annotated, &detection, &position)?;
        let annotated = restore_size(annotated, frame)?;

        match detection.outcome {
            Ok(point) => debug!(
                "Ball at ({}, {}), tracked ({:.1}, {:.1})",
                point.x, point.y, position.x, position.y
            ),
            Err(failure) => debug!(
                "{} detected={} grace={}",
                failure, position.detected, position.frames_since_seen
            ),
        }

        self.tracker = tracker;
        Ok(FrameReport {
            annotated,
            detection,
            position,
        })
    }

    /// Run table detection, ball detection and normalization in order
    fn locate(&self, masks: &Masks) -> Result<Detection> {
        let table = match detect_table(&masks.table, self.min_table_area)? {
            Ok(table) => table,
            Err(failure) => return Ok(Detection::missed(None, failure)),
        };

        let gated = table.gate(&masks.ball, &self.kernel)?;
        let ball = match detect_ball(&gated, table.contour_area, &self.ball_limits)? {
            Ok(ball) => ball,
            Err(failure) => return Ok(Detection::missed(Some(table), failure)),
        };

        Ok(Detection {
            table: Some(table),
            ball: Some(ball),
            outcome: table.normalize(ball.center)?,
        })
    }

    fn annotate(&self, frame: &mut Mat, detection: &Detection, position: &TrackedPosition) -> Result<()> {
        let mut annotator = Annotator::new(frame, self.palette);

        if let Some(table) = &detection.table {
            annotator.table(table)?;
            annotator.setpoint(table, self.setpoint)?;
        }

        match (detection.outcome, &detection.table, &detection.ball) {
            (Ok(_), Some(table), Some(ball)) => {
                let radius = f32_to_i32_clamp(ball.radius, 0, i32::MAX);
                annotator.ball(table, position, radius)
            }
            (Err(failure), _, _) => annotator.failure(failure),
            _ => Ok(()),
        }
    }
}

/// Scale the annotated frame back to the input's size when orientation changed it
fn restore_size(annotated: Mat, input: &Mat) -> Result<Mat> {
    let size = input.size()?;
    if annotated.size()? == size {
        return Ok(annotated);
    }
    let mut resized = Mat::default();
    imgproc::resize(&annotated, &mut resized, size, 0.0, 0.0, imgproc::INTER_LINEAR)?;
    Ok(resized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencv::core::{Scalar, CV_8UC1, CV_8UC3};

    #[test]
    fn test_rejects_empty_frame() {
        let mut processor = FrameProcessor::new(&Config::default()).unwrap();
        assert!(matches!(
            processor.process_frame(&Mat::default(), DisplayRotation::Rotation90),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_fault_returns_input_unchanged() {
        let mut processor = FrameProcessor::new(&Config::default()).unwrap();
        let gray = Mat::new_rows_cols_with_default(48, 64, CV_8UC1, Scalar::all(7.0)).unwrap();
        let before = processor.position();

        let out = processor.process(&gray, DisplayRotation::Rotation90);
        assert_eq!(out.channels(), 1);
        assert_eq!(*out.at_2d::<u8>(10, 10).unwrap(), 7);
        assert_eq!(processor.position(), before);
    }

    #[test]
    fn test_output_keeps_input_size_when_transposed() {
        let mut processor = FrameProcessor::new(&Config::default()).unwrap();
        let frame = Mat::new_rows_cols_with_default(48, 64, CV_8UC3, Scalar::all(0.0)).unwrap();
        let report = processor.process_frame(&frame, DisplayRotation::Rotation0).unwrap();
        assert_eq!(report.annotated.size().unwrap(), frame.size().unwrap());
        assert_eq!(report.detection.outcome, Err(DetectionFailure::TableNotFound));
    }

    #[test]
    fn test_orientation_sampled_once() {
        let mut processor = FrameProcessor::new(&Config::default()).unwrap();
        let frame = Mat::new_rows_cols_with_default(48, 64, CV_8UC3, Scalar::all(0.0)).unwrap();
        processor.process_frame(&frame, DisplayRotation::Rotation270).unwrap();
        processor.process_frame(&frame, DisplayRotation::Rotation0).unwrap();
        assert_eq!(processor.orientation, Some(DisplayRotation::Rotation270));

        processor.invalidate_orientation();
        processor.process_frame(&frame, DisplayRotation::Rotation0).unwrap();
        assert_eq!(processor.orientation, Some(DisplayRotation::Rotation0));
    }

    #[test]
    fn test_reconfigure_rejects_invalid_config() {
        let mut processor = FrameProcessor::new(&Config::default()).unwrap();
        let before = *processor.table_range();

        let mut config = Config::default();
        config.colors.table_lower.hue = 400.0;
        assert!(processor.reconfigure(&config).is_err());
        assert_eq!(*processor.table_range(), before);
    }
}
