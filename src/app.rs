//! Host application: capture frames, track the ball, show the overlay.

use crate::{
    config::{CameraConfig, Config},
    error::Result,
    orientation::DisplayRotation,
    processor::FrameProcessor,
    tracking::TrackedPosition,
};
use log::{debug, info, warn};
use opencv::{
    core::{Mat, Size},
    highgui::{self, WINDOW_NORMAL},
    imgproc,
    prelude::*,
    videoio::{self, VideoCapture, CAP_PROP_BUFFERSIZE, CAP_PROP_FRAME_HEIGHT, CAP_PROP_FRAME_WIDTH},
};
use std::io::Write;
use std::time::{Duration, Instant};

const WINDOW_NAME: &str = "Ball Table Tracker";

/// Main application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Camera index or video file path
    pub video_source: VideoSource,
    /// Tracker configuration
    pub tracker: Config,
    /// Run without a display window
    pub headless: bool,
    /// Write `x y detected` to stdout for every frame
    pub print_positions: bool,
}

/// Video source type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoSource {
    /// Webcam index
    Camera(i32),
    /// Video file path
    File(String),
}

impl VideoSource {
    /// Pick the source from command-line overrides, falling back to the configured camera
    ///
    /// A video file wins over any camera; an explicit camera index wins over `camera.index`.
    #[must_use]
    pub fn select(video: Option<String>, cam: Option<i32>, camera: &CameraConfig) -> Self {
        match (video, cam) {
            (Some(path), _) => Self::File(path),
            (None, Some(index)) => Self::Camera(index),
            (None, None) => Self::Camera(camera.index),
        }
    }
}

/// Main application struct
pub struct BallTrackerApp {
    config: AppConfig,
    processor: FrameProcessor,
    video_capture: VideoCapture,
    working_size: Size,
    rotation: DisplayRotation,
}

impl BallTrackerApp {
    /// Open the video source and build the frame processor
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the video source cannot be opened
    pub fn new(config: AppConfig) -> Result<Self> {
        info!("Initializing Ball Table Tracker");

        let processor = FrameProcessor::new(&config.tracker)?;
        let camera = &config.tracker.camera;

        let video_capture = match &config.video_source {
            VideoSource::Camera(index) => {
                info!("Opening camera {}", index);
                let mut cap = VideoCapture::new(*index, videoio::CAP_ANY)?;
                cap.set(CAP_PROP_FRAME_WIDTH, f64::from(camera.width))?;
                cap.set(CAP_PROP_FRAME_HEIGHT, f64::from(camera.height))?;
                cap.set(CAP_PROP_BUFFERSIZE, 1.0)?;
                cap
            }
            VideoSource::File(path) => {
                info!("Opening video file: {}", path);
                VideoCapture::from_file(path, videoio::CAP_ANY)?
            }
        };

        if !video_capture.is_opened()? {
            return Err(crate::Error::InvalidInput(format!(
                "Failed to open video source {:?}",
                config.video_source
            )));
        }

        if !config.headless {
            highgui::named_window(WINDOW_NAME, WINDOW_NORMAL)?;
        }

        Ok(Self {
            working_size: Size::new(camera.width, camera.height),
            rotation: camera.rotation,
            config,
            processor,
            video_capture,
        })
    }

    /// Run the main application loop until the source ends or the user quits
    ///
    /// # Errors
    ///
    /// Returns an error if reading from the source or displaying a frame fails
    pub fn run(&mut self) -> Result<()> {
        info!("Starting main application loop");

        let mut frame_count: u64 = 0;
        let start_time = Instant::now();
        let mut last_report = Instant::now();

        loop {
            let mut frame = Mat::default();
            if !self.video_capture.read(&mut frame)? || frame.empty() {
                if matches!(self.config.video_source, VideoSource::File(_)) {
                    info!("End of video file reached");
                    break;
                }
                warn!("Failed to read frame, retrying...");
                continue;
            }

            let frame = self.to_working_size(frame)?;
            let annotated = self.processor.process(&frame, self.rotation);
            let position = self.processor.position();

            if self.config.print_positions {
                print_position(&position)?;
            }

            frame_count += 1;
            if last_report.elapsed() >= Duration::from_secs(1) {
                #[allow(clippy::cast_precision_loss)]
                let fps = frame_count as f64 / start_time.elapsed().as_secs_f64();
                info!(
                    "FPS: {:.1} ball ({:.0}, {:.0}) detected={}",
                    fps, position.x, position.y, position.detected
                );
                last_report = Instant::now();
            }

            if !self.config.headless {
                highgui::imshow(WINDOW_NAME, &annotated)?;

                let key = highgui::wait_key(1)?;
                if key == 27 || key == i32::from(b'q') {
                    info!("Exit requested by user");
                    break;
                }
                if key == i32::from(b'r') {
                    info!("Resetting tracked position");
                    self.processor.reset_tracking();
                }
            }
        }

        info!("Processed {} frames, shutting down", frame_count);
        Ok(())
    }

    /// Scale captured frames to the configured working resolution
    fn to_working_size(&self, frame: Mat) -> Result<Mat> {
        if frame.size()? == self.working_size {
            return Ok(frame);
        }
        debug!("Resizing {:?} to {:?}", frame.size()?, self.working_size);
        let mut resized = Mat::default();
        imgproc::resize(&frame, &mut resized, self.working_size, 0.0, 0.0, imgproc::INTER_AREA)?;
        Ok(resized)
    }
}

/// One line per frame for an external controller
fn print_position(position: &TrackedPosition) -> Result<()> {
    let point = position.as_point();
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{} {} {}", point.x, point.y, u8::from(position.detected))?;
    stdout.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_uses_configured_camera() {
        let mut camera = CameraConfig::default();
        camera.index = 1;
        assert_eq!(VideoSource::select(None, None, &camera), VideoSource::Camera(1));
    }

    #[test]
    fn test_select_cli_camera_overrides_config() {
        let mut camera = CameraConfig::default();
        camera.index = 1;
        assert_eq!(VideoSource::select(None, Some(2), &camera), VideoSource::Camera(2));
        assert_eq!(VideoSource::select(None, Some(0), &camera), VideoSource::Camera(0));
    }

    #[test]
    fn test_select_video_file_wins() {
        let camera = CameraConfig::default();
        assert_eq!(
            VideoSource::select(Some("table.mp4".to_string()), Some(3), &camera),
            VideoSource::File("table.mp4".to_string())
        );
    }
}
