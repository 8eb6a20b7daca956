//! Error types for the ball tracking library.

use thiserror::Error;

/// Main error type for the library
///
/// Any of these raised while a frame is being processed is a processing fault:
/// the processor logs it and hands the input frame back untouched.
#[derive(Error, Debug)]
pub enum Error {
    /// `OpenCV` operation failed
    #[error("OpenCV error: {0}")]
    OpenCV(#[from] opencv::Error),

    /// File I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid input parameters provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Generic I/O error with description
    #[error("I/O error: {0}")]
    IoError(String),
}

/// Expected, frame-scoped reasons for not producing a ball observation.
///
/// The `Display` text is what gets drawn on the debug overlay.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DetectionFailure {
    /// No table-colored contour in the frame
    #[error("Table not found!")]
    TableNotFound,

    /// Largest table contour is below the minimum area
    #[error("Table too small!")]
    TableTooSmall,

    /// No ball-colored contour inside the table disk
    #[error("Ball not found!")]
    BallNotFound,

    /// Ball contours exist but none falls inside the area bounds
    #[error("Wrong ball size!")]
    WrongBallSize,

    /// Ball maps outside the normalized [1000, 2000] square
    #[error("Wrong ball position!")]
    WrongBallPosition,
}

/// Convenience type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Outcome of a detection stage: the outer layer is a processing fault, the inner one an expected miss
pub type StageResult<T> = Result<std::result::Result<T, DetectionFailure>>;
