//! Smoothing filters for tracked ball positions.
//!
//! A filter sees one observation per frame in which the ball was found and
//! returns the position to report. `reset` makes the next observation pass
//! through unchanged, which is how the tracker jumps to a newly acquired ball.

/// Exponential smoothing weighted toward the previous position
pub mod exponential;

/// Trait for position filters
pub trait PositionFilter: Clone + Send + Sync {
    /// Apply filter to a new observation
    fn apply(&mut self, x: f64, y: f64) -> (f64, f64);

    /// Reset filter state
    fn reset(&mut self);

    /// Get filter name
    fn name(&self) -> &str;
}
