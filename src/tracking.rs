//! Temporal tracking of the normalized ball position.
//!
//! The tracker is either acquiring (no ball) or tracking. A fresh sighting
//! while acquiring jumps straight to the observed position; further sightings
//! are smoothed. Every frame spends one unit of a grace countdown that each
//! sighting refills, and the tracker falls back to acquiring only after the
//! countdown is exhausted.

use crate::{
    constants::{ALLOWED_LOST_FRAMES, NORMALIZED_MAX, NORMALIZED_MIN},
    filters::{exponential::ExponentialFilter, PositionFilter},
};

/// Ball position in table coordinates, each axis in [1000, 2000] when valid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizedPoint {
    /// Horizontal position, 1000 at the table's left edge
    pub x: i32,
    /// Vertical position, 1000 at the table's top edge
    pub y: i32,
}

impl NormalizedPoint {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Whether both axes lie inside the table's normalized square
    #[must_use]
    pub fn is_within_table(&self) -> bool {
        let range = NORMALIZED_MIN..=NORMALIZED_MAX;
        range.contains(&self.x) && range.contains(&self.y)
    }
}

/// Tracker state as seen by consumers of the position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackedPosition {
    /// Smoothed normalized x
    pub x: f64,
    /// Smoothed normalized y
    pub y: f64,
    /// Ball currently considered present
    pub detected: bool,
    /// Grace frames left before a lost ball is declared undetected
    pub frames_since_seen: u32,
}

impl TrackedPosition {
    /// Position truncated to whole normalized units, as sent to a controller
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn as_point(&self) -> NormalizedPoint {
        NormalizedPoint::new(self.x as i32, self.y as i32)
    }
}

impl Default for TrackedPosition {
    fn default() -> Self {
        Self {
            x: f64::from(crate::constants::NORMALIZED_CENTER),
            y: f64::from(crate::constants::NORMALIZED_CENTER),
            detected: false,
            frames_since_seen: 0,
        }
    }
}

/// Tracking state machine phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackingState {
    /// No ball; the next sighting is taken as-is
    Acquiring,
    /// Ball present; sightings are smoothed
    Tracking,
}

/// Owns one session's tracked position and its smoothing filter
#[derive(Debug, Clone)]
pub struct PositionTracker<F: PositionFilter = ExponentialFilter> {
    position: TrackedPosition,
    filter: F,
}

impl PositionTracker<ExponentialFilter> {
    /// Create a tracker with exponential smoothing
    ///
    /// # Panics
    ///
    /// Panics if `position_filter` is outside [0, 1)
    #[must_use]
    pub fn new(position_filter: f64) -> Self {
        Self::with_filter(ExponentialFilter::new(position_filter))
    }

    /// Change the smoothing coefficient without losing the current position
    pub fn set_position_filter(&mut self, position_filter: f64) {
        self.filter.set_alpha(position_filter);
    }
}

impl<F: PositionFilter> PositionTracker<F> {
    /// Create a tracker around an arbitrary filter
    #[must_use]
    pub fn with_filter(filter: F) -> Self {
        Self {
            position: TrackedPosition::default(),
            filter,
        }
    }

    /// Current tracked position
    #[must_use]
    pub fn position(&self) -> TrackedPosition {
        self.position
    }

    /// Smoothing filter in use
    #[must_use]
    pub fn filter(&self) -> &F {
        &self.filter
    }

    /// Current phase
    #[must_use]
    pub fn state(&self) -> TrackingState {
        if self.position.detected {
            TrackingState::Tracking
        } else {
            TrackingState::Acquiring
        }
    }

    /// Account for one processed frame
    ///
    /// `sighting` is the frame's valid observation, if any. Returns the
    /// position after the frame.
    pub fn record(&mut self, sighting: Option<NormalizedPoint>) -> TrackedPosition {
        if let Some(point) = sighting {
            self.observe(point);
        }
        self.tick();
        self.position
    }

    fn observe(&mut self, point: NormalizedPoint) {
        if !self.position.detected {
            self.filter.reset();
            self.position.detected = true;
        }
        let (x, y) = self.filter.apply(f64::from(point.x), f64::from(point.y));
        self.position.x = x;
        self.position.y = y;
        self.position.frames_since_seen = ALLOWED_LOST_FRAMES;
    }

    fn tick(&mut self) {
        if self.position.frames_since_seen > 0 {
            self.position.frames_since_seen -= 1;
        } else {
            self.position.detected = false;
        }
    }

    /// Forget the ball and start acquiring again
    pub fn reset(&mut self) {
        self.filter.reset();
        self.position = TrackedPosition::default();
    }
}
