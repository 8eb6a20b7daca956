//! Ball localization inside the gated ball mask.

use crate::{
    constants::{DEFAULT_MAX_BALL_AREA_DIVISOR, DEFAULT_MIN_BALL_AREA},
    error::{DetectionFailure, StageResult},
    table_detection::{external_contours, whole_area},
};
use opencv::{
    core::{Mat, Point2f, Vector},
    imgproc,
};

/// Accepted ball contour areas, relative to the table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BallSizeLimits {
    /// Ball area must exceed this (px²)
    pub min_area: f64,
    /// Ball area must stay below table area divided by this
    pub max_area_divisor: f64,
}

impl Default for BallSizeLimits {
    fn default() -> Self {
        Self {
            min_area: DEFAULT_MIN_BALL_AREA,
            max_area_divisor: DEFAULT_MAX_BALL_AREA_DIVISOR,
        }
    }
}

impl BallSizeLimits {
    /// Largest accepted ball area (exclusive) for a table of `table_area`
    #[must_use]
    pub fn max_area(&self, table_area: f64) -> f64 {
        (table_area / self.max_area_divisor).trunc()
    }

    /// Whether a contour area is a plausible ball on this table
    #[must_use]
    pub fn accepts(&self, area: f64, table_area: f64) -> bool {
        area > self.min_area && area < self.max_area(table_area)
    }
}

/// Ball found in one frame, in pixel coordinates of the oriented frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BallObservation {
    /// Center of the minimum enclosing circle
    pub center: Point2f,
    /// Radius of the minimum enclosing circle
    pub radius: f32,
    /// Area of the winning contour, whole pixels
    pub contour_area: f64,
}

/// Locate the ball as the largest plausibly sized contour
///
/// `gated_mask` should already be restricted to the table disk.
///
/// # Errors
///
/// Returns an error if contour analysis fails
pub fn detect_ball(gated_mask: &Mat, table_area: f64, limits: &BallSizeLimits) -> StageResult<BallObservation> {
    let contours = external_contours(gated_mask)?;
    if contours.is_empty() {
        return Ok(Err(DetectionFailure::BallNotFound));
    }

    let mut best: Option<(usize, f64)> = None;
    for (index, contour) in contours.iter().enumerate() {
        let area = whole_area(&contour)?;
        let larger = best.map_or(true, |(_, best_area)| area > best_area);
        if larger && limits.accepts(area, table_area) {
            best = Some((index, area));
        }
    }

    let Some((index, contour_area)) = best else {
        return Ok(Err(DetectionFailure::WrongBallSize));
    };

    let points: Vector<Point2f> = contours
        .get(index)?
        .iter()
        .map(|p| Point2f::new(p.x as f32, p.y as f32))
        .collect();

    let mut center = Point2f::default();
    let mut radius = 0.0f32;
    imgproc::min_enclosing_circle(&points, &mut center, &mut radius)?;

    Ok(Ok(BallObservation {
        center,
        radius,
        contour_area,
    }))
}
