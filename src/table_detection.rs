//! Table localization from the table mask, and the table-relative coordinate frame.

use crate::{
    constants::{NORMALIZED_MAX, NORMALIZED_MIN},
    error::{DetectionFailure, StageResult},
    segmentation::erode,
    tracking::NormalizedPoint,
    utils::{rect_center, rect_radius, remap::{remap, remap_inverse}, safe_cast::f64_to_i32},
    Result,
};
use opencv::{
    core::{self, Mat, Point, Point2f, Rect, Scalar, Vector, CV_8UC1},
    imgproc,
    prelude::*,
};

/// Table found in one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableObservation {
    /// Axis-aligned bounds of the table contour
    pub bounding_rect: Rect,
    /// Midpoint of the bounds
    pub center: Point,
    /// Radius estimate, `(width + height) / 4`
    pub radius: i32,
    /// Area of the table contour, whole pixels
    pub contour_area: f64,
}

/// Calibration marks drawn around the table for the operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferencePoints {
    /// Top of the table, on the vertical through the center
    pub p: Point,
    /// Lower right, 120° from P
    pub q: Point,
    /// Lower left, 240° from P
    pub r: Point,
}

impl TableObservation {
    /// Derive table geometry from its bounding rectangle
    #[must_use]
    pub fn from_rect(bounding_rect: Rect, contour_area: f64) -> Self {
        Self {
            bounding_rect,
            center: rect_center(bounding_rect),
            radius: rect_radius(bounding_rect),
            contour_area,
        }
    }

    fn half_width(&self) -> i32 {
        self.bounding_rect.width / 2
    }

    fn half_height(&self) -> i32 {
        self.bounding_rect.height / 2
    }

    /// Map a pixel position to table coordinates
    ///
    /// Offsets from the center are truncated to whole pixels, then each axis is
    /// re-mapped from `[-extent/2, extent/2]` to `[1000, 2000]`. Points off the
    /// table yield [`DetectionFailure::WrongBallPosition`].
    ///
    /// # Errors
    ///
    /// Returns an error if the point is not finite
    pub fn normalize(&self, point: Point2f) -> StageResult<NormalizedPoint> {
        let dx = f64_to_i32(f64::from(point.x) - f64::from(self.center.x))?;
        let dy = f64_to_i32(f64::from(point.y) - f64::from(self.center.y))?;

        let (hw, hh) = (self.half_width(), self.half_height());
        let mapped = remap(dx, -hw, hw, NORMALIZED_MIN, NORMALIZED_MAX)
            .zip(remap(dy, -hh, hh, NORMALIZED_MIN, NORMALIZED_MAX))
            .map(|(x, y)| NormalizedPoint::new(x, y));

        Ok(match mapped {
            Some(point) if point.is_within_table() => Ok(point),
            _ => Err(DetectionFailure::WrongBallPosition),
        })
    }

    /// Map table coordinates back to a pixel position
    #[must_use]
    pub fn to_pixel(&self, point: NormalizedPoint) -> Option<Point> {
        let (hw, hh) = (self.half_width(), self.half_height());
        let x = remap_inverse(point.x, self.center.x - hw, self.center.x + hw, NORMALIZED_MIN, NORMALIZED_MAX)?;
        let y = remap_inverse(point.y, self.center.y - hh, self.center.y + hh, NORMALIZED_MIN, NORMALIZED_MAX)?;
        Some(Point::new(x, y))
    }

    /// Operator calibration marks: P at the top, Q and R on the lower arc
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn reference_points(&self) -> ReferencePoints {
        let top = self.bounding_rect.y;
        let half_r = self.radius / 2;
        let dx = (f64::from(half_r) * 3f64.sqrt()) as i32;
        let lower_y = top + self.radius + half_r;
        ReferencePoints {
            p: Point::new(self.center.x, top),
            q: Point::new(self.center.x + dx, lower_y),
            r: Point::new(self.center.x - dx, lower_y),
        }
    }

    /// Filled disk of the table radius, pulled in from the edge by one erosion
    ///
    /// # Errors
    ///
    /// Returns an error if mask creation or drawing fails
    pub fn disk_mask(&self, rows: i32, cols: i32, kernel: &Mat) -> Result<Mat> {
        let mut disk = Mat::zeros(rows, cols, CV_8UC1)?.to_mat()?;
        imgproc::circle(
            &mut disk,
            self.center,
            self.radius,
            Scalar::all(255.0),
            -1,
            imgproc::LINE_8,
            0,
        )?;
        erode(&disk, kernel)
    }

    /// Restrict a ball mask to the inner table disk
    ///
    /// # Errors
    ///
    /// Returns an error if masking fails
    pub fn gate(&self, ball_mask: &Mat, kernel: &Mat) -> Result<Mat> {
        let disk = self.disk_mask(ball_mask.rows(), ball_mask.cols(), kernel)?;
        let mut gated = Mat::default();
        core::bitwise_and(ball_mask, &disk, &mut gated, &core::no_array())?;
        Ok(gated)
    }
}

/// External contours of a binary mask
///
/// # Errors
///
/// Returns an error if contour extraction fails
pub fn external_contours(mask: &Mat) -> Result<Vector<Vector<Point>>> {
    let mut contours: Vector<Vector<Point>> = Vector::new();
    imgproc::find_contours(
        mask,
        &mut contours,
        imgproc::RETR_EXTERNAL,
        imgproc::CHAIN_APPROX_SIMPLE,
        Point::new(0, 0),
    )?;
    Ok(contours)
}

/// Contour area truncated to whole pixels
///
/// # Errors
///
/// Returns an error if the area computation fails
pub fn whole_area(contour: &Vector<Point>) -> Result<f64> {
    Ok(imgproc::contour_area(contour, false)?.trunc())
}

/// Locate the table as the largest contour in the table mask
///
/// The first contour wins ties. Areas at or below `min_area` yield
/// [`DetectionFailure::TableTooSmall`].
///
/// # Errors
///
/// Returns an error if contour analysis fails
pub fn detect_table(mask: &Mat, min_area: f64) -> StageResult<TableObservation> {
    let contours = external_contours(mask)?;
    if contours.is_empty() {
        return Ok(Err(DetectionFailure::TableNotFound));
    }

    let mut best: Option<(usize, f64)> = None;
    for (index, contour) in contours.iter().enumerate() {
        let area = whole_area(&contour)?;
        if area > best.map_or(0.0, |(_, best_area)| best_area) {
            best = Some((index, area));
        }
    }

    let (index, area) = match best {
        Some(found) if found.1 > min_area => found,
        _ => return Ok(Err(DetectionFailure::TableTooSmall)),
    };

    let bounding_rect = imgproc::bounding_rect(&contours.get(index)?)?;
    Ok(Ok(TableObservation::from_rect(bounding_rect, area)))
}
