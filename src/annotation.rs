//! Debug overlay drawn on the output frame.
//!
//! Drawing never feeds back into tracking; the overlay only lets an operator
//! check what the tracker sees.

use crate::{
    constants::{CENTER_MARK_RADIUS, REFERENCE_MARK_RADIUS, SETPOINT_RADIUS, STATUS_TEXT_ORIGIN},
    error::DetectionFailure,
    segmentation::PixelFormat,
    table_detection::TableObservation,
    tracking::{NormalizedPoint, TrackedPosition},
    Result,
};
use opencv::{
    core::{Mat, Point, Scalar},
    imgproc::{self, FONT_HERSHEY_PLAIN, LINE_8},
};

/// 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Scalar in the channel order of `format`
    #[must_use]
    pub fn to_scalar(self, format: PixelFormat) -> Scalar {
        let Rgb(r, g, b) = self;
        match format {
            PixelFormat::Bgr => Scalar::new(f64::from(b), f64::from(g), f64::from(r), 0.0),
            PixelFormat::Rgba => Scalar::new(f64::from(r), f64::from(g), f64::from(b), 255.0),
        }
    }
}

/// Overlay colors resolved for one pixel format
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    table_rect: Scalar,
    table_marks: Scalar,
    table_text: Scalar,
    ball: Scalar,
    setpoint: Scalar,
    error: Scalar,
}

impl Palette {
    #[must_use]
    pub fn new(format: PixelFormat) -> Self {
        Self {
            table_rect: Rgb(0, 255, 255).to_scalar(format),
            table_marks: Rgb(255, 0, 255).to_scalar(format),
            table_text: Rgb(255, 255, 0).to_scalar(format),
            ball: Rgb(255, 255, 0).to_scalar(format),
            setpoint: Rgb(0, 255, 0).to_scalar(format),
            error: Rgb(255, 0, 0).to_scalar(format),
        }
    }
}

/// Draws overlay elements onto a frame
pub struct Annotator<'a> {
    frame: &'a mut Mat,
    palette: Palette,
}

impl<'a> Annotator<'a> {
    pub fn new(frame: &'a mut Mat, palette: Palette) -> Self {
        Self { frame, palette }
    }

    /// Table bounds, center mark and the P/Q/R reference marks
    pub fn table(&mut self, table: &TableObservation) -> Result<()> {
        imgproc::rectangle(self.frame, table.bounding_rect, self.palette.table_rect, 2, LINE_8, 0)?;
        imgproc::circle(
            self.frame,
            table.center,
            CENTER_MARK_RADIUS,
            self.palette.table_marks,
            1,
            LINE_8,
            0,
        )?;

        let marks = table.reference_points();
        imgproc::line(
            self.frame,
            marks.p,
            Point::new(marks.p.x, marks.p.y + table.radius / 4),
            self.palette.table_marks,
            1,
            LINE_8,
            0,
        )?;
        self.reference_mark(marks.p, "P")?;
        self.reference_mark(marks.q, "Q")?;
        self.reference_mark(marks.r, "R")?;
        Ok(())
    }

    fn reference_mark(&mut self, at: Point, label: &str) -> Result<()> {
        imgproc::circle(
            self.frame,
            at,
            REFERENCE_MARK_RADIUS,
            self.palette.table_marks,
            1,
            LINE_8,
            0,
        )?;
        imgproc::put_text(
            self.frame,
            label,
            Point::new(at.x - 5, at.y + 5),
            FONT_HERSHEY_PLAIN,
            1.0,
            self.palette.table_text,
            1,
            LINE_8,
            false,
        )?;
        Ok(())
    }

    /// Configured target position
    pub fn setpoint(&mut self, table: &TableObservation, setpoint: NormalizedPoint) -> Result<()> {
        if let Some(center) = table.to_pixel(setpoint) {
            imgproc::circle(self.frame, center, SETPOINT_RADIUS, self.palette.setpoint, 2, LINE_8, 0)?;
        }
        Ok(())
    }

    /// Smoothed ball position with the radius seen this frame
    pub fn ball(&mut self, table: &TableObservation, position: &TrackedPosition, radius: i32) -> Result<()> {
        if let Some(center) = table.to_pixel(position.as_point()) {
            imgproc::circle(self.frame, center, radius, self.palette.ball, 2, LINE_8, 0)?;
        }
        Ok(())
    }

    /// Status line for a frame without a ball fix
    pub fn failure(&mut self, failure: DetectionFailure) -> Result<()> {
        let (x, y) = STATUS_TEXT_ORIGIN;
        imgproc::put_text(
            self.frame,
            &failure.to_string(),
            Point::new(x, y),
            FONT_HERSHEY_PLAIN,
            2.0,
            self.palette.error,
            2,
            LINE_8,
            false,
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencv::core::{Rect, Vec3b, CV_8UC3};
    use opencv::prelude::*;

    #[test]
    fn test_rgb_channel_order() {
        let red = Rgb(255, 0, 0);
        assert_eq!(red.to_scalar(PixelFormat::Bgr), Scalar::new(0.0, 0.0, 255.0, 0.0));
        assert_eq!(red.to_scalar(PixelFormat::Rgba), Scalar::new(255.0, 0.0, 0.0, 255.0));
    }

    #[test]
    fn test_table_overlay_draws_rectangle() {
        let mut frame = Mat::zeros(200, 200, CV_8UC3).unwrap().to_mat().unwrap();
        let table = TableObservation::from_rect(Rect::new(20, 20, 160, 160), 25000.0);
        Annotator::new(&mut frame, Palette::new(PixelFormat::Bgr)).table(&table).unwrap();

        // cyan border in BGR
        let px = *frame.at_2d::<Vec3b>(20, 50).unwrap();
        assert_eq!((px[0], px[1], px[2]), (255, 255, 0));
    }

    #[test]
    fn test_failure_text_is_red() {
        let mut frame = Mat::zeros(120, 400, CV_8UC3).unwrap().to_mat().unwrap();
        Annotator::new(&mut frame, Palette::new(PixelFormat::Bgr))
            .failure(DetectionFailure::BallNotFound)
            .unwrap();

        let mut red_pixels = 0;
        for row in 0..frame.rows() {
            for col in 0..frame.cols() {
                let px = *frame.at_2d::<Vec3b>(row, col).unwrap();
                if px[2] == 255 && px[0] == 0 {
                    red_pixels += 1;
                }
            }
        }
        assert!(red_pixels > 0);
    }
}
