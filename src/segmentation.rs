//! Color segmentation of the oriented frame into table and ball masks.

use crate::{color_range::ColorRange, constants::MORPH_KERNEL_SIZE, Error, Result};
use opencv::{
    core::{self, Mat, Point, Size, Vector},
    imgproc,
    prelude::*,
};
use serde::{Deserialize, Serialize};

/// Channel layout of incoming frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PixelFormat {
    /// 3-channel BGR, as delivered by `VideoCapture`
    #[default]
    Bgr,
    /// 4-channel RGBA, as delivered by mobile camera bridges
    Rgba,
}

impl PixelFormat {
    /// Number of channels a frame in this format carries
    #[must_use]
    pub fn channels(self) -> i32 {
        match self {
            Self::Bgr => 3,
            Self::Rgba => 4,
        }
    }
}

/// Plain and hue-rotated HSV views of one frame
pub struct HsvFrames {
    /// HSV of the frame as captured
    pub normal: Mat,
    /// Hue from the color-inverted frame, saturation and value from the original
    pub hue_rotated: Mat,
}

/// Binary masks produced for one frame
pub struct Masks {
    /// Table pixels, opened to remove speckle
    pub table: Mat,
    /// Ball pixels, raw; gated to the table disk later
    pub ball: Mat,
}

/// 5x5 elliptical structuring element shared by all morphology steps
///
/// # Errors
///
/// Returns an error if `OpenCV` cannot build the kernel
pub fn morph_kernel() -> Result<Mat> {
    imgproc::get_structuring_element(
        imgproc::MORPH_ELLIPSE,
        Size::new(MORPH_KERNEL_SIZE, MORPH_KERNEL_SIZE),
        Point::new(-1, -1),
    )
    .map_err(Into::into)
}

/// Convert a frame to 3-channel BGR
///
/// # Errors
///
/// Returns an error if the frame is empty, has the wrong channel count, or conversion fails
pub fn to_bgr(frame: &Mat, format: PixelFormat) -> Result<Mat> {
    if frame.empty() {
        return Err(Error::InvalidInput("Empty frame".to_string()));
    }
    if frame.channels() != format.channels() {
        return Err(Error::InvalidInput(format!(
            "Expected {} channels for {:?} frame, got {}",
            format.channels(),
            format,
            frame.channels()
        )));
    }

    match format {
        PixelFormat::Bgr => Ok(frame.try_clone()?),
        PixelFormat::Rgba => {
            let mut bgr = Mat::default();
            imgproc::cvt_color(frame, &mut bgr, imgproc::COLOR_RGBA2BGR, 3)?;
            Ok(bgr)
        }
    }
}

/// Build the plain and hue-rotated HSV representations of a BGR frame
///
/// Inverting a color moves its hue half a turn, so a hue interval wrapping
/// through red becomes contiguous in the rotated view.
///
/// # Errors
///
/// Returns an error if any `OpenCV` conversion fails
pub fn hsv_representations(bgr: &Mat) -> Result<HsvFrames> {
    let mut inverted = Mat::default();
    core::bitwise_not(bgr, &mut inverted, &core::no_array())?;

    let mut normal = Mat::default();
    let mut inverted_hsv = Mat::default();
    imgproc::cvt_color(bgr, &mut normal, imgproc::COLOR_BGR2HSV, 0)?;
    imgproc::cvt_color(&inverted, &mut inverted_hsv, imgproc::COLOR_BGR2HSV, 0)?;

    let mut hue = Mat::default();
    let mut saturation = Mat::default();
    let mut value = Mat::default();
    core::extract_channel(&inverted_hsv, &mut hue, 0)?;
    core::extract_channel(&normal, &mut saturation, 1)?;
    core::extract_channel(&normal, &mut value, 2)?;

    let channels: Vector<Mat> = Vector::from_iter([hue, saturation, value]);
    let mut hue_rotated = Mat::default();
    core::merge(&channels, &mut hue_rotated)?;

    Ok(HsvFrames { normal, hue_rotated })
}

/// Threshold the representation a range targets
///
/// # Errors
///
/// Returns an error if `inRange` fails
pub fn threshold(frames: &HsvFrames, range: &ColorRange) -> Result<Mat> {
    let source = if range.inverted { &frames.hue_rotated } else { &frames.normal };
    let mut mask = Mat::default();
    core::in_range(source, &range.lower_scalar(), &range.upper_scalar(), &mut mask)?;
    Ok(mask)
}

/// Erode a mask once with `kernel`
///
/// # Errors
///
/// Returns an error if the morphology call fails
pub fn erode(mask: &Mat, kernel: &Mat) -> Result<Mat> {
    let mut eroded = Mat::default();
    imgproc::erode(
        mask,
        &mut eroded,
        kernel,
        Point::new(-1, -1),
        1,
        core::BORDER_CONSTANT,
        imgproc::morphology_default_border_value()?,
    )?;
    Ok(eroded)
}

/// Morphological opening: erode then dilate once with `kernel`
///
/// # Errors
///
/// Returns an error if the morphology calls fail
pub fn open_mask(mask: &Mat, kernel: &Mat) -> Result<Mat> {
    let eroded = erode(mask, kernel)?;
    let mut opened = Mat::default();
    imgproc::dilate(
        &eroded,
        &mut opened,
        kernel,
        Point::new(-1, -1),
        1,
        core::BORDER_CONSTANT,
        imgproc::morphology_default_border_value()?,
    )?;
    Ok(opened)
}

/// Produce the table and ball masks for a BGR frame
///
/// # Errors
///
/// Returns an error if any `OpenCV` operation fails
pub fn segment(bgr: &Mat, table: &ColorRange, ball: &ColorRange, kernel: &Mat) -> Result<Masks> {
    let frames = hsv_representations(bgr)?;
    let table_mask = open_mask(&threshold(&frames, table)?, kernel)?;
    let ball_mask = threshold(&frames, ball)?;
    Ok(Masks {
        table: table_mask,
        ball: ball_mask,
    })
}
