//! Frame orientation correction.
//!
//! Camera sensors are mounted in landscape while the host display may be rotated.
//! Every frame is brought into a fixed convention before segmentation so that
//! table geometry and the reference marks always mean the same direction.

use crate::Result;
use opencv::{core, prelude::*};
use serde::{Deserialize, Serialize};

/// Display rotation reported by the host, in the display's own terms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayRotation {
    /// Natural (portrait on phones)
    #[default]
    Rotation0,
    /// Rotated a quarter turn counter-clockwise
    Rotation90,
    /// Upside down
    Rotation180,
    /// Rotated a quarter turn clockwise
    Rotation270,
}

impl DisplayRotation {
    /// Parse a rotation in degrees
    #[must_use]
    pub fn from_degrees(degrees: i32) -> Option<Self> {
        match degrees.rem_euclid(360) {
            0 => Some(Self::Rotation0),
            90 => Some(Self::Rotation90),
            180 => Some(Self::Rotation180),
            270 => Some(Self::Rotation270),
            _ => None,
        }
    }
}

/// Which camera produces the frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraFacing {
    /// User-facing camera; its image is mirrored
    Front,
    /// World-facing camera
    #[default]
    Back,
    /// Whatever the host picks; treated as not mirrored
    Any,
}

impl CameraFacing {
    fn is_mirrored(self) -> bool {
        self == Self::Front
    }
}

/// `core::flip` codes
const FLIP_VERTICAL: i32 = 0;
const FLIP_HORIZONTAL: i32 = 1;
const FLIP_BOTH: i32 = -1;

/// Bring a raw camera frame into the fixed table orientation
///
/// # Errors
///
/// Returns an error if an `OpenCV` transform fails
pub fn orient_frame(frame: &Mat, rotation: DisplayRotation, facing: CameraFacing) -> Result<Mat> {
    let mut oriented = Mat::default();
    match rotation {
        DisplayRotation::Rotation0 => {
            let code = if facing.is_mirrored() { FLIP_VERTICAL } else { FLIP_HORIZONTAL };
            transpose_and_flip(frame, &mut oriented, code)?;
        }
        DisplayRotation::Rotation180 => {
            let code = if facing.is_mirrored() { FLIP_HORIZONTAL } else { FLIP_VERTICAL };
            transpose_and_flip(frame, &mut oriented, code)?;
        }
        DisplayRotation::Rotation270 => {
            core::flip(frame, &mut oriented, FLIP_BOTH)?;
        }
        DisplayRotation::Rotation90 => {
            oriented = frame.try_clone()?;
        }
    }
    Ok(oriented)
}

fn transpose_and_flip(frame: &Mat, dst: &mut Mat, flip_code: i32) -> Result<()> {
    let mut transposed = Mat::default();
    core::transpose(frame, &mut transposed)?;
    core::flip(&transposed, dst, flip_code)?;
    Ok(())
}
