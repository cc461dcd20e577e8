// SPDX-License-Identifier: GPL-3.0-only

//! Quarter-turn rotation of row-major sample buffers
//!
//! Rotations only permute samples, so every mapping here is exactly
//! invertible: 90° clockwise followed by 90° counter-clockwise (or 180°
//! twice) reproduces the original buffer bit for bit.

use serde::{Deserialize, Serialize};

/// Rotation applied to a grid, clockwise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RotationAngle {
    #[default]
    Degrees0,
    /// 90° clockwise
    Degrees90,
    Degrees180,
    /// 270° clockwise, i.e. 90° counter-clockwise
    Degrees270,
}

impl RotationAngle {
    pub const ALL: [RotationAngle; 4] = [
        RotationAngle::Degrees0,
        RotationAngle::Degrees90,
        RotationAngle::Degrees180,
        RotationAngle::Degrees270,
    ];

    /// Rotation that undoes an EXIF orientation tag
    ///
    /// Only the pure rotations are handled (1, 3, 6, 8). Mirrored
    /// orientations return `None` and the grid is left as stored.
    pub fn from_exif_orientation(orientation: u32) -> Option<Self> {
        match orientation {
            1 => Some(Self::Degrees0),
            3 => Some(Self::Degrees180),
            6 => Some(Self::Degrees90),
            8 => Some(Self::Degrees270),
            _ => None,
        }
    }

    pub fn degrees(&self) -> u32 {
        match self {
            Self::Degrees0 => 0,
            Self::Degrees90 => 90,
            Self::Degrees180 => 180,
            Self::Degrees270 => 270,
        }
    }

    /// Rotation that undoes this one
    pub fn inverse(&self) -> Self {
        match self {
            Self::Degrees0 => Self::Degrees0,
            Self::Degrees90 => Self::Degrees270,
            Self::Degrees180 => Self::Degrees180,
            Self::Degrees270 => Self::Degrees90,
        }
    }

    /// Whether width and height trade places
    pub fn swaps_axes(&self) -> bool {
        matches!(self, Self::Degrees90 | Self::Degrees270)
    }
}

/// Rotate a `width` x `height` buffer, returning the new buffer
///
/// The caller swaps its dimensions when [`RotationAngle::swaps_axes`] holds.
pub(crate) fn rotate_samples<T: Copy>(
    data: &[T],
    width: usize,
    height: usize,
    angle: RotationAngle,
) -> Vec<T> {
    debug_assert_eq!(data.len(), width * height);
    let mut rotated = data.to_vec();

    match angle {
        RotationAngle::Degrees0 => {}
        RotationAngle::Degrees180 => {
            for y in 0..height {
                for x in 0..width {
                    rotated[(height - 1 - y) * width + (width - 1 - x)] = data[y * width + x];
                }
            }
        }
        RotationAngle::Degrees90 => {
            for y in 0..height {
                for x in 0..width {
                    rotated[x * height + (height - 1 - y)] = data[y * width + x];
                }
            }
        }
        RotationAngle::Degrees270 => {
            for y in 0..height {
                for x in 0..width {
                    rotated[(width - 1 - x) * height + y] = data[y * width + x];
                }
            }
        }
    }

    rotated
}
