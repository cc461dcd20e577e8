// SPDX-License-Identifier: GPL-3.0-only

//! Depth grid storage, orientation and lookup
//!
//! A [`DepthGrid`] owns one frame's depth samples in meters. Non-finite
//! samples stand for sensor dropout. All reads go through [`DepthGrid::at`]
//! so the bounds and dropout policy lives in one place.

mod rotation;

pub use rotation::RotationAngle;
pub(crate) use rotation::rotate_samples;

use crate::errors::FrameError;
use tracing::{debug, trace};

/// Row-major grid of depth samples
#[derive(Debug, Clone, PartialEq)]
pub struct DepthGrid {
    width: usize,
    height: usize,
    samples: Vec<f32>,
}

impl DepthGrid {
    /// Wrap a raw sample buffer
    ///
    /// Fails when `samples.len() != width * height`.
    pub fn load(samples: Vec<f32>, width: usize, height: usize) -> Result<Self, FrameError> {
        check_len(samples.len(), width, height)?;
        Ok(Self {
            width,
            height,
            samples,
        })
    }

    /// Decode a raw little-endian f32 dump
    pub fn from_le_bytes(bytes: &[u8], width: usize, height: usize) -> Result<Self, FrameError> {
        let samples = le_words(bytes)?
            .into_iter()
            .map(f32::from_bits)
            .collect();
        Self::load(samples, width, height)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// (width, height)
    pub fn shape(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Depth at pixel (x, y), if in bounds and finite
    #[inline]
    pub fn at(&self, x: isize, y: isize) -> Option<f32> {
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.width || y >= self.height {
            return None;
        }
        let depth = self.samples[y * self.width + x];
        depth.is_finite().then_some(depth)
    }

    /// New grid rotated clockwise by `angle`
    pub fn rotate(&self, angle: RotationAngle) -> DepthGrid {
        let samples = rotate_samples(&self.samples, self.width, self.height, angle);
        let (width, height) = if angle.swaps_axes() {
            (self.height, self.width)
        } else {
            (self.width, self.height)
        };
        trace!(
            degrees = angle.degrees(),
            width, height, "Rotated depth grid"
        );
        DepthGrid {
            width,
            height,
            samples,
        }
    }

    /// Undo the capture orientation recorded as an EXIF tag
    ///
    /// Unknown or mirrored orientations leave the grid as stored.
    pub fn oriented(self, exif_orientation: u32) -> DepthGrid {
        match RotationAngle::from_exif_orientation(exif_orientation) {
            Some(RotationAngle::Degrees0) => self,
            Some(angle) => self.rotate(angle),
            None => {
                debug!(
                    orientation = exif_orientation,
                    "Unhandled depth orientation, leaving grid unrotated"
                );
                self
            }
        }
    }

    /// Smallest and largest finite sample
    pub fn valid_range(&self) -> Option<(f32, f32)> {
        self.samples
            .iter()
            .copied()
            .filter(|d| d.is_finite())
            .fold(None, |acc, d| match acc {
                None => Some((d, d)),
                Some((lo, hi)) => Some((lo.min(d), hi.max(d))),
            })
    }

    /// Count of finite samples
    pub fn valid_count(&self) -> usize {
        self.samples.iter().filter(|d| d.is_finite()).count()
    }
}

/// Fails unless `len == width * height`
///
/// A product that overflows `usize` can never match.
pub(crate) fn check_len(len: usize, width: usize, height: usize) -> Result<(), FrameError> {
    match width.checked_mul(height) {
        Some(expected) if expected == len => Ok(()),
        _ => Err(FrameError::BufferLength { width, height, len }),
    }
}

/// Split a raw dump into 4-byte little-endian words
pub(crate) fn le_words(bytes: &[u8]) -> Result<Vec<u32>, FrameError> {
    if bytes.len() % 4 != 0 {
        return Err(FrameError::TruncatedBuffer {
            bytes: bytes.len(),
            sample_size: 4,
        });
    }
    let words: Vec<u32> = bytemuck::pod_collect_to_vec(bytes);
    Ok(words.into_iter().map(u32::from_le).collect())
}
