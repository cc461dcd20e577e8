// SPDX-License-Identifier: GPL-3.0-only

//! Per-pixel class ids from the segmentation model

use crate::depth::{RotationAngle, check_len, le_words, rotate_samples};
use crate::errors::FrameError;
use std::collections::BTreeMap;

/// Row-major grid of class ids
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemanticGrid {
    width: usize,
    height: usize,
    ids: Vec<i32>,
}

impl SemanticGrid {
    pub fn load(ids: Vec<i32>, width: usize, height: usize) -> Result<Self, FrameError> {
        check_len(ids.len(), width, height)?;
        Ok(Self { width, height, ids })
    }

    /// Decode a raw little-endian i32 dump
    pub fn from_le_bytes(bytes: &[u8], width: usize, height: usize) -> Result<Self, FrameError> {
        let ids = le_words(bytes)?
            .into_iter()
            .map(|w| w as i32)
            .collect();
        Self::load(ids, width, height)
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

    #[inline]
    pub fn at(&self, x: usize, y: usize) -> Option<i32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.ids[y * self.width + x])
    }

    /// Rows in scan order
    pub(crate) fn rows(&self) -> impl Iterator<Item = &[i32]> {
        self.ids.chunks_exact(self.width.max(1))
    }

    /// New grid rotated clockwise by `angle`
    pub fn rotate(&self, angle: RotationAngle) -> SemanticGrid {
        let ids = rotate_samples(&self.ids, self.width, self.height, angle);
        let (width, height) = if angle.swaps_axes() {
            (self.height, self.width)
        } else {
            (self.width, self.height)
        };
        SemanticGrid { width, height, ids }
    }

    /// Pixel count of every class present in the frame
    pub fn class_histogram(&self) -> BTreeMap<i32, usize> {
        let mut counts = BTreeMap::new();
        for &id in &self.ids {
            *counts.entry(id).or_insert(0) += 1;
        }
        counts
    }
}
