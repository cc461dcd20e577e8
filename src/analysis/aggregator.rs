// SPDX-License-Identifier: GPL-3.0-only

//! Closest pixel per class
//!
//! Walks a semantic grid and its aligned depth grid once, keeping for each
//! allow-listed class the pixel with the smallest depth. Ties go to the
//! first pixel in row-major order, so repeated runs give identical output.

use super::projection::project;
use super::semantic::SemanticGrid;
use crate::camera::Intrinsics;
use crate::depth::DepthGrid;
use crate::errors::FrameError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, trace};

/// Image position of a closest point
///
/// `y` counts up from the bottom edge (`height - row`), matching the
/// bottom-up convention annotation drawing uses.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pixel {
    pub x: f32,
    pub y: f32,
}

/// Nearest pixel found for one class
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClosestPoint {
    /// Distance in meters; `+inf` when no pixel of the class had valid depth
    pub distance: f32,
    pub pixel: Pixel,
}

impl ClosestPoint {
    /// Whether the distance came from at least one valid depth sample
    pub fn is_reliable(&self) -> bool {
        self.distance.is_finite()
    }
}

/// Class ids the aggregator searches for
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AllowList(BTreeSet<i32>);

impl AllowList {
    pub fn new(ids: impl IntoIterator<Item = i32>) -> Self {
        Self(ids.into_iter().collect())
    }

    #[inline]
    pub fn contains(&self, class_id: i32) -> bool {
        self.0.contains(&class_id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = i32> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<i32> for AllowList {
    fn from_iter<I: IntoIterator<Item = i32>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// Per-class nearest-point search
#[derive(Debug, Clone)]
pub struct ClassAggregator {
    allowed: AllowList,
}

impl ClassAggregator {
    pub fn new(allowed: AllowList) -> Self {
        Self { allowed }
    }

    pub fn allowed(&self) -> &AllowList {
        &self.allowed
    }

    /// Closest raw (radial) depth per class, before projection
    ///
    /// Classes absent from the frame are absent from the result. A class
    /// whose pixels all lack valid depth is reported at `+inf`.
    pub fn scan(
        &self,
        semantic: &SemanticGrid,
        depth: &DepthGrid,
    ) -> Result<BTreeMap<i32, ClosestPoint>, FrameError> {
        if semantic.shape() != depth.shape() {
            return Err(FrameError::ShapeMismatch {
                expected: semantic.shape(),
                actual: depth.shape(),
            });
        }

        let height = semantic.height();
        let mut closest: BTreeMap<i32, ClosestPoint> = BTreeMap::new();

        for (row, ids) in semantic.rows().enumerate() {
            for (col, &class_id) in ids.iter().enumerate() {
                if !self.allowed.contains(class_id) {
                    continue;
                }
                let d = depth
                    .at(col as isize, row as isize)
                    .unwrap_or(f32::INFINITY);
                let candidate = ClosestPoint {
                    distance: d,
                    pixel: Pixel {
                        x: col as f32,
                        y: (height - row) as f32,
                    },
                };
                closest
                    .entry(class_id)
                    .and_modify(|best| {
                        if d < best.distance {
                            *best = candidate;
                        }
                    })
                    .or_insert(candidate);
            }
        }

        trace!(classes = closest.len(), "Scanned frame for allowed classes");
        Ok(closest)
    }

    /// Closest forward distance per class
    ///
    /// Runs [`scan`](Self::scan) and replaces each radial depth with its
    /// projection onto the optical axis at the recorded pixel.
    pub fn aggregate(
        &self,
        semantic: &SemanticGrid,
        depth: &DepthGrid,
        intrinsics: &Intrinsics,
    ) -> Result<BTreeMap<i32, ClosestPoint>, FrameError> {
        let mut closest = self.scan(semantic, depth)?;

        for (class_id, point) in closest.iter_mut() {
            let projected = project(point.pixel.x, point.pixel.y, intrinsics, point.distance);
            debug!(
                class_id,
                radial = point.distance,
                forward = projected.forward_distance,
                theta = projected.theta,
                "Corrected closest point"
            );
            point.distance = projected.forward_distance;
        }

        Ok(closest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> (SemanticGrid, DepthGrid) {
        #[rustfmt::skip]
        let ids = vec![
            0, 1, 1, 0,
            2, 0, 3, 3,
            0, 0, 0, 0,
            0, 0, 0, 0,
        ];
        #[rustfmt::skip]
        let depth = vec![
            9.0, 3.0, 1.5, 9.0,
            2.0, 9.0, 0.5, 0.5,
            9.0, 9.0, 9.0, 9.0,
            9.0, 9.0, 9.0, 9.0,
        ];
        (
            SemanticGrid::load(ids, 4, 4).unwrap(),
            DepthGrid::load(depth, 4, 4).unwrap(),
        )
    }

    #[test]
    fn test_scan_picks_minimum_per_class() {
        let (semantic, depth) = frame();
        let aggregator = ClassAggregator::new(AllowList::new([1, 2]));
        let closest = aggregator.scan(&semantic, &depth).unwrap();

        assert_eq!(closest.len(), 2);
        assert_eq!(closest[&1].distance, 1.5);
        assert_eq!(closest[&1].pixel, Pixel { x: 2.0, y: 4.0 });
        assert_eq!(closest[&2].distance, 2.0);
        assert_eq!(closest[&2].pixel, Pixel { x: 0.0, y: 3.0 });
        assert!(!closest.contains_key(&3));
    }

    #[test]
    fn test_ties_keep_first_in_scan_order() {
        let (semantic, depth) = frame();
        let aggregator = ClassAggregator::new(AllowList::new([3]));
        let closest = aggregator.scan(&semantic, &depth).unwrap();
        assert_eq!(closest[&3].pixel, Pixel { x: 2.0, y: 3.0 });
    }

    #[test]
    fn test_shape_mismatch() {
        let semantic = SemanticGrid::load(vec![1; 8], 4, 2).unwrap();
        let depth = DepthGrid::load(vec![1.0; 8], 2, 4).unwrap();
        let err = ClassAggregator::new(AllowList::new([1]))
            .scan(&semantic, &depth)
            .unwrap_err();
        assert_eq!(
            err,
            FrameError::ShapeMismatch {
                expected: (4, 2),
                actual: (2, 4)
            }
        );
    }

    #[test]
    fn test_all_invalid_depth_reports_infinity() {
        let semantic = SemanticGrid::load(vec![5, 5, 0, 0], 2, 2).unwrap();
        let depth = DepthGrid::load(vec![f32::NAN, f32::NAN, 1.0, 1.0], 2, 2).unwrap();
        let closest = ClassAggregator::new(AllowList::new([5]))
            .aggregate(&semantic, &depth, &Intrinsics::fallback())
            .unwrap();
        assert_eq!(closest[&5].distance, f32::INFINITY);
        assert!(!closest[&5].is_reliable());
        // First pixel of the class is kept when nothing beats +inf
        assert_eq!(closest[&5].pixel, Pixel { x: 0.0, y: 2.0 });
    }

    #[test]
    fn test_valid_depth_beats_dropout() {
        let semantic = SemanticGrid::load(vec![5, 5], 2, 1).unwrap();
        let depth = DepthGrid::load(vec![f32::NAN, 7.0], 2, 1).unwrap();
        let closest = ClassAggregator::new(AllowList::new([5]))
            .scan(&semantic, &depth)
            .unwrap();
        assert_eq!(closest[&5].distance, 7.0);
        assert_eq!(closest[&5].pixel, Pixel { x: 1.0, y: 1.0 });
    }

    #[test]
    fn test_aggregate_substitutes_forward_distance() {
        let (semantic, depth) = frame();
        // Principal point at the class 1 pixel: no correction expected there
        let k = Intrinsics::from_parameters(2.0, 2.0, 2.0, 4.0).unwrap();
        let aggregator = ClassAggregator::new(AllowList::new([1, 2]));
        let corrected = aggregator.aggregate(&semantic, &depth, &k).unwrap();

        assert_eq!(corrected[&1].distance, 1.5);
        // Class 2 at (0, 3): px = -1, py = -0.5
        let expected = 2.0 / (1.0f32 + 1.0 + 0.25).sqrt();
        assert!((corrected[&2].distance - expected).abs() < 1e-6);
        assert!(corrected[&2].distance < 2.0);
    }
}
