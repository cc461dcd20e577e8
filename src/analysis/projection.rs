// SPDX-License-Identifier: GPL-3.0-only

//! Radial range to forward distance
//!
//! A ranging sensor reports the straight-line distance along the viewing
//! ray. Alerting reasons about how far ahead an object is, which is the
//! component of that distance along the optical (Z) axis.

use crate::camera::Intrinsics;

/// Viewing angle and forward distance for one pixel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Horizontal angle from the optical axis in radians, positive to the right
    pub theta: f32,
    /// Distance along the optical axis
    pub forward_distance: f32,
}

/// Project a radial distance at pixel (x, y) onto the optical axis
///
/// The pixel's unnormalized ray is `(px, py, 1)` with `px = (x - cx) / fx`
/// and `py = (y - cy) / fy`; the forward distance is the radial distance
/// divided by that ray's length. Off-axis pixels therefore never report
/// more than `radial_distance`. Intrinsics must have non-zero focal
/// lengths, which [`Intrinsics`] construction guarantees.
pub fn project(x: f32, y: f32, intrinsics: &Intrinsics, radial_distance: f32) -> Projection {
    let (fx, fy, cx, cy) = intrinsics.extract();

    let dx = x - cx;
    let theta = (dx / fx).atan();

    let px = dx / fx;
    let py = (y - cy) / fy;
    let dir_length = (px * px + py * py + 1.0).sqrt();

    Projection {
        theta,
        forward_distance: radial_distance / dir_length,
    }
}
