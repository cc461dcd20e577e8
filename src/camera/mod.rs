// SPDX-License-Identifier: GPL-3.0-only

//! Camera calibration and per-capture metadata

mod intrinsics;
mod metadata;

pub use intrinsics::Intrinsics;
pub use metadata::{Accelerometer, FrameMetadata, Location, MatrixRows};
