// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

use std::time::Duration;

/// Side length of the square grid the segmentation model emits (pixels)
///
/// Depth is resized to this grid by the capture side before analysis.
pub const ANALYSIS_GRID_SIZE: usize = 448;

/// Distance below which a labelled object triggers a proximity alert (meters)
pub const PROXIMITY_ALERT_THRESHOLD_M: f32 = 5.0;

/// Minimum spacing between analyzed frames
///
/// The capture loop produces frames far faster than they need analyzing.
pub const ANALYSIS_INTERVAL: Duration = Duration::from_millis(250);

/// EXIF orientation the capture app writes depth maps with (rotated 180°)
pub const DEFAULT_DEPTH_EXIF_ORIENTATION: u32 = 3;

/// Class ids searched for by default
///
/// Tied to the label space of the bundled 150-class scene segmentation model.
/// Other models need their own list via configuration.
pub const DEFAULT_ALLOWED_CLASSES: [i32; 17] = [
    8, 7, 1, 19, 25, 22, 18, 21, 3, 6, 9, 2, 5, 23, 112, 4, 24,
];

/// Label used in model metadata for unused class slots
pub const EMPTY_LABEL: &str = "--";

/// Creator-defined metadata key holding the class label JSON
pub const MODEL_PREVIEW_PARAMS_KEY: &str = "com.apple.coreml.model.preview.params";

/// Reference-device camera intrinsics
///
/// Measured on a 1920x1440 LiDAR-equipped phone sensor. Only valid for that
/// device class; used when a frame carries no calibration of its own.
pub mod fallback_intrinsics {
    /// Focal length X (pixels) at 1920x1440
    pub const FX: f32 = 1580.0;
    /// Focal length Y (pixels) at 1920x1440
    pub const FY: f32 = 1580.0;
    /// Principal point X (pixels)
    pub const CX: f32 = 960.0;
    /// Principal point Y (pixels)
    pub const CY: f32 = 720.0;

    /// Sensor width the values were measured at
    pub const SENSOR_WIDTH: u32 = 1920;
    /// Sensor height the values were measured at
    pub const SENSOR_HEIGHT: u32 = 1440;
}

/// Capture folder naming
pub mod capture_files {
    /// Raw little-endian f32 depth samples
    pub const DEPTH_SUFFIX: &str = "_depth.f32";
    /// Raw little-endian i32 class ids
    pub const SEMANTIC_SUFFIX: &str = "_semantic.i32";
    /// JSON metadata sidecar
    pub const META_SUFFIX: &str = "_meta.txt";
}
