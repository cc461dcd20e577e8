// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for constants module

use depthseg::Intrinsics;
use depthseg::constants::{
    ANALYSIS_GRID_SIZE, DEFAULT_ALLOWED_CLASSES, DEFAULT_DEPTH_EXIF_ORIENTATION,
    PROXIMITY_ALERT_THRESHOLD_M, capture_files, fallback_intrinsics,
};
use depthseg::depth::RotationAngle;

#[test]
fn test_fallback_intrinsics_values() {
    let k = Intrinsics::fallback();
    assert_eq!(
        k.extract(),
        (
            fallback_intrinsics::FX,
            fallback_intrinsics::FY,
            fallback_intrinsics::CX,
            fallback_intrinsics::CY
        )
    );
    assert_eq!(k.extract(), (1580.0, 1580.0, 960.0, 720.0));
}

#[test]
fn test_default_depth_orientation_is_upside_down() {
    assert_eq!(
        RotationAngle::from_exif_orientation(DEFAULT_DEPTH_EXIF_ORIENTATION),
        Some(RotationAngle::Degrees180),
        "Depth maps are stored rotated 180 degrees"
    );
}

#[test]
fn test_thresholds() {
    assert_eq!(ANALYSIS_GRID_SIZE, 448);
    assert!(PROXIMITY_ALERT_THRESHOLD_M > 0.0);
}

#[test]
fn test_default_allow_list_is_non_negative() {
    assert!(
        DEFAULT_ALLOWED_CLASSES.iter().all(|&id| id >= 0),
        "Class ids index the model vocabulary"
    );
}

#[test]
fn test_capture_suffixes_are_distinct() {
    let suffixes = [
        capture_files::DEPTH_SUFFIX,
        capture_files::SEMANTIC_SUFFIX,
        capture_files::META_SUFFIX,
    ];
    for (i, a) in suffixes.iter().enumerate() {
        for b in &suffixes[i + 1..] {
            assert!(!a.ends_with(b) && !b.ends_with(a));
        }
    }
}
