// SPDX-License-Identifier: GPL-3.0-only

//! Capture folder discovery and loading
//!
//! A capture folder holds, per frame stamp, a raw depth dump, a raw class-id
//! dump and an optional metadata sidecar:
//!
//! ```text
//! <stamp>_depth.f32      little-endian f32, grid-sized, stored with the
//!                        configured EXIF orientation
//! <stamp>_semantic.i32   little-endian i32, grid-sized, upright
//! <stamp>_meta.txt       JSON sidecar (see FrameMetadata)
//! ```

use crate::analysis::{FrameInput, SemanticGrid};
use crate::camera::FrameMetadata;
use crate::config::Config;
use crate::constants::capture_files::{DEPTH_SUFFIX, META_SUFFIX, SEMANTIC_SUFFIX};
use crate::depth::{DepthGrid, RotationAngle};
use crate::errors::{AppError, AppResult};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Files belonging to one captured frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureSet {
    pub stamp: String,
    pub depth: PathBuf,
    pub semantic: PathBuf,
    pub meta: Option<PathBuf>,
}

#[derive(Default)]
struct PartialSet {
    depth: Option<PathBuf>,
    semantic: Option<PathBuf>,
    meta: Option<PathBuf>,
}

/// Group a capture folder's files into frames, ordered by stamp
///
/// Stamps missing either raw buffer are skipped.
pub fn discover_captures(dir: &Path) -> AppResult<Vec<CaptureSet>> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| AppError::Storage(format!("{}: {}", dir.display(), e)))?;

    let mut partial: BTreeMap<String, PartialSet> = BTreeMap::new();
    for entry in entries.flatten() {
        let path = entry.path();
        let Some(name) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            continue;
        };

        if let Some(stamp) = name.strip_suffix(DEPTH_SUFFIX) {
            partial.entry(stamp.to_string()).or_default().depth = Some(path);
        } else if let Some(stamp) = name.strip_suffix(SEMANTIC_SUFFIX) {
            partial.entry(stamp.to_string()).or_default().semantic = Some(path);
        } else if let Some(stamp) = name.strip_suffix(META_SUFFIX) {
            partial.entry(stamp.to_string()).or_default().meta = Some(path);
        }
    }

    let mut sets = Vec::with_capacity(partial.len());
    for (stamp, files) in partial {
        match (files.depth, files.semantic) {
            (Some(depth), Some(semantic)) => sets.push(CaptureSet {
                stamp,
                depth,
                semantic,
                meta: files.meta,
            }),
            _ => debug!(stamp = %stamp, "Skipping incomplete capture"),
        }
    }

    debug!(dir = %dir.display(), count = sets.len(), "Discovered captures");
    Ok(sets)
}

/// Read one capture into analysis inputs
///
/// The depth dump is reoriented upright. A missing sidecar leaves the frame
/// without calibration; a sidecar with unusable intrinsics is an error.
pub fn load_frame(set: &CaptureSet, config: &Config) -> AppResult<FrameInput> {
    let (width, height) = config.grid_shape();

    let semantic_bytes = std::fs::read(&set.semantic)?;
    let semantic = SemanticGrid::from_le_bytes(&semantic_bytes, width, height)?;

    // Axis-swapping orientations are stored transposed
    let swapped = RotationAngle::from_exif_orientation(config.depth_exif_orientation)
        .is_some_and(|a| a.swaps_axes());
    let (stored_w, stored_h) = if swapped {
        (height, width)
    } else {
        (width, height)
    };
    let depth_bytes = std::fs::read(&set.depth)?;
    let depth = DepthGrid::from_le_bytes(&depth_bytes, stored_w, stored_h)?
        .oriented(config.depth_exif_orientation);

    let intrinsics = match &set.meta {
        Some(path) => {
            let text = std::fs::read_to_string(path)?;
            let meta = FrameMetadata::from_json(&text)?;
            Some(meta.intrinsics().inspect_err(|e| {
                warn!(stamp = %set.stamp, error = %e, "Sidecar intrinsics are unusable");
            })?)
        }
        None => None,
    };

    Ok(FrameInput {
        semantic,
        depth,
        intrinsics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FrameError;

    fn scratch_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("depthseg-storage-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_f32(path: &Path, values: &[f32]) {
        let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        std::fs::write(path, bytes).unwrap();
    }

    fn write_i32(path: &Path, values: &[i32]) {
        let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        std::fs::write(path, bytes).unwrap();
    }

    #[test]
    fn test_discover_groups_by_stamp() {
        let dir = scratch_dir();
        write_f32(&dir.join("0002_depth.f32"), &[1.0]);
        write_i32(&dir.join("0002_semantic.i32"), &[1]);
        write_f32(&dir.join("0001_depth.f32"), &[1.0]);
        write_i32(&dir.join("0001_semantic.i32"), &[1]);
        std::fs::write(dir.join("0001_meta.txt"), "{}").unwrap();
        write_f32(&dir.join("0003_depth.f32"), &[1.0]);
        std::fs::write(dir.join("notes.txt"), "ignored").unwrap();

        let sets = discover_captures(&dir).unwrap();
        assert_eq!(sets.len(), 2);
        assert_eq!(sets[0].stamp, "0001");
        assert!(sets[0].meta.is_some());
        assert_eq!(sets[1].stamp, "0002");
        assert!(sets[1].meta.is_none());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_frame_undoes_stored_rotation() {
        let dir = scratch_dir();
        // Stored upside down (EXIF 3)
        write_f32(&dir.join("a_depth.f32"), &[4.0, 3.0, 2.0, 1.0]);
        write_i32(&dir.join("a_semantic.i32"), &[0, 0, 0, 0]);
        let set = discover_captures(&dir).unwrap().remove(0);

        let config = Config {
            grid_width: 2,
            grid_height: 2,
            ..Config::default()
        };
        let frame = load_frame(&set, &config).unwrap();
        assert_eq!(frame.depth.at(0, 0), Some(1.0));
        assert_eq!(frame.depth.at(1, 1), Some(4.0));
        assert!(frame.intrinsics.is_none());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_frame_rejects_short_buffer() {
        let dir = scratch_dir();
        write_f32(&dir.join("a_depth.f32"), &[1.0, 2.0, 3.0]);
        write_i32(&dir.join("a_semantic.i32"), &[0, 0, 0, 0]);
        let set = discover_captures(&dir).unwrap().remove(0);

        let config = Config {
            grid_width: 2,
            grid_height: 2,
            ..Config::default()
        };
        assert!(matches!(load_frame(&set, &config), Err(AppError::Frame(_))));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_unusable_sidecar_intrinsics_are_an_error() {
        let dir = scratch_dir();
        write_f32(&dir.join("a_depth.f32"), &[1.0; 4]);
        write_i32(&dir.join("a_semantic.i32"), &[0; 4]);
        // Textbook K layout instead of the capture layout
        std::fs::write(
            dir.join("a_meta.txt"),
            r#"{
                "Accelerometer": { "X": 0.0, "Y": 0.0, "Z": 0.0 },
                "Location": { "Latitude": 0.0, "Longitude": 0.0 },
                "Timestamp": 0.0,
                "CameraIntrinsics": { "rows": [[2, 0, 1], [0, 2, 1], [0, 0, 1]] }
            }"#,
        )
        .unwrap();
        let set = discover_captures(&dir).unwrap().remove(0);

        let config = Config {
            grid_width: 2,
            grid_height: 2,
            allow_fallback_intrinsics: true,
            ..Config::default()
        };
        assert!(matches!(
            load_frame(&set, &config),
            Err(AppError::Frame(FrameError::InvalidMatrix(_)))
        ));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_dir_is_storage_error() {
        let dir = std::env::temp_dir().join(format!("depthseg-missing-{}", uuid::Uuid::new_v4()));
        assert!(matches!(
            discover_captures(&dir),
            Err(AppError::Storage(_))
        ));
    }
}
