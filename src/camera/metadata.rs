// SPDX-License-Identifier: GPL-3.0-only

//! Per-capture metadata sidecar
//!
//! Each captured frame is stored next to a `<stamp>_meta.txt` JSON file with
//! the device's motion, location, capture time and camera calibration.
//! Field names follow the files the capture app already writes.

use super::intrinsics::Intrinsics;
use crate::errors::{FrameError, MetadataError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Accelerometer reading in g
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Accelerometer {
    #[serde(rename = "X")]
    pub x: f64,
    #[serde(rename = "Y")]
    pub y: f64,
    #[serde(rename = "Z")]
    pub z: f64,
}

/// Device location (WGS84)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

/// Intrinsics as nested rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixRows {
    pub rows: Vec<Vec<f32>>,
}

/// Contents of a capture's metadata sidecar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FrameMetadata {
    pub accelerometer: Accelerometer,
    pub location: Location,
    /// Milliseconds since the Unix epoch
    pub timestamp: f64,
    pub camera_intrinsics: MatrixRows,
}

impl FrameMetadata {
    pub fn from_json(json: &str) -> Result<Self, MetadataError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Validated intrinsics for this frame
    pub fn intrinsics(&self) -> Result<Intrinsics, FrameError> {
        Intrinsics::from_rows(&self.camera_intrinsics.rows)
    }

    /// Capture time as an offset from the Unix epoch, to the millisecond
    pub fn since_epoch(&self) -> Option<Duration> {
        (self.timestamp.is_finite() && self.timestamp >= 0.0)
            .then(|| Duration::from_millis(self.timestamp as u64))
    }

    /// Capture time, if the timestamp is representable
    pub fn captured_at(&self) -> Option<DateTime<Utc>> {
        if !self.timestamp.is_finite() {
            return None;
        }
        DateTime::from_timestamp_millis(self.timestamp as i64)
    }
}
