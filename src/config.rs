// SPDX-License-Identifier: GPL-3.0-only

//! Analysis configuration
//!
//! Stored as JSON under the user's config directory. Missing fields fall
//! back to their defaults so older files keep loading.

use crate::analysis::AllowList;
use crate::constants::{
    ANALYSIS_GRID_SIZE, ANALYSIS_INTERVAL, DEFAULT_ALLOWED_CLASSES,
    DEFAULT_DEPTH_EXIF_ORIENTATION, PROXIMITY_ALERT_THRESHOLD_M,
};
use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

const APP_DIR: &str = "depthseg";
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Class ids searched for in each frame
    pub allowed_classes: Vec<i32>,
    /// Distance (meters) below which a frame raises a proximity alert
    pub alert_threshold_m: f32,
    /// Use the reference-device intrinsics when a frame carries none
    ///
    /// Off by default: a frame without calibration is rejected.
    pub allow_fallback_intrinsics: bool,
    /// Resolution the intrinsics were calibrated at
    ///
    /// When set, intrinsics are rescaled to the analysis grid before
    /// projection. When unset, grid pixels are projected with the
    /// intrinsics as given.
    pub sensor_resolution: Option<(u32, u32)>,
    /// Analysis grid width (pixels)
    pub grid_width: usize,
    /// Analysis grid height (pixels)
    pub grid_height: usize,
    /// EXIF orientation stored depth maps were written with
    pub depth_exif_orientation: u32,
    /// Minimum spacing between analyzed frames (milliseconds)
    pub analysis_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            allowed_classes: DEFAULT_ALLOWED_CLASSES.to_vec(),
            alert_threshold_m: PROXIMITY_ALERT_THRESHOLD_M,
            allow_fallback_intrinsics: false,
            sensor_resolution: None,
            grid_width: ANALYSIS_GRID_SIZE,
            grid_height: ANALYSIS_GRID_SIZE,
            depth_exif_orientation: DEFAULT_DEPTH_EXIF_ORIENTATION,
            analysis_interval_ms: ANALYSIS_INTERVAL.as_millis() as u64,
        }
    }
}

impl Config {
    /// Default config file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Load from `path`, or from the default location
    ///
    /// A missing file yields the defaults; an unreadable or malformed one is
    /// an error.
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match Self::default_path() {
                Some(p) => p,
                None => {
                    debug!("No config directory available, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        if !path.exists() {
            debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(&path)?;
        let config = Self::from_json(&text)?;
        info!(path = %path.display(), "Loaded configuration");
        config.validate()?;
        Ok(config)
    }

    pub fn from_json(text: &str) -> AppResult<Self> {
        serde_json::from_str(text).map_err(|e| AppError::Config(e.to_string()))
    }

    /// Write to `path`, creating parent directories
    pub fn save(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let text =
            serde_json::to_string_pretty(self).map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(path, text)?;
        Ok(())
    }

    /// Reject values the pipeline cannot run with
    pub fn validate(&self) -> AppResult<()> {
        if !(self.alert_threshold_m > 0.0) {
            return Err(AppError::Config(format!(
                "alert_threshold_m must be positive, got {}",
                self.alert_threshold_m
            )));
        }
        if self.grid_width == 0 || self.grid_height == 0 {
            return Err(AppError::Config("grid dimensions must be non-zero".into()));
        }
        if let Some((w, h)) = self.sensor_resolution
            && (w == 0 || h == 0)
        {
            return Err(AppError::Config(
                "sensor_resolution dimensions must be non-zero".into(),
            ));
        }
        Ok(())
    }

    pub fn allow_list(&self) -> AllowList {
        self.allowed_classes.iter().copied().collect()
    }

    pub fn grid_shape(&self) -> (usize, usize) {
        (self.grid_width, self.grid_height)
    }

    pub fn analysis_interval(&self) -> Duration {
        Duration::from_millis(self.analysis_interval_ms)
    }
}
