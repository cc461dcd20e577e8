// SPDX-License-Identifier: GPL-3.0-only

//! depthseg - closest-object distances from segmentation and LiDAR depth
//!
//! Fuses a per-pixel class-id map with an aligned depth map and reports, for
//! each class of interest, the nearest pixel and its distance along the
//! camera's optical axis.
//!
//! # Architecture
//!
//! - [`depth`]: depth grid storage, orientation and lookup
//! - [`camera`]: pinhole intrinsics and per-capture metadata
//! - [`analysis`]: projection, per-class aggregation and label building
//! - [`config`]: user configuration handling
//! - [`storage`]: capture folder discovery and loading
//!
//! # Example
//!
//! ```no_run
//! use depthseg::{ClassTable, Config, FrameAnalyzer, storage};
//! use std::sync::Arc;
//!
//! let config = Config::load(None)?;
//! let table = Arc::new(ClassTable::from_labels(["--", "person", "car"]));
//! let analyzer = FrameAnalyzer::new(config.clone(), table);
//!
//! for set in storage::discover_captures("captures".as_ref())? {
//!     let frame = storage::load_frame(&set, &config)?;
//!     let analysis = analyzer.analyze(&frame)?;
//!     if analysis.proximity_alert(config.alert_threshold_m) {
//!         println!("{}: object within range", set.stamp);
//!     }
//! }
//! # Ok::<(), depthseg::AppError>(())
//! ```

pub mod analysis;
pub mod camera;
pub mod config;
pub mod constants;
pub mod depth;
pub mod errors;
pub mod storage;

// Re-export commonly used types
pub use analysis::{
    AllowList, ClassAggregator, ClassTable, ClosestPoint, FrameAnalysis, FrameAnalyzer,
    FrameInput, FrameThrottle, LabelAttribute, Pixel, SemanticGrid, project,
};
pub use camera::{FrameMetadata, Intrinsics};
pub use config::Config;
pub use depth::{DepthGrid, RotationAngle};
pub use errors::{AppError, AppResult, FrameError, MetadataError};
