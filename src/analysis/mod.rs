// SPDX-License-Identifier: GPL-3.0-only

//! Frame analysis pipeline
//!
//! - [`semantic`]: class-id grid from the segmentation model
//! - [`projection`]: radial depth to forward distance
//! - [`aggregator`]: closest pixel per allowed class
//! - [`labels`]: class names, colors and label attributes
//! - [`analyzer`]: per-frame orchestration and throttling

pub mod aggregator;
pub mod analyzer;
pub mod labels;
pub mod projection;
pub mod semantic;

pub use aggregator::{AllowList, ClassAggregator, ClosestPoint, Pixel};
pub use analyzer::{FrameAnalysis, FrameAnalyzer, FrameInput, FrameThrottle};
pub use labels::{
    ClassTable, LabelAttribute, RgbColor, build_label_attributes, class_color, hue_to_rgb,
};
pub use projection::{Projection, project};
pub use semantic::SemanticGrid;
