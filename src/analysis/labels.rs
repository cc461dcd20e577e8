// SPDX-License-Identifier: GPL-3.0-only

//! Class names, display colors and the per-frame label list
//!
//! The class table is parsed once when the model loads and shared
//! read-only afterwards. Label attributes are rebuilt for every frame.

use super::aggregator::ClosestPoint;
use crate::constants::{EMPTY_LABEL, MODEL_PREVIEW_PARAMS_KEY};
use crate::errors::MetadataError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info};
use uuid::Uuid;

/// Shape of the label blob embedded in model metadata
#[derive(Debug, Deserialize)]
struct ClassList {
    labels: Vec<String>,
}

/// Class id to human-readable name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassTable {
    names: BTreeMap<i32, String>,
    num_classes: usize,
}

impl ClassTable {
    /// Parse a `{"labels": [...]}` blob
    ///
    /// Slot `i` of the array names class `i`. Slots holding `"--"` are
    /// unused by the model and are left out of the table, but still count
    /// toward [`num_classes`](Self::num_classes).
    pub fn from_labels_json(json: &str) -> Result<Self, MetadataError> {
        let list: ClassList = serde_json::from_str(json)
            .map_err(|e| MetadataError::MissingMetadata(format!("label list: {}", e)))?;
        Ok(Self::from_labels(list.labels))
    }

    /// Look up the label blob in a model's creator-defined metadata
    pub fn from_creator_fields(fields: &HashMap<String, String>) -> Result<Self, MetadataError> {
        let params = fields.get(MODEL_PREVIEW_PARAMS_KEY).ok_or_else(|| {
            MetadataError::MissingMetadata(format!("no `{}` entry", MODEL_PREVIEW_PARAMS_KEY))
        })?;
        Self::from_labels_json(params)
    }

    /// Build from the raw label vocabulary
    pub fn from_labels<S: Into<String>>(labels: impl IntoIterator<Item = S>) -> Self {
        let mut names = BTreeMap::new();
        let mut num_classes = 0;
        for (id, label) in labels.into_iter().enumerate() {
            num_classes += 1;
            let label = label.into();
            if label != EMPTY_LABEL {
                names.insert(id as i32, label);
            }
        }
        info!(
            num_classes,
            named = names.len(),
            "Loaded segmentation class table"
        );
        Self { names, num_classes }
    }

    pub fn get(&self, class_id: i32) -> Option<&str> {
        self.names.get(&class_id).map(String::as_str)
    }

    /// Size of the model's vocabulary, unused slots included
    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    /// Named classes, ordered by id
    pub fn iter(&self) -> impl Iterator<Item = (i32, &str)> {
        self.names.iter().map(|(id, name)| (*id, name.as_str()))
    }
}

/// Display color with components in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RgbColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl RgbColor {
    pub fn to_rgb8(&self) -> [u8; 3] {
        [
            (self.r * 255.0).round() as u8,
            (self.g * 255.0).round() as u8,
            (self.b * 255.0).round() as u8,
        ]
    }
}

/// Fully saturated color for a hue in `[0, 1]`
///
/// Piecewise-linear six-segment wheel: red at 0, green at 1/3, blue at 2/3.
pub fn hue_to_rgb(hue: f32) -> RgbColor {
    let h6 = hue * 6.0;
    RgbColor {
        r: ((h6 - 3.0).abs() - 1.0).clamp(0.0, 1.0),
        g: (2.0 - (h6 - 2.0).abs()).clamp(0.0, 1.0),
        b: (2.0 - (h6 - 4.0).abs()).clamp(0.0, 1.0),
    }
}

/// Color assigned to a class
pub fn class_color(class_id: i32, num_classes: usize) -> RgbColor {
    if num_classes == 0 {
        return hue_to_rgb(0.0);
    }
    hue_to_rgb(class_id as f32 / num_classes as f32)
}

/// One detected class in a frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelAttribute {
    pub id: Uuid,
    pub class_id: i32,
    /// Empty when the model leaves the class unnamed
    pub name: String,
    pub color: RgbColor,
    pub closest: ClosestPoint,
}

impl LabelAttribute {
    /// Whether the class has a reliable reading closer than `threshold` meters
    pub fn is_within(&self, threshold: f32) -> bool {
        self.closest.distance.is_finite() && self.closest.distance < threshold
    }
}

/// Join aggregated closest points with names and colors
///
/// Output follows ascending class id.
pub fn build_label_attributes(
    aggregated: &BTreeMap<i32, ClosestPoint>,
    table: &ClassTable,
    num_classes: usize,
) -> Vec<LabelAttribute> {
    let labels: Vec<LabelAttribute> = aggregated
        .iter()
        .map(|(&class_id, &closest)| LabelAttribute {
            id: Uuid::new_v4(),
            class_id,
            name: table.get(class_id).unwrap_or_default().to_string(),
            color: class_color(class_id, num_classes),
            closest,
        })
        .collect();

    debug!(count = labels.len(), "Built label attributes");
    labels
}
