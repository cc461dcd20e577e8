// SPDX-License-Identifier: GPL-3.0-only

//! Frame analysis task
//!
//! Runs the full pipeline for one frame: resolve intrinsics, find the
//! closest pixel per allowed class, correct it to forward distance and
//! attach names and colors. Analysis is CPU-bound, so the async entry
//! point moves it onto a blocking task.

use super::aggregator::ClassAggregator;
use super::labels::{ClassTable, LabelAttribute, build_label_attributes};
use super::semantic::SemanticGrid;
use crate::camera::Intrinsics;
use crate::config::Config;
use crate::depth::DepthGrid;
use crate::errors::{AppResult, FrameError};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{trace, warn};

/// Inputs for one analyzed frame
#[derive(Debug, Clone)]
pub struct FrameInput {
    pub semantic: SemanticGrid,
    pub depth: DepthGrid,
    /// Per-frame calibration from the capture session, if any
    pub intrinsics: Option<Intrinsics>,
}

/// Result of analyzing one frame
#[derive(Debug, Clone, Serialize)]
pub struct FrameAnalysis {
    pub labels: Vec<LabelAttribute>,
    /// Pixel count of every class present, allowed or not
    pub pixel_counts: BTreeMap<i32, usize>,
    /// Whether the reference-device intrinsics were used
    pub used_fallback_intrinsics: bool,
}

impl FrameAnalysis {
    /// Whether any label has a reliable distance under `threshold` meters
    pub fn proximity_alert(&self, threshold: f32) -> bool {
        self.labels.iter().any(|l| l.is_within(threshold))
    }

    /// Label with the smallest reliable distance
    pub fn closest(&self) -> Option<&LabelAttribute> {
        self.labels
            .iter()
            .filter(|l| l.closest.is_reliable())
            .min_by(|a, b| a.closest.distance.total_cmp(&b.closest.distance))
    }
}

/// Pipeline for analyzing frames against one model's class table
pub struct FrameAnalyzer {
    config: Config,
    aggregator: ClassAggregator,
    table: Arc<ClassTable>,
}

impl FrameAnalyzer {
    pub fn new(config: Config, table: Arc<ClassTable>) -> Self {
        let aggregator = ClassAggregator::new(config.allow_list());
        Self {
            config,
            aggregator,
            table,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn table(&self) -> &ClassTable {
        &self.table
    }

    /// Intrinsics to project with, and whether they are the fallback
    fn resolve_intrinsics(&self, frame: &FrameInput) -> Result<(Intrinsics, bool), FrameError> {
        let (intrinsics, fallback) = match frame.intrinsics {
            Some(k) => (k, false),
            None if self.config.allow_fallback_intrinsics => (Intrinsics::fallback(), true),
            None => return Err(FrameError::MissingIntrinsics),
        };

        let intrinsics = match self.config.sensor_resolution {
            Some(sensor) => {
                let (w, h) = frame.semantic.shape();
                intrinsics.rescaled(sensor, (w as u32, h as u32))
            }
            None => intrinsics,
        };
        Ok((intrinsics, fallback))
    }

    /// Analyze one frame
    pub fn analyze(&self, frame: &FrameInput) -> AppResult<FrameAnalysis> {
        let start = Instant::now();

        let (intrinsics, used_fallback_intrinsics) = self.resolve_intrinsics(frame)?;
        if used_fallback_intrinsics {
            warn!(
                fx = intrinsics.fx(),
                cx = intrinsics.cx(),
                "Frame has no intrinsics, using reference-device fallback"
            );
        }

        let closest = self
            .aggregator
            .aggregate(&frame.semantic, &frame.depth, &intrinsics)?;
        let labels = build_label_attributes(&closest, &self.table, self.table.num_classes());
        let pixel_counts = frame.semantic.class_histogram();

        trace!(
            labels = labels.len(),
            valid_depth = frame.depth.valid_count(),
            depth_range = ?frame.depth.valid_range(),
            elapsed_us = start.elapsed().as_micros() as u64,
            "Frame analyzed"
        );

        Ok(FrameAnalysis {
            labels,
            pixel_counts,
            used_fallback_intrinsics,
        })
    }

    /// Analyze on a blocking task
    ///
    /// A frame that fails validation is logged and dropped.
    pub async fn analyze_async(self: Arc<Self>, frame: Arc<FrameInput>) -> Option<FrameAnalysis> {
        let result = tokio::task::spawn_blocking(move || self.analyze(&frame)).await;
        match result {
            Ok(Ok(analysis)) => Some(analysis),
            Ok(Err(e)) => {
                warn!(error = %e, "Dropping frame that failed validation");
                None
            }
            Err(e) => {
                warn!(error = %e, "Frame analysis task panicked");
                None
            }
        }
    }
}

/// Admits at most one frame per interval
///
/// Frames are stamped by capture time, measured from any fixed origin
/// (milliseconds since the Unix epoch for stored captures).
#[derive(Debug, Clone)]
pub struct FrameThrottle {
    interval: Duration,
    last: Option<Duration>,
}

impl FrameThrottle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    /// Whether a frame captured at `at` should be analyzed
    ///
    /// Admitting a frame starts a new interval. A frame stamped before the
    /// last admitted one is refused.
    pub fn admit(&mut self, at: Duration) -> bool {
        let ready = self
            .last
            .map(|t| at.saturating_sub(t) >= self.interval)
            .unwrap_or(true);
        if ready {
            self.last = Some(at);
        }
        ready
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(intrinsics: Option<Intrinsics>) -> FrameInput {
        FrameInput {
            semantic: SemanticGrid::load(vec![1, 2, 9, 1], 2, 2).unwrap(),
            depth: DepthGrid::load(vec![4.0, 6.0, 0.1, 8.0], 2, 2).unwrap(),
            intrinsics,
        }
    }

    fn analyzer(config: Config) -> FrameAnalyzer {
        let table = ClassTable::from_labels(["--", "person", "car"]);
        FrameAnalyzer::new(
            Config {
                allowed_classes: vec![1, 2],
                ..config
            },
            Arc::new(table),
        )
    }

    fn with_fallback() -> Config {
        Config {
            allow_fallback_intrinsics: true,
            ..Config::default()
        }
    }

    #[test]
    fn test_default_config_rejects_uncalibrated_frame() {
        let analyzer = analyzer(Config::default());
        let err = analyzer.analyze(&frame(None)).unwrap_err();
        assert_eq!(err, FrameError::MissingIntrinsics.into());
    }

    #[test]
    fn test_fallback_is_reported() {
        let analysis = analyzer(with_fallback()).analyze(&frame(None)).unwrap();
        assert!(analysis.used_fallback_intrinsics);
        assert_eq!(analysis.labels.len(), 2);
        assert_eq!(analysis.pixel_counts.get(&9), Some(&1));
    }

    #[test]
    fn test_alert_and_closest() {
        let k = Intrinsics::from_parameters(1000.0, 1000.0, 1.0, 1.0).unwrap();
        let analysis = analyzer(Config::default())
            .analyze(&frame(Some(k)))
            .unwrap();
        assert!(!analysis.used_fallback_intrinsics);
        // Class 9 at 0.1 m is not allowed, so the nearest is person at ~4 m
        let closest = analysis.closest().unwrap();
        assert_eq!(closest.name, "person");
        assert!(analysis.proximity_alert(5.0));
        assert!(!analysis.proximity_alert(3.0));
    }

    #[test]
    fn test_analysis_serializes_to_json() {
        let k = Intrinsics::from_parameters(1000.0, 1000.0, 1.0, 1.0).unwrap();
        let analysis = analyzer(Config::default())
            .analyze(&frame(Some(k)))
            .unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&analysis).unwrap()).unwrap();

        let labels = json["labels"].as_array().unwrap();
        assert_eq!(labels.len(), 2);
        assert_eq!(labels[0]["class_id"], 1);
        assert_eq!(labels[0]["name"], "person");
        assert!(labels[0]["id"].as_str().is_some_and(|id| id.len() == 36));
        assert_eq!(json["pixel_counts"]["9"], 1);
        assert_eq!(json["used_fallback_intrinsics"], false);
    }

    #[test]
    fn test_throttle() {
        let mut throttle = FrameThrottle::new(Duration::from_millis(250));
        let t0 = Duration::from_millis(1_700_000_000_000);
        assert!(throttle.admit(t0));
        assert!(!throttle.admit(t0 + Duration::from_millis(100)));
        assert!(throttle.admit(t0 + Duration::from_millis(250)));
        assert!(!throttle.admit(t0 + Duration::from_millis(400)));
        assert!(!throttle.admit(t0));
        assert!(throttle.admit(t0 + Duration::from_millis(600)));
    }

    #[tokio::test]
    async fn test_analyze_async_drops_invalid_frame() {
        let analyzer = Arc::new(analyzer(with_fallback()));
        let bad = FrameInput {
            semantic: SemanticGrid::load(vec![1; 4], 4, 1).unwrap(),
            depth: DepthGrid::load(vec![1.0; 4], 2, 2).unwrap(),
            intrinsics: None,
        };
        assert!(analyzer.clone().analyze_async(Arc::new(bad)).await.is_none());
        assert!(analyzer.analyze_async(Arc::new(frame(None))).await.is_some());
    }
}
