// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands for frame analysis
//!
//! This module provides command-line functionality for:
//! - Analyzing a single frame from raw buffers
//! - Analyzing every capture in a folder
//! - Printing a model's class table
//! - Showing or writing the configuration

use chrono::SecondsFormat;
use depthseg::analysis::{ClassTable, FrameAnalysis, FrameAnalyzer, FrameThrottle};
use depthseg::camera::FrameMetadata;
use depthseg::config::Config;
use depthseg::errors::AppError;
use depthseg::storage::{self, CaptureSet};
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Raw buffer paths for the `analyze` command
pub struct AnalyzeArgs {
    pub depth: PathBuf,
    pub semantic: PathBuf,
    pub meta: Option<PathBuf>,
    pub labels: PathBuf,
    pub width: Option<usize>,
    pub height: Option<usize>,
    pub config: Option<PathBuf>,
    pub fallback_intrinsics: bool,
}

/// Options for the `scan` command
pub struct ScanArgs {
    pub dir: PathBuf,
    pub labels: PathBuf,
    pub config: Option<PathBuf>,
    pub fallback_intrinsics: bool,
    /// Skip captures closer together than the configured interval
    pub throttle: bool,
}

/// One line of `scan` output
#[derive(Serialize)]
struct CaptureReport<'a> {
    stamp: &'a str,
    captured_at: Option<String>,
    alert: bool,
    #[serde(flatten)]
    analysis: FrameAnalysis,
}

/// Read a class table from a labels file
///
/// Accepts either the bare `{"labels": [...]}` blob or a model's full
/// creator-defined metadata map containing it.
fn load_class_table(path: &Path) -> Result<ClassTable, AppError> {
    let text = std::fs::read_to_string(path)?;
    match ClassTable::from_labels_json(&text) {
        Ok(table) => Ok(table),
        Err(direct) => {
            let fields: HashMap<String, String> =
                serde_json::from_str(&text).map_err(|_| AppError::Metadata(direct))?;
            Ok(ClassTable::from_creator_fields(&fields)?)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Analyze one frame given its raw buffers
pub fn analyze_frame(args: AnalyzeArgs) -> CliResult {
    let mut config = Config::load(args.config.as_deref())?;
    if let Some(width) = args.width {
        config.grid_width = width;
    }
    if let Some(height) = args.height {
        config.grid_height = height;
    }
    config.allow_fallback_intrinsics |= args.fallback_intrinsics;
    config.validate()?;

    let table = Arc::new(load_class_table(&args.labels)?);
    let set = CaptureSet {
        stamp: args
            .depth
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default(),
        depth: args.depth,
        semantic: args.semantic,
        meta: args.meta,
    };
    let frame = storage::load_frame(&set, &config)?;

    let analyzer = FrameAnalyzer::new(config, table);
    let analysis = analyzer.analyze(&frame)?;

    if analysis.proximity_alert(analyzer.config().alert_threshold_m) {
        info!("Proximity alert raised");
    }
    print_json(&analysis)
}

/// Analyze every capture in a folder, one JSON object per line
pub fn scan_captures(args: ScanArgs) -> CliResult {
    let mut config = Config::load(args.config.as_deref())?;
    config.allow_fallback_intrinsics |= args.fallback_intrinsics;
    let table = Arc::new(load_class_table(&args.labels)?);
    let threshold = config.alert_threshold_m;
    let mut throttle = args
        .throttle
        .then(|| FrameThrottle::new(config.analysis_interval()));

    let sets = storage::discover_captures(&args.dir)?;
    if sets.is_empty() {
        eprintln!("No captures found in {}", args.dir.display());
        return Ok(());
    }

    let analyzer = Arc::new(FrameAnalyzer::new(config, table));

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let mut tasks = Vec::with_capacity(sets.len());
        let mut skipped = 0usize;
        for set in &sets {
            let meta = set
                .meta
                .as_deref()
                .and_then(|p| std::fs::read_to_string(p).ok())
                .and_then(|text| FrameMetadata::from_json(&text).ok());

            if let Some(throttle) = throttle.as_mut()
                && let Some(at) = meta.as_ref().and_then(FrameMetadata::since_epoch)
                && !throttle.admit(at)
            {
                debug!(stamp = %set.stamp, "Capture inside analysis interval, skipping");
                skipped += 1;
                continue;
            }

            let frame = match storage::load_frame(set, analyzer.config()) {
                Ok(frame) => frame,
                Err(e) => {
                    warn!(stamp = %set.stamp, error = %e, "Skipping unreadable capture");
                    continue;
                }
            };
            let captured_at = meta
                .as_ref()
                .and_then(FrameMetadata::captured_at)
                .map(|t| t.to_rfc3339_opts(SecondsFormat::Millis, true));
            let task = tokio::spawn(analyzer.clone().analyze_async(Arc::new(frame)));
            tasks.push((set.stamp.as_str(), captured_at, task));
        }

        let mut alerts = 0usize;
        for (stamp, captured_at, task) in tasks {
            let Some(analysis) = task.await.ok().flatten() else {
                continue;
            };
            let alert = analysis.proximity_alert(threshold);
            alerts += usize::from(alert);
            let report = CaptureReport {
                stamp,
                captured_at,
                alert,
                analysis,
            };
            println!("{}", serde_json::to_string(&report)?);
        }

        info!(captures = sets.len(), skipped, alerts, "Scan complete");
        Ok::<(), Box<dyn std::error::Error>>(())
    })
}

/// Print the named classes of a model
pub fn print_labels(labels: PathBuf) -> CliResult {
    #[derive(Serialize)]
    struct Entry<'a> {
        id: i32,
        name: &'a str,
        color: [u8; 3],
    }

    let table = load_class_table(&labels)?;
    let entries: Vec<Entry> = table
        .iter()
        .map(|(id, name)| Entry {
            id,
            name,
            color: depthseg::analysis::class_color(id, table.num_classes()).to_rgb8(),
        })
        .collect();
    print_json(&entries)
}

/// Print the effective configuration, optionally writing it out
pub fn show_config(path: Option<PathBuf>, write: bool) -> CliResult {
    let config = Config::load(path.as_deref())?;

    if write {
        let target = path
            .or_else(Config::default_path)
            .ok_or("No config directory available")?;
        config.save(&target)?;
        eprintln!("Config written: {}", target.display());
    }

    print_json(&config)
}
