// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "depthseg")]
#[command(about = "Closest-object distances from segmentation and LiDAR depth")]
#[command(version = env!("GIT_VERSION"))]
struct Cli {
    /// Config file (default: ~/.config/depthseg/config.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Use reference-device intrinsics for frames without calibration
    #[arg(long, global = true)]
    fallback_intrinsics: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a single frame from raw buffers
    Analyze {
        /// Raw little-endian f32 depth samples
        #[arg(long)]
        depth: PathBuf,

        /// Raw little-endian i32 class ids
        #[arg(long)]
        semantic: PathBuf,

        /// Metadata sidecar with camera intrinsics
        #[arg(long)]
        meta: Option<PathBuf>,

        /// Model label file (`{"labels": [...]}` or full model metadata)
        #[arg(short, long)]
        labels: PathBuf,

        /// Grid width (default from config)
        #[arg(long)]
        width: Option<usize>,

        /// Grid height (default from config)
        #[arg(long)]
        height: Option<usize>,
    },

    /// Analyze every capture in a folder
    Scan {
        /// Capture folder
        dir: PathBuf,

        /// Model label file
        #[arg(short, long)]
        labels: PathBuf,

        /// Skip captures taken within the configured analysis interval
        #[arg(long)]
        throttle: bool,
    },

    /// Print a model's class table
    Labels {
        /// Model label file
        labels: PathBuf,
    },

    /// Print the effective configuration
    Config {
        /// Write it to the config file
        #[arg(short, long)]
        write: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=depthseg=trace, RUST_LOG=info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            depth,
            semantic,
            meta,
            labels,
            width,
            height,
        } => cli::analyze_frame(cli::AnalyzeArgs {
            depth,
            semantic,
            meta,
            labels,
            width,
            height,
            config: cli.config,
            fallback_intrinsics: cli.fallback_intrinsics,
        }),
        Commands::Scan {
            dir,
            labels,
            throttle,
        } => cli::scan_captures(cli::ScanArgs {
            dir,
            labels,
            config: cli.config,
            fallback_intrinsics: cli.fallback_intrinsics,
            throttle,
        }),
        Commands::Labels { labels } => cli::print_labels(labels),
        Commands::Config { write } => cli::show_config(cli.config, write),
    }
}
