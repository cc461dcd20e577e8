// SPDX-License-Identifier: GPL-3.0-only

//! Error types for frame analysis
//!
//! Every error here is raised where data enters the pipeline. The analysis
//! passes themselves only see validated grids, so a frame that fails
//! validation is dropped by the caller rather than recovered.

use std::fmt;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Top-level error type
#[derive(Debug, Clone, PartialEq)]
pub enum AppError {
    /// Frame validation errors (grids, intrinsics)
    Frame(FrameError),
    /// Model metadata errors
    Metadata(MetadataError),
    /// Configuration errors
    Config(String),
    /// Storage/filesystem errors
    Storage(String),
}

/// Errors raised while validating a frame's inputs
#[derive(Debug, Clone, PartialEq)]
pub enum FrameError {
    /// Paired grids have different dimensions
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },
    /// Buffer length does not equal width * height
    BufferLength {
        width: usize,
        height: usize,
        len: usize,
    },
    /// Intrinsics matrix is not a usable 3x3 pinhole matrix
    InvalidMatrix(String),
    /// No per-frame intrinsics and the fallback was not opted into
    MissingIntrinsics,
    /// Raw byte dump is not a whole number of samples
    TruncatedBuffer { bytes: usize, sample_size: usize },
}

/// Errors raised while reading model metadata
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataError {
    /// The class label blob is absent or cannot be decoded
    MissingMetadata(String),
    /// Frame sidecar JSON could not be parsed
    InvalidSidecar(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Frame(e) => write!(f, "Frame error: {}", e),
            AppError::Metadata(e) => write!(f, "Metadata error: {}", e),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Storage(msg) => write!(f, "Storage error: {}", msg),
        }
    }
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::ShapeMismatch { expected, actual } => write!(
                f,
                "Shape mismatch: expected {}x{}, got {}x{}",
                expected.0, expected.1, actual.0, actual.1
            ),
            FrameError::BufferLength { width, height, len } => write!(
                f,
                "Buffer of {} samples does not match {}x{}",
                len, width, height
            ),
            FrameError::InvalidMatrix(msg) => write!(f, "Invalid intrinsics matrix: {}", msg),
            FrameError::MissingIntrinsics => {
                write!(f, "No camera intrinsics supplied and fallback is disabled")
            }
            FrameError::TruncatedBuffer { bytes, sample_size } => write!(
                f,
                "Buffer of {} bytes is not a multiple of the {}-byte sample size",
                bytes, sample_size
            ),
        }
    }
}

impl fmt::Display for MetadataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataError::MissingMetadata(msg) => write!(f, "Missing model metadata: {}", msg),
            MetadataError::InvalidSidecar(msg) => write!(f, "Invalid frame metadata: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}
impl std::error::Error for FrameError {}
impl std::error::Error for MetadataError {}

impl From<FrameError> for AppError {
    fn from(err: FrameError) -> Self {
        AppError::Frame(err)
    }
}

impl From<MetadataError> for AppError {
    fn from(err: MetadataError) -> Self {
        AppError::Metadata(err)
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for MetadataError {
    fn from(err: serde_json::Error) -> Self {
        MetadataError::InvalidSidecar(err.to_string())
    }
}
