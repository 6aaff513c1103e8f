//! Chart export error types

use std::io;
use thiserror::Error;

/// Chart export errors
#[derive(Error, Debug)]
pub enum ChartError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Chart specification is not valid JSON
    #[error("Invalid chart specification: {0}")]
    Json(#[from] serde_json::Error),

    /// Output extension other than svg or png
    #[error("Unsupported chart format '{0}': only svg and png formats are supported")]
    UnsupportedFormat(String),

    /// Scale factor that is zero, negative or not finite
    #[error("Invalid scale factor {0}: must be a positive number")]
    InvalidScale(f64),

    /// The converter executable could not be started
    #[error("Chart converter '{0}' not found; install vl-convert or set [chart] converter in .jdh.toml")]
    ConverterNotFound(String),

    /// The converter ran but failed
    #[error("Chart conversion failed: {0}")]
    ConversionFailed(String),

    /// Rendered SVG is not usable
    #[error("Invalid SVG output: {0}")]
    InvalidSvg(String),

    /// Rendered PNG is not usable
    #[error("Invalid PNG output: {0}")]
    InvalidPng(String),
}

/// Result type for chart operations
pub type Result<T> = std::result::Result<T, ChartError>;
