//! Error types for notebook tagging and anonymization

use std::path::PathBuf;
use thiserror::Error;

/// Error type for notebook and source description operations
#[derive(Error, Debug)]
pub enum NotebookError {
    /// Input file does not exist
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    /// I/O error when reading or writing a file
    #[error("I/O error on {}: {source}", path.display())]
    IoError {
        /// File being read or written
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// JSON parsing or serialization error
    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Notebook version not supported
    #[error("Unsupported notebook version: {major}.{minor}")]
    UnsupportedVersion {
        /// Major version number
        major: u32,
        /// Minor version number
        minor: u32,
    },

    /// A substitution rule could not be compiled
    #[error("Invalid substitution pattern '{pattern}': {source}")]
    InvalidPattern {
        /// Pattern as written
        pattern: String,
        /// Regex compiler error
        #[source]
        source: regex::Error,
    },
}

impl NotebookError {
    /// Wrap an I/O error, mapping "not found" to [`NotebookError::NotFound`]
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound(path)
        } else {
            Self::IoError { path, source }
        }
    }
}

/// Result type alias for notebook operations
pub type Result<T> = std::result::Result<T, NotebookError>;
