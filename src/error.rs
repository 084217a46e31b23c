//! Error types for the sheetlist library

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for sheetlist operations
#[derive(Debug, Error)]
pub enum SheetListError {
    /// IO error occurred during file operations
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// IO error tied to a specific path
    #[error("IO error at {path}: {source}")]
    PathIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Error parsing a drawing file
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid file format
    #[error("Invalid file format: {0}")]
    InvalidFormat(String),

    /// Drawing format the attribute reader cannot open
    #[error("Unsupported drawing format: {0}")]
    UnsupportedFormat(String),

    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// The plot driver failed to produce a PDF
    #[error("Plot error: {0}")]
    Plot(String),

    /// PDF merge failure
    #[error("PDF error: {0}")]
    Pdf(String),

    /// CSV serialization failure
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Generic error with custom message
    #[error("{0}")]
    Custom(String),
}

impl SheetListError {
    /// Attach a path to an IO error.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        SheetListError::PathIo {
            path: path.into(),
            source,
        }
    }

    /// Build a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        SheetListError::Config(message.into())
    }
}

/// Result type alias for sheetlist operations
pub type Result<T> = std::result::Result<T, SheetListError>;

impl From<String> for SheetListError {
    fn from(s: String) -> Self {
        SheetListError::Custom(s)
    }
}

impl From<&str> for SheetListError {
    fn from(s: &str) -> Self {
        SheetListError::Custom(s.to_string())
    }
}

impl From<lopdf::Error> for SheetListError {
    fn from(e: lopdf::Error) -> Self {
        SheetListError::Pdf(e.to_string())
    }
}
