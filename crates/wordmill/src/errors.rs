//! # Error Types

/// Errors from wordmill operations.
#[derive(Debug, thiserror::Error)]
pub enum WordmillError {
    /// Invalid configuration; surfaced before any artifact is written.
    #[error("configuration error: {0}")]
    Config(String),

    /// A required artifact file is missing.
    #[error("missing artifact: {0}")]
    MissingArtifact(String),

    /// I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// CSV layer error.
    #[error(transparent)]
    Csv(#[from] csv::Error),

    /// Parse error (count, float, etc.)
    #[error("parse error: {0}")]
    Parse(String),
}

/// Result type for wordmill operations.
pub type WMResult<T> = core::result::Result<T, WordmillError>;
