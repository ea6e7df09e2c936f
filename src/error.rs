/// Error types for image-rater
///
/// Defines the engine's error taxonomy using thiserror.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the rating engine
#[derive(Error, Debug)]
pub enum Error {
    /// Image could not be read at ingestion time (skipped, never fatal)
    #[error("Invalid image {}: {reason}", path.display())]
    InvalidImage { path: PathBuf, reason: String },

    /// No pair left to present. This is the normal end of the comparison
    /// phase, not something to show the user.
    #[error("No pairs available")]
    NoPairsAvailable,

    /// An outcome was submitted for a pair that is not the outstanding one
    #[error("Stale pair: expected {expected}, got {got}")]
    StalePair { expected: String, got: String },

    /// The persisted progress record cannot be used
    #[error("Corrupt progress: {0}")]
    CorruptProgress(String),

    /// An identity that is not part of the image set
    #[error("Unknown image: {0}")]
    UnknownImage(String),

    /// Configuration file loading errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Progress record could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type using the engine Error
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Shorthand used by the progress validation paths
    pub(crate) fn corrupt(msg: impl Into<String>) -> Self {
        Error::CorruptProgress(msg.into())
    }
}
