// error.rs — Error types for the tree model.

use thiserror::Error;

/// Errors produced by the pure tree model (no filesystem involved).
#[derive(Debug, Error)]
pub enum TreeError {
    /// A glob pattern in an include/exclude list could not be compiled.
    #[error("invalid glob pattern '{pattern}': {source}")]
    InvalidGlob {
        pattern: String,
        source: glob::PatternError,
    },

    /// The encoding name is not one of the recognized encodings.
    #[error("unknown encoding: '{0}'")]
    UnknownEncoding(String),

    /// Bytes could not be decoded with the requested encoding.
    #[error("content is not valid {encoding}: {reason}")]
    Decode {
        encoding: &'static str,
        reason: String,
    },

    /// A fixture tree could not be parsed from JSON.
    #[error("fixture JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
