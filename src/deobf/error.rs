//! Errors surfaced by preset loading and saving.
//!
//! Renaming itself cannot fail; only the preset store touches the outside
//! world.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading or saving alias presets.
#[derive(Debug, Error)]
pub enum DeobfError {
    /// Reading or writing the map file failed.
    #[error("failed to access preset file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A line of the map file could not be parsed.
    #[error("malformed preset at line {line}: {reason}")]
    MalformedPreset { line: usize, reason: String },

    /// JSON (de)serialization of presets failed.
    #[cfg(feature = "serde")]
    #[error("preset JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for preset operations.
pub type DeobfResult<T> = Result<T, DeobfError>;
