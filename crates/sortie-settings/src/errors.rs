//! Settings error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from loading or interpreting settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The settings file exists but could not be read.
    #[error("cannot read settings file {}: {source}", path.display())]
    Read {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// The file is not JSON, or a field has the wrong type.
    #[error("malformed settings in {}: {source}", path.display())]
    Malformed {
        /// File that failed.
        path: PathBuf,
        /// Underlying JSON error.
        source: serde_json::Error,
    },
    /// The file parsed, but its root is not a JSON object.
    #[error("settings file {} must contain a JSON object", path.display())]
    NotAnObject {
        /// Offending file.
        path: PathBuf,
    },
    /// A value could not be interpreted (for example an unparseable delay).
    #[error("invalid settings value: {0}")]
    InvalidValue(String),
}

/// Result type for settings operations.
pub type Result<T> = std::result::Result<T, SettingsError>;
