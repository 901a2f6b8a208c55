//! Error types for the Prism filtering pipeline.
//!
//! Errors are organized by concern: configuration problems surface as
//! `ConfigError`, while per-file failures inside the pipeline surface as
//! `UnitError` so that one bad file never takes down a batch.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for Prism operations.
#[derive(Error, Debug)]
pub enum PrismError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A job was submitted with no input files
    #[error("Job has no input files")]
    EmptyJob,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    /// Filter name not in the catalog
    #[error("Unknown filter: {0}")]
    UnknownFilter(String),
}

/// Per-unit failures, organized by pipeline stage.
///
/// A `UnitError` is recorded as a failure outcome on the owning job; it never
/// stops the stage thread that produced it. Cancellation is not an error and
/// has no variant here (it is reported as a flag on the job report).
#[derive(Error, Debug)]
pub enum UnitError {
    /// The input file could not be read or decoded
    #[error("Read error for {path}: {message}")]
    Read { path: PathBuf, message: String },

    /// The filter failed, including a non-zero exit from an external filter
    #[error("Process error for {path}: {message}")]
    Process { path: PathBuf, message: String },

    /// The output file could not be written
    #[error("Write error for {path}: {message}")]
    Write { path: PathBuf, message: String },
}

impl UnitError {
    /// The input path this failure is attributed to.
    pub fn path(&self) -> &PathBuf {
        match self {
            UnitError::Read { path, .. }
            | UnitError::Process { path, .. }
            | UnitError::Write { path, .. } => path,
        }
    }

    /// Short stage label used in reports ("read", "process", "write").
    pub fn stage(&self) -> &'static str {
        match self {
            UnitError::Read { .. } => "read",
            UnitError::Process { .. } => "process",
            UnitError::Write { .. } => "write",
        }
    }
}

/// Convenience type alias for Prism results.
pub type Result<T> = std::result::Result<T, PrismError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_error_stage_labels() {
        let read = UnitError::Read {
            path: PathBuf::from("/a.jpg"),
            message: "no such file".to_string(),
        };
        let process = UnitError::Process {
            path: PathBuf::from("/a.jpg"),
            message: "exit status 1".to_string(),
        };
        let write = UnitError::Write {
            path: PathBuf::from("/a.jpg"),
            message: "permission denied".to_string(),
        };

        assert_eq!(read.stage(), "read");
        assert_eq!(process.stage(), "process");
        assert_eq!(write.stage(), "write");
        assert_eq!(read.path(), &PathBuf::from("/a.jpg"));
    }

    #[test]
    fn test_unit_error_display_includes_path() {
        let err = UnitError::Read {
            path: PathBuf::from("/photos/beach.jpg"),
            message: "corrupt header".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("/photos/beach.jpg"));
        assert!(text.contains("corrupt header"));
    }
}
