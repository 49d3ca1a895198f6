//! Error types for logg

use std::path::PathBuf;

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, LogError>;

/// Main error type for logger and sink operations
#[derive(Error, Debug)]
pub enum LogError {
    /// Sink configuration was malformed or missing a required field
    #[error("Config error: {0}")]
    Config(String),

    /// Sink configuration was not valid JSON
    #[error("Config parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// No constructor registered under this name
    #[error("Unknown sink '{0}' (forgotten register_sink?)")]
    UnknownSink(String),

    /// Name already taken, either in the registry or on a logger
    #[error("Duplicate sink '{0}'")]
    DuplicateSink(String),

    /// Open, write, rename or stat failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Rotation could not complete
    #[error("Rotation of {path} failed: {reason}")]
    Rotation {
        /// Live log file being rotated
        path: PathBuf,
        /// What went wrong
        reason: String,
    },

    /// The logger has been closed and can no longer accept sinks or control calls
    #[error("Logger is closed")]
    Closed,

    /// A sink's init failed while being registered on a logger
    #[error("Sink '{name}' init error: {source}")]
    SinkInit {
        /// Label the sink was being registered under
        name: String,
        /// Underlying init failure
        #[source]
        source: Box<LogError>,
    },
}

impl LogError {
    pub(crate) fn rotation(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Rotation {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
