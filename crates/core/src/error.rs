//! Error types shared by every Tidemark crate
//!
//! Configuration problems are kept apart from runtime failures so callers can
//! tell "fix your settings" from "the storage backend failed".

use std::path::PathBuf;
use thiserror::Error;

/// Boxed error used to carry backend-specific failures
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level error type for Tidemark operations
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid or unsupported configuration
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Local filesystem failure
    #[error("I/O error at '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Object store failure (anything but a missing checkpoint key)
    #[error("object store {operation} failed: {source}")]
    Backend {
        operation: &'static str,
        #[source]
        source: BoxError,
    },

    /// Checkpoint record exists but could not be decoded
    #[error("malformed checkpoint at '{location}': {source}")]
    Checkpoint {
        location: String,
        #[source]
        source: serde_json::Error,
    },

    /// The async runtime driving the object store client could not start
    #[error("failed to start object store runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

impl Error {
    /// Wrap an I/O error with the path it happened on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// Wrap a backend error with the operation that produced it
    pub fn backend(operation: &'static str, source: impl Into<BoxError>) -> Self {
        Error::Backend {
            operation,
            source: source.into(),
        }
    }

    /// True for errors that stem from configuration rather than I/O
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Config(_))
    }
}

/// Configuration errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Scheme is neither local nor object store
    #[error("Unsupported scheme '{scheme}' in '{path}'")]
    UnsupportedScheme { scheme: String, path: String },

    /// Scheme is recognized but the address is unusable
    #[error("Invalid location '{path}': {reason}")]
    InvalidLocation { path: String, reason: String },

    /// Location needs a backend that was never constructed
    #[error("No backend available for '{path}'")]
    BackendUnavailable { path: String },

    /// A configuration value failed validation
    #[error("Invalid value for '{key}': {reason}")]
    Invalid { key: String, reason: String },

    /// Configuration file could not be read or parsed
    #[error("Failed to load config '{}': {reason}", path.display())]
    Parse { path: PathBuf, reason: String },
}

/// Result type for Tidemark operations
pub type Result<T> = std::result::Result<T, Error>;
