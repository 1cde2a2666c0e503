//! Error types for typegate core.

use std::path::PathBuf;
use thiserror::Error;
use typegate_store::StoreError;

/// Core error type for gate, builder and bootstrap operations.
#[derive(Debug, Error)]
pub enum GateError {
    /// Hook payload on stdin was not the expected JSON.
    #[error("Malformed hook input: {0}")]
    Input(#[source] serde_json::Error),

    /// An enforcement mode string was not recognised.
    #[error("Unknown enforcement mode '{0}' (expected strict, warn or disabled)")]
    InvalidMode(String),

    /// Configuration file could not be used.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A file outside the stores could not be read or written.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Store error passthrough.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl GateError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GateError::Io {
            path: path.into(),
            source,
        }
    }
}
