//! Error types for dataset materialization and access.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building or reading a dataset store.
#[derive(Error, Debug)]
pub enum DatasetError {
    /// A store or input file does not exist
    #[error("Not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// Index outside the visible range of a store
    #[error("Index {index} out of range for dataset of length {len}")]
    Index { index: usize, len: usize },

    /// I/O error with file context
    #[error("I/O error for {}: {err}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },

    /// A store file whose header or length does not validate
    #[error("Corrupt store {}: {reason}", path.display())]
    Corrupt { path: PathBuf, reason: String },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration file that is not valid JSON for [`crate::Config`]
    #[error("Invalid configuration file {}: {err}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        err: serde_json::Error,
    },

    /// Error from the tokenizer
    #[error(transparent)]
    Tokenizer(#[from] mlmprep_core::Error),
}

impl DatasetError {
    /// Wrap an I/O error with the path it happened on. A missing file maps to
    /// [`DatasetError::NotFound`].
    pub fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        let path = path.into();
        if err.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound { path }
        } else {
            Self::Io { path, err }
        }
    }
}

/// Result type alias for dataset operations.
pub type Result<T> = std::result::Result<T, DatasetError>;
