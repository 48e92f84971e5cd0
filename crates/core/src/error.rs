//! Error types for the tokenizer library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for vocabulary induction, encoding and artifact IO.
#[derive(Error, Debug)]
pub enum Error {
    /// Degenerate or empty training corpus
    #[error("Training error: {0}")]
    Training(String),

    /// Error loading vocabulary or merges
    #[error("Load error: {0}")]
    Load(String),

    /// Error saving vocabulary or merges
    #[error("Save error: {0}")]
    Save(String),

    /// Requested artifact does not exist
    #[error("Not found: {0}")]
    NotFound(PathBuf),

    /// I/O error with file context
    #[error("I/O error for {path}: {err}")]
    Io {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Token id outside the vocabulary
    #[error("Unknown token ID: {id} (vocabulary size {len})")]
    UnknownTokenId { id: u32, len: usize },

    /// Unknown token string
    #[error("Unknown token: {0}")]
    UnknownToken(String),

    /// Invalid merge rule
    #[error("Invalid merge rule: {0}")]
    InvalidMerge(String),
}

impl Error {
    /// Wrap an I/O error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            err,
        }
    }
}

/// Result type alias for tokenizer operations.
pub type Result<T> = std::result::Result<T, Error>;
