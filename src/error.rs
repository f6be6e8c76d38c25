//! Error types for the dirpack library
//!
//! Fatal errors are limited to configuration problems (bad root) and
//! output-side I/O. Per-file failures during the walk degrade gracefully
//! and never surface here.

use std::path::PathBuf;
use thiserror::Error;

/// Library error type
#[derive(Debug, Error)]
pub enum Error {
    #[error("path does not exist: {0}")]
    RootNotFound(PathBuf),

    #[error("path is not a directory: {0}")]
    RootNotADirectory(PathBuf),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

/// Convenience alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;
