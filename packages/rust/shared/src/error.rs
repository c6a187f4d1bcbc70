//! Error types for the QA merger.
//!
//! Library crates use [`QaMergeError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all merge operations.
///
/// Every variant is fatal to a run. Nothing is retried internally.
#[derive(Debug, thiserror::Error)]
pub enum QaMergeError {
    /// A required input file does not exist.
    #[error("file not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// A structurally invalid row in the tabular input.
    #[error("malformed input in {} at line {line}: {message}", path.display())]
    MalformedInput {
        path: PathBuf,
        line: u64,
        message: String,
    },

    /// The existing collection is present but could not be loaded.
    #[error("failed to load collection {}: {message}", path.display())]
    Load { path: PathBuf, message: String },

    /// The output collection could not be persisted.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Records could not be serialized.
    #[error("serialization error: {0}")]
    Serialize(String),

    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Filesystem I/O error outside the categories above.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, QaMergeError>;

impl QaMergeError {
    /// Create a not-found error for `path`.
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Create a malformed-input error pointing at a line of `path`.
    pub fn malformed(path: impl Into<PathBuf>, line: u64, msg: impl Into<String>) -> Self {
        Self::MalformedInput {
            path: path.into(),
            line,
            message: msg.into(),
        }
    }

    /// Create a load error for a corrupt or unreadable collection.
    pub fn load(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        Self::Load {
            path: path.into(),
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` raised while persisting output.
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }

    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
