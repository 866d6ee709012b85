//! Error types shared across the storage and command layers.

use thiserror::Error;

/// Failure while reading or writing a value in a key-value store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed for key `{key}`: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode task list: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Failure to turn a user-supplied identifier into exactly one task.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("no task matches '{0}'")]
    NotFound(String),
    #[error("'{query}' matches {count} tasks; use a longer id prefix")]
    Ambiguous { query: String, count: usize },
}

/// Failure to parse a deadline entered on the command line or in a form.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unrecognised deadline '{0}' (try today, tomorrow, in 3d, 2026-05-01 or 2026-05-01 17:30)")]
pub struct DeadlineError(pub String);
