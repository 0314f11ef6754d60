//! Error types for the task store, storage adapter and timer wiring.

use std::io;

use thiserror::Error;

use crate::task::TaskId;

/// Failures reading or writing the persistent key/value store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed for key '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: io::Error,
    },

    #[error("could not serialise value for key '{key}': {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors surfaced by tracker operations.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// A required field was missing or malformed; nothing was changed.
    #[error("{0}")]
    Validation(String),

    #[error("task {0} not found")]
    NotFound(TaskId),

    #[error("no task at position {index} (list has {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type Result<T, E = TrackerError> = std::result::Result<T, E>;
