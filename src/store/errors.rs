//! # Store Errors
//!
//! Error types for the record store.
//!
//! Unreadable durable files and seed documents are not errors: the store
//! recovers from them during initialization. Only failures that would lose
//! a mutation, or leave memory and disk out of step, surface here.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Record store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// The in-memory collection lock was poisoned by a panicking writer
    #[error("Storage error: lock poisoned")]
    LockPoisoned,

    /// The collection could not be serialized for the durable snapshot
    #[error("Storage error: failed to serialize records: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Writing the durable snapshot failed; the mutation was not applied
    #[error("Storage error: failed to persist {}: {source}", path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A seed or durable entry could not be brought into canonical shape
    #[error("Storage error: normalization failed: {0}")]
    Normalization(String),

    /// No id is left to allocate
    #[error("Storage error: {kind} ids exhausted")]
    IdExhausted { kind: &'static str },
}

impl StoreError {
    pub(crate) fn persistence(path: impl Into<PathBuf>, source: io::Error) -> Self {
        StoreError::Persistence {
            path: path.into(),
            source,
        }
    }

    /// Store errors are never the client's fault
    pub fn status_code(&self) -> u16 {
        500
    }
}
