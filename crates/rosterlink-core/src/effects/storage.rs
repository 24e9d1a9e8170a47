//! Storage effect interface
//!
//! Byte-oriented key/value persistence. The registry keeps three independent
//! documents, one per [`StateKind`], and rewrites each in full on flush.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Storage operation failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum StorageError {
    /// Key rejected by the handler
    #[error("Invalid key: {reason}")]
    InvalidKey {
        /// Why the key was rejected
        reason: String,
    },
    /// Read failed
    #[error("Read failed: {0}")]
    ReadFailed(String),
    /// Write failed
    #[error("Write failed: {0}")]
    WriteFailed(String),
    /// Delete failed
    #[error("Delete failed: {0}")]
    DeleteFailed(String),
    /// Stored document could not be decoded
    #[error("Corrupt document {key}: {reason}")]
    Corrupt {
        /// Document key
        key: String,
        /// Decoder message
        reason: String,
    },
}

/// The three persisted registry documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateKind {
    /// Requester id to record id map
    Bindings,
    /// Privileged requester ids
    Admins,
    /// Per-record usage counters
    Usage,
}

impl StateKind {
    /// All documents in flush order
    pub const ALL: [StateKind; 3] = [StateKind::Bindings, StateKind::Admins, StateKind::Usage];

    /// Storage key for this document
    pub fn key(self) -> &'static str {
        match self {
            StateKind::Bindings => "bindings",
            StateKind::Admins => "admins",
            StateKind::Usage => "usage",
        }
    }
}

impl fmt::Display for StateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Durable key/value storage
#[async_trait]
pub trait StorageEffects: Send + Sync {
    /// Store `value` under `key`, replacing any previous value
    async fn store(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError>;

    /// Retrieve the value under `key`, `None` when absent
    async fn retrieve(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Remove `key`; returns whether it existed
    async fn remove(&self, key: &str) -> Result<bool, StorageError>;
}
