//! Unified error system for rosterlink
//!
//! One error type for every registry operation. Effect-specific errors convert
//! into the two operational kinds (`PersistenceFailure`, `UpstreamUnavailable`);
//! everything else is a validation outcome reported back to the caller.

use crate::effects::{RecordSourceError, StorageError};
use crate::identifiers::IdentifierError;
use serde::{Deserialize, Serialize};

/// Registry operation error
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum RegistryError {
    /// Caller lacks the required role
    #[error("Not privileged: {message}")]
    NotPrivileged {
        /// What the caller tried to do
        message: String,
    },

    /// Malformed or missing record/identity id
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the rejected input
        message: String,
    },

    /// Record owned by a different identity, or caller owns a different record
    #[error("Conflict: {message}")]
    Conflict {
        /// Description of the conflicting binding
        message: String,
    },

    /// No record, binding or admin entry
    #[error("Not found: {message}")]
    NotFound {
        /// What was not found
        message: String,
    },

    /// Admin attempted to remove itself
    #[error("Admins cannot remove themselves")]
    SelfRemoval,

    /// Durable flush did not complete; the mutation was not committed
    #[error("Persistence failure: {message}")]
    PersistenceFailure {
        /// Underlying storage failure
        message: String,
    },

    /// Record source unreachable or its data malformed
    #[error("Upstream unavailable: {message}")]
    UpstreamUnavailable {
        /// Underlying record source failure
        message: String,
    },
}

impl RegistryError {
    /// Create a not privileged error
    pub fn not_privileged(message: impl Into<String>) -> Self {
        Self::NotPrivileged {
            message: message.into(),
        }
    }

    /// Create an invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a persistence failure
    pub fn persistence(message: impl Into<String>) -> Self {
        Self::PersistenceFailure {
            message: message.into(),
        }
    }

    /// Create an upstream unavailable error
    pub fn upstream(message: impl Into<String>) -> Self {
        Self::UpstreamUnavailable {
            message: message.into(),
        }
    }

    /// True for the kinds that fail the current request operationally
    /// rather than describing a rejected input.
    pub fn is_operational(&self) -> bool {
        matches!(
            self,
            Self::PersistenceFailure { .. } | Self::UpstreamUnavailable { .. }
        )
    }
}

/// Standard Result type for registry operations
pub type Result<T> = std::result::Result<T, RegistryError>;

impl From<StorageError> for RegistryError {
    fn from(err: StorageError) -> Self {
        Self::persistence(err.to_string())
    }
}

impl From<RecordSourceError> for RegistryError {
    fn from(err: RecordSourceError) -> Self {
        Self::upstream(err.to_string())
    }
}

impl From<IdentifierError> for RegistryError {
    fn from(err: IdentifierError) -> Self {
        Self::invalid_argument(err.to_string())
    }
}

impl From<serde_json::Error> for RegistryError {
    fn from(err: serde_json::Error) -> Self {
        Self::persistence(format!("state document could not be encoded: {err}"))
    }
}
