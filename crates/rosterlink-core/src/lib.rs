//! # Rosterlink Core - Foundation Types and Effect Interfaces
//!
//! **Purpose**: Define the identifiers, record snapshots, error taxonomy and the
//! effect traits every other rosterlink crate is written against.
//!
//! # Architecture Constraints
//!
//! - YES Requester and record identifiers with validation
//! - YES Record snapshot types returned by the record source
//! - YES Effect trait definitions (storage, record source, transport, time)
//! - YES Service configuration types
//! - NO effect handler implementations (use `rosterlink-effects`)
//! - NO binding or usage logic (that's `rosterlink-registry`)
//! - NO mock handlers (those belong in `rosterlink-testkit`)

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Service configuration loaded from TOML
pub mod config;

/// Pure effect interfaces (no implementations)
pub mod effects;

/// Unified registry error taxonomy
pub mod errors;

/// Requester and record identifiers
pub mod identifiers;

/// Record snapshots served by the record source
pub mod record;

pub use config::{ColumnMapping, ConfigError, RosterConfig};
pub use errors::{RegistryError, Result};
pub use identifiers::{IdentifierError, RecordId, RequesterId};
pub use record::{Record, RecordSummary, SubjectGrade};
