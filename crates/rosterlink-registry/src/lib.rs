//! # Rosterlink Registry - Identity Binding and Abuse Tracking
//!
//! **Purpose**: Guarantee that each record is bound to at most one chat
//! identity, count every lookup attempt, and surface identities probing records
//! they do not own.
//!
//! # Architecture Constraints
//!
//! **Depends only on rosterlink-core** (foundation).
//! - YES Binding directory with conflict detection
//! - YES Usage ledger and abuse aggregation
//! - YES Admin registry
//! - YES Lock-guarded stores with flush-or-rollback persistence
//! - YES Lookup orchestration and admin operations
//! - NO effect handler implementations (use `rosterlink-effects`)
//! - NO chat command parsing or reply formatting (that's `rosterlink-cli`)
//!
//! ## Core Concepts
//!
//! - **Binding**: exclusive (requester, record) ownership, created on the
//!   first successful lookup
//! - **Attempt**: any lookup naming a record, successful or not
//! - **Offender**: a requester whose attempts against records it does not own
//!   reach the reporting threshold

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Abuse aggregation over usage and bindings
pub mod abuse;

/// Privileged identity set
pub mod admin;

/// Exclusive requester to record bindings
pub mod binding;

/// Registry operations exposed to the front end
pub mod service;

/// Lock-guarded state and persistence lifecycle
pub mod stores;

/// Per-record usage counters
pub mod usage;

pub use abuse::{offenders, AbuseRecord, DEFAULT_OFFENDER_THRESHOLD};
pub use admin::{AddOutcome, AdminRegistry, RemoveOutcome};
pub use binding::{BindOutcome, BindingDirectory};
pub use service::{
    LookupAccess, LookupOutcome, OwnershipReport, RegistryService, RegistryStats,
    ServiceSettings, TopRecord, MISSING_NAME, STATS_TOP_N,
};
pub use stores::{RegistryState, RegistryStores};
pub use usage::{UsageEntry, UsageLedger};
