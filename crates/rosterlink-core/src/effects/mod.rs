//! Core Effect Trait Definitions
//!
//! Pure trait definitions for every side effect the registry performs.
//! This module defines **what** effects can be performed; handlers define **how**.
//!
//! # Effect Classification
//!
//! - **Storage**: durable JSON documents for bindings, admins and usage
//! - **RecordSource**: read-only lookup of record rows by id or name
//! - **Transport**: best-effort delivery of text and files to a chat identity
//! - **Time**: wall-clock timestamps for last-access bookkeeping
//!
//! Production handlers live in `rosterlink-effects`; deterministic handlers for
//! tests live in `rosterlink-testkit`. Registry code is parameterized by these
//! traits so the same logic runs against either set.

pub mod records;
pub mod storage;
pub mod time;
pub mod transport;

pub use records::{RecordSourceEffects, RecordSourceError};
pub use storage::{StateKind, StorageEffects, StorageError};
pub use time::PhysicalTimeEffects;
pub use transport::{TransportEffects, TransportError};

/// Every effect the registry service needs, bundled for generic bounds.
pub trait RegistryEffects:
    StorageEffects + RecordSourceEffects + TransportEffects + PhysicalTimeEffects
{
}

impl<T> RegistryEffects for T where
    T: StorageEffects + RecordSourceEffects + TransportEffects + PhysicalTimeEffects
{
}
