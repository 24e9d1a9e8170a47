//! # Rosterlink Testkit
//!
//! Stateful, deterministic effect handlers and fixtures for testing the
//! registry without a filesystem, a record sheet or a chat network.
//!
//! - [`MemoryStorageHandler`]: in-memory documents with an injectable write failure
//! - [`MemoryRecordSource`]: fixed record rows with an injectable outage
//! - [`RecordingTransport`]: captures outbound messages, optionally failing
//! - [`FixedClock`]: manually advanced wall clock
//! - [`TestEffects`]: all of the above behind one handle

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Composite test effect handler
pub mod effects;

/// Record fixtures
pub mod fixtures;

/// Stateful mock handlers
pub mod stateful_effects;

pub use effects::TestEffects;
pub use fixtures::{record, record_with_scores};
pub use stateful_effects::{
    FixedClock, MemoryRecordSource, MemoryStorageHandler, RecordingTransport, SentMessage,
};
