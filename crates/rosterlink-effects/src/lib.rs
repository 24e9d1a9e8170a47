//! # Rosterlink Effects - Production Effect Handlers
//!
//! Stateless single-party implementations of the effect traits from
//! `rosterlink-core`, delegating to the filesystem, the system clock and the
//! process's standard streams.
//!
//! **Layer Constraint**: NO mock handlers - those belong in `rosterlink-testkit`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Composite handler bundling every production effect
pub mod composite;

/// CSV-backed record source
pub mod records;

/// Filesystem storage
pub mod storage;

/// System clock
pub mod time;

/// Console transport
pub mod transport;

pub use composite::ProductionEffects;
pub use records::CsvRecordSource;
pub use storage::FilesystemStorageHandler;
pub use time::RealTimeHandler;
pub use transport::ConsoleTransportHandler;
