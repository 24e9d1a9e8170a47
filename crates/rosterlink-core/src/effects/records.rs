//! Record source effect interface
//!
//! Read-only access to the tabular data file the records come from. A missing
//! row is `Ok(None)`; an unreadable or malformed source is an error.

use crate::identifiers::RecordId;
use crate::record::{Record, RecordSummary};
use async_trait::async_trait;

/// Record source failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordSourceError {
    /// Backing data could not be reached
    #[error("record source unavailable: {0}")]
    Unavailable(String),
    /// Backing data is present but malformed
    #[error("record source malformed: {0}")]
    Malformed(String),
}

/// Lookup of record rows
#[async_trait]
pub trait RecordSourceEffects: Send + Sync {
    /// Fetch the row keyed by `id`
    async fn fetch(&self, id: &RecordId) -> Result<Option<Record>, RecordSourceError>;

    /// Rows whose display name contains every term, case-insensitively
    async fn search(&self, terms: &[String]) -> Result<Vec<RecordSummary>, RecordSourceError>;
}
