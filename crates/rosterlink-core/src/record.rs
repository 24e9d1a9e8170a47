//! Record snapshots served by the record source

use crate::identifiers::RecordId;
use serde::{Deserialize, Serialize};

/// Score for a single subject column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectGrade {
    /// Column header as it appears in the source sheet
    pub subject: String,
    /// Numeric score
    pub score: f64,
}

/// Point-in-time snapshot of one record row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Record id the row is keyed by
    pub id: RecordId,
    /// Display name of the record holder
    pub name: String,
    /// Per-subject scores in column order
    pub subjects: Vec<SubjectGrade>,
    /// Total score
    pub total: f64,
    /// Percentage score
    pub percentage: f64,
}

/// Name-only projection used by search results and reports
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSummary {
    /// Record id
    pub id: RecordId,
    /// Display name
    pub name: String,
}

impl From<&Record> for RecordSummary {
    fn from(record: &Record) -> Self {
        Self {
            id: record.id.clone(),
            name: record.name.clone(),
        }
    }
}
