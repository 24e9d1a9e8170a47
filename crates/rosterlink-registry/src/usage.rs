//! Usage ledger
//!
//! Per-record counters. `count` and `last_time` track successful lookups;
//! `by` tracks every attempt per requester, accepted or rejected, and is the
//! raw signal abuse reports are built from.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use indexmap::IndexMap;
use rosterlink_core::{RecordId, RequesterId};
use serde::{de, Deserialize, Deserializer, Serialize};

/// Counters for one record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageEntry {
    /// Successful lookups, any requester
    #[serde(default)]
    pub count: u64,
    /// Time of the most recent successful lookup.
    ///
    /// Timestamps written without an offset are read as UTC.
    #[serde(default, deserialize_with = "last_time_from_str")]
    pub last_time: Option<DateTime<Utc>>,
    /// Attempts per requester
    #[serde(default)]
    pub by: IndexMap<RequesterId, u64>,
}

fn last_time_from_str<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if let Ok(at) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(Some(at.with_timezone(&Utc)));
    }
    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| Some(Utc.from_utc_datetime(&naive)))
        .map_err(|e| de::Error::custom(format!("invalid last_time {raw:?}: {e}")))
}

impl UsageEntry {
    /// Attempts made by `requester` against this record
    pub fn attempts_by(&self, requester: RequesterId) -> u64 {
        self.by.get(&requester).copied().unwrap_or(0)
    }
}

/// Record id to counters, in first-attempt order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UsageLedger {
    entries: IndexMap<RecordId, UsageEntry>,
}

impl UsageLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one attempt by `requester` against `record`
    pub fn record_attempt(&mut self, record: &RecordId, requester: RequesterId) {
        let entry = self.entries.entry(record.clone()).or_default();
        *entry.by.entry(requester).or_insert(0) += 1;
    }

    /// Count one successful lookup of `record` at `at`
    pub fn record_success(&mut self, record: &RecordId, at: DateTime<Utc>) {
        let entry = self.entries.entry(record.clone()).or_default();
        entry.count += 1;
        entry.last_time = Some(at);
    }

    /// The `n` most looked-up records, descending by count.
    ///
    /// The sort is stable, so equal counts keep ledger order.
    pub fn top(&self, n: usize) -> Vec<(RecordId, u64)> {
        let mut ranked: Vec<(RecordId, u64)> = self
            .entries
            .iter()
            .map(|(id, entry)| (id.clone(), entry.count))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(n);
        ranked
    }

    /// Sum of successful lookups over all records
    pub fn total_successful_lookups(&self) -> u64 {
        self.entries.values().map(|entry| entry.count).sum()
    }

    /// Counters for `record`
    pub fn entry(&self, record: &RecordId) -> Option<&UsageEntry> {
        self.entries.get(record)
    }

    /// Entries in ledger order
    pub fn iter(&self) -> impl Iterator<Item = (&RecordId, &UsageEntry)> {
        self.entries.iter()
    }

    /// Number of records with any activity
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop all counters
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
