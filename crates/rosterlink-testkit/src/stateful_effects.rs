//! Stateful mock effect handlers
//!
//! These handlers keep shared state behind `Arc<RwLock<_>>` or atomics so a
//! clone handed to the service and a clone kept by the test observe the same
//! data.

use async_lock::RwLock;
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use rosterlink_core::effects::{
    PhysicalTimeEffects, RecordSourceEffects, RecordSourceError, StorageEffects, StorageError,
    TransportEffects, TransportError,
};
use rosterlink_core::{Record, RecordId, RecordSummary, RequesterId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::Arc;

/// Memory storage handler for testing
#[derive(Debug, Clone, Default)]
pub struct MemoryStorageHandler {
    data: Arc<RwLock<HashMap<String, Vec<u8>>>>,
    fail_writes: Arc<AtomicBool>,
    writes: Arc<AtomicUsize>,
}

impl MemoryStorageHandler {
    /// Create an empty handler
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with initial documents
    pub fn with_data(data: HashMap<String, Vec<u8>>) -> Self {
        Self {
            data: Arc::new(RwLock::new(data)),
            ..Self::default()
        }
    }

    /// Make every subsequent `store` fail (or succeed again)
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful `store` calls
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Stored document under `key`, decoded as UTF-8
    pub async fn document(&self, key: &str) -> Option<String> {
        self.data
            .read()
            .await
            .get(key)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    /// All stored documents
    pub async fn get_all_data(&self) -> HashMap<String, Vec<u8>> {
        self.data.read().await.clone()
    }
}

#[async_trait]
impl StorageEffects for MemoryStorageHandler {
    async fn store(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::WriteFailed(format!(
                "injected write failure for {key}"
            )));
        }
        self.data.write().await.insert(key.to_string(), value);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn retrieve(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.data.read().await.get(key).cloned())
    }

    async fn remove(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.data.write().await.remove(key).is_some())
    }
}

/// Record source over a fixed set of rows
#[derive(Debug, Clone, Default)]
pub struct MemoryRecordSource {
    records: Arc<RwLock<Vec<Record>>>,
    unavailable: Arc<AtomicBool>,
    fetches: Arc<AtomicUsize>,
}

impl MemoryRecordSource {
    /// Source serving `records`
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records: Arc::new(RwLock::new(records)),
            ..Self::default()
        }
    }

    /// Add a row
    pub async fn insert(&self, record: Record) {
        self.records.write().await.push(record);
    }

    /// Simulate an unreachable source
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of `fetch` calls made
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<(), RecordSourceError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(RecordSourceError::Unavailable("injected outage".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl RecordSourceEffects for MemoryRecordSource {
    async fn fetch(&self, id: &RecordId) -> Result<Option<Record>, RecordSourceError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        // Give concurrently running lookups a chance to interleave.
        tokio::task::yield_now().await;
        self.check_available()?;
        Ok(self
            .records
            .read()
            .await
            .iter()
            .find(|record| &record.id == id)
            .cloned())
    }

    async fn search(&self, terms: &[String]) -> Result<Vec<RecordSummary>, RecordSourceError> {
        self.check_available()?;
        let terms: Vec<String> = terms.iter().map(|t| t.to_lowercase()).collect();
        Ok(self
            .records
            .read()
            .await
            .iter()
            .filter(|record| {
                let name = record.name.to_lowercase();
                terms.iter().all(|term| name.contains(term.as_str()))
            })
            .map(RecordSummary::from)
            .collect())
    }
}

/// One captured outbound message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentMessage {
    /// Text message
    Text {
        /// Recipient
        to: RequesterId,
        /// Message body
        text: String,
    },
    /// File attachment
    File {
        /// Recipient
        to: RequesterId,
        /// Attachment file name
        filename: String,
        /// Caption
        caption: String,
        /// Attachment contents
        bytes: Vec<u8>,
    },
}

impl SentMessage {
    /// Recipient of the message
    pub fn recipient(&self) -> RequesterId {
        match self {
            SentMessage::Text { to, .. } | SentMessage::File { to, .. } => *to,
        }
    }
}

/// Transport that records every message instead of delivering it
#[derive(Debug, Clone, Default)]
pub struct RecordingTransport {
    sent: Arc<RwLock<Vec<SentMessage>>>,
    fail: Arc<AtomicBool>,
}

impl RecordingTransport {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent send fail (nothing is recorded while failing)
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Messages sent to `to`
    pub async fn sent_to(&self, to: RequesterId) -> Vec<SentMessage> {
        self.sent
            .read()
            .await
            .iter()
            .filter(|message| message.recipient() == to)
            .cloned()
            .collect()
    }

    fn check(&self, to: RequesterId) -> Result<(), TransportError> {
        if self.fail.load(Ordering::SeqCst) {
            Err(TransportError::DeliveryFailed {
                recipient: to,
                reason: "injected delivery failure".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl TransportEffects for RecordingTransport {
    async fn send_text(&self, to: RequesterId, text: &str) -> Result<(), TransportError> {
        self.check(to)?;
        self.sent.write().await.push(SentMessage::Text {
            to,
            text: text.to_string(),
        });
        Ok(())
    }

    async fn send_file(
        &self,
        to: RequesterId,
        bytes: Vec<u8>,
        filename: &str,
        caption: &str,
    ) -> Result<(), TransportError> {
        self.check(to)?;
        self.sent.write().await.push(SentMessage::File {
            to,
            filename: filename.to_string(),
            caption: caption.to_string(),
            bytes,
        });
        Ok(())
    }
}

/// Manually advanced wall clock, starting at 2025-07-01T00:00:00Z
#[derive(Debug, Clone)]
pub struct FixedClock {
    millis: Arc<AtomicI64>,
}

impl Default for FixedClock {
    fn default() -> Self {
        let start = Utc
            .with_ymd_and_hms(2025, 7, 1, 0, 0, 0)
            .single()
            .map_or(0, |t| t.timestamp_millis());
        Self {
            millis: Arc::new(AtomicI64::new(start)),
        }
    }
}

impl FixedClock {
    /// Clock at the default start time
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock forward
    pub fn advance(&self, by: Duration) {
        self.millis.fetch_add(by.num_milliseconds(), Ordering::SeqCst);
    }

    /// Current reading
    pub fn current(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.millis.load(Ordering::SeqCst)).unwrap_or_default()
    }
}

#[async_trait]
impl PhysicalTimeEffects for FixedClock {
    async fn now(&self) -> DateTime<Utc> {
        self.current()
    }
}
