//! Composite test effect handler
//!
//! Every field is a cheap clone of shared state, so tests keep a `TestEffects`
//! for assertions while the service holds another clone.

use crate::stateful_effects::{FixedClock, MemoryRecordSource, MemoryStorageHandler, RecordingTransport};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rosterlink_core::effects::{
    PhysicalTimeEffects, RecordSourceEffects, RecordSourceError, StorageEffects, StorageError,
    TransportEffects, TransportError,
};
use rosterlink_core::{Record, RecordId, RecordSummary, RequesterId};

/// Deterministic effect system for tests
#[derive(Debug, Clone, Default)]
pub struct TestEffects {
    /// Documents written by the registry
    pub storage: MemoryStorageHandler,
    /// Record rows the registry can fetch
    pub records: MemoryRecordSource,
    /// Captured outbound messages
    pub transport: RecordingTransport,
    /// Wall clock
    pub clock: FixedClock,
}

impl TestEffects {
    /// Effects serving `records` with empty storage
    pub fn with_records(records: Vec<Record>) -> Self {
        Self {
            records: MemoryRecordSource::new(records),
            ..Self::default()
        }
    }

    /// Same records and transport, storage replaced (simulates a restart
    /// against previously written documents)
    pub fn with_storage(&self, storage: MemoryStorageHandler) -> Self {
        Self {
            storage,
            ..self.clone()
        }
    }
}

#[async_trait]
impl StorageEffects for TestEffects {
    async fn store(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
        self.storage.store(key, value).await
    }

    async fn retrieve(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        self.storage.retrieve(key).await
    }

    async fn remove(&self, key: &str) -> Result<bool, StorageError> {
        self.storage.remove(key).await
    }
}

#[async_trait]
impl RecordSourceEffects for TestEffects {
    async fn fetch(&self, id: &RecordId) -> Result<Option<Record>, RecordSourceError> {
        self.records.fetch(id).await
    }

    async fn search(&self, terms: &[String]) -> Result<Vec<RecordSummary>, RecordSourceError> {
        self.records.search(terms).await
    }
}

#[async_trait]
impl TransportEffects for TestEffects {
    async fn send_text(&self, to: RequesterId, text: &str) -> Result<(), TransportError> {
        self.transport.send_text(to, text).await
    }

    async fn send_file(
        &self,
        to: RequesterId,
        bytes: Vec<u8>,
        filename: &str,
        caption: &str,
    ) -> Result<(), TransportError> {
        self.transport.send_file(to, bytes, filename, caption).await
    }
}

#[async_trait]
impl PhysicalTimeEffects for TestEffects {
    async fn now(&self) -> DateTime<Utc> {
        self.clock.now().await
    }
}
