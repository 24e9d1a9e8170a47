//! Composite production effect handler
//!
//! Bundles one handler per effect and implements every trait by delegation,
//! so the registry can be written against a single `E: RegistryEffects`.

use crate::records::CsvRecordSource;
use crate::storage::FilesystemStorageHandler;
use crate::time::RealTimeHandler;
use crate::transport::ConsoleTransportHandler;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rosterlink_core::effects::{
    PhysicalTimeEffects, RecordSourceEffects, RecordSourceError, StorageEffects, StorageError,
    TransportEffects, TransportError,
};
use rosterlink_core::{Record, RecordId, RecordSummary, RequesterId, RosterConfig};

/// Production effect system
#[derive(Debug, Clone)]
pub struct ProductionEffects {
    storage: FilesystemStorageHandler,
    records: CsvRecordSource,
    transport: ConsoleTransportHandler,
    time: RealTimeHandler,
}

impl ProductionEffects {
    /// Build every handler from the service configuration
    pub fn from_config(config: &RosterConfig) -> Self {
        Self {
            storage: FilesystemStorageHandler::new(config.state_dir.clone()),
            records: CsvRecordSource::new(config.records_path.clone(), config.columns.clone()),
            transport: ConsoleTransportHandler::new(config.outbox_dir.clone()),
            time: RealTimeHandler::new(),
        }
    }
}

#[async_trait]
impl StorageEffects for ProductionEffects {
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
impl RecordSourceEffects for ProductionEffects {
    async fn fetch(&self, id: &RecordId) -> Result<Option<Record>, RecordSourceError> {
        self.records.fetch(id).await
    }

    async fn search(&self, terms: &[String]) -> Result<Vec<RecordSummary>, RecordSourceError> {
        self.records.search(terms).await
    }
}

#[async_trait]
impl TransportEffects for ProductionEffects {
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
impl PhysicalTimeEffects for ProductionEffects {
    async fn now(&self) -> DateTime<Utc> {
        self.time.now().await
    }
}
