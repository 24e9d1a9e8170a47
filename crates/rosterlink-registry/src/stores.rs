//! Registry stores and their persistence lifecycle
//!
//! The binding directory, admin registry and usage ledger live together in one
//! [`RegistryState`] behind a single read/write lock. Every mutation runs under
//! the write guard and is flushed before the guard is released; a failed flush
//! restores the pre-mutation state so nothing uncommitted stays visible.
//! Reports read a consistent snapshot under the read guard.

use crate::admin::AdminRegistry;
use crate::binding::BindingDirectory;
use crate::usage::UsageLedger;
use async_lock::RwLock;
use rosterlink_core::effects::{StateKind, StorageEffects, StorageError};
use rosterlink_core::{RegistryError, RequesterId, Result};
use serde::de::DeserializeOwned;

/// All persisted registry state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryState {
    /// Requester to record bindings
    pub bindings: BindingDirectory,
    /// Privileged identities
    pub admins: AdminRegistry,
    /// Per-record counters
    pub usage: UsageLedger,
}

impl RegistryState {
    /// Fresh state with a single bootstrap admin
    pub fn bootstrap(admin: RequesterId) -> Self {
        Self {
            bindings: BindingDirectory::new(),
            admins: AdminRegistry::bootstrap(admin),
            usage: UsageLedger::new(),
        }
    }

    fn encode(&self, kind: StateKind) -> std::result::Result<Vec<u8>, serde_json::Error> {
        match kind {
            StateKind::Bindings => serde_json::to_vec_pretty(&self.bindings),
            StateKind::Admins => serde_json::to_vec_pretty(&self.admins),
            StateKind::Usage => serde_json::to_vec_pretty(&self.usage),
        }
    }
}

/// Lock-guarded registry state
#[derive(Debug)]
pub struct RegistryStores {
    state: RwLock<RegistryState>,
}

impl RegistryStores {
    /// Wrap already-loaded state without touching storage
    pub fn from_state(state: RegistryState) -> Self {
        Self {
            state: RwLock::new(state),
        }
    }

    /// Load all three documents, defaulting any that were never written.
    ///
    /// An absent or empty admin set is seeded with `bootstrap_admin`.
    pub async fn initialize<S>(storage: &S, bootstrap_admin: RequesterId) -> Result<Self>
    where
        S: StorageEffects + ?Sized,
    {
        let bindings: BindingDirectory = load_document(storage, StateKind::Bindings)
            .await?
            .unwrap_or_default();
        let usage: UsageLedger = load_document(storage, StateKind::Usage)
            .await?
            .unwrap_or_default();
        let admins = match load_document::<_, AdminRegistry>(storage, StateKind::Admins).await? {
            Some(admins) if !admins.is_empty() => admins,
            Some(_) => {
                tracing::warn!(
                    admin = %bootstrap_admin,
                    "persisted admin set is empty, reseeding bootstrap admin"
                );
                AdminRegistry::bootstrap(bootstrap_admin)
            }
            None => AdminRegistry::bootstrap(bootstrap_admin),
        };

        tracing::info!(
            bound = bindings.len(),
            admins = admins.len(),
            tracked_records = usage.len(),
            "registry state loaded"
        );

        Ok(Self::from_state(RegistryState {
            bindings,
            admins,
            usage,
        }))
    }

    /// Run `op` against a consistent snapshot
    pub async fn read<F, T>(&self, op: F) -> T
    where
        F: FnOnce(&RegistryState) -> T,
    {
        let guard = self.state.read().await;
        op(&guard)
    }

    /// Clone of the current state
    pub async fn snapshot(&self) -> RegistryState {
        self.read(|state| state.clone()).await
    }

    /// Apply `op` under the write guard and flush the result.
    ///
    /// A no-op mutation skips the flush. On flush failure the in-memory state
    /// is rolled back and `PersistenceFailure` returned.
    pub async fn mutate<S, F, T>(&self, storage: &S, op: F) -> Result<T>
    where
        S: StorageEffects + ?Sized,
        F: FnOnce(&mut RegistryState) -> T,
    {
        let mut guard = self.state.write().await;
        let before = guard.clone();
        let out = op(&mut guard);

        if *guard == before {
            return Ok(out);
        }

        if let Err(err) = flush_state(storage, &guard).await {
            tracing::error!(error = %err, "state flush failed, rolling back mutation");
            *guard = before;
            if let Err(restore_err) = flush_state(storage, &guard).await {
                tracing::error!(
                    error = %restore_err,
                    "could not rewrite pre-mutation state after failed flush"
                );
            }
            return Err(err);
        }

        Ok(out)
    }
}

async fn flush_state<S>(storage: &S, state: &RegistryState) -> Result<()>
where
    S: StorageEffects + ?Sized,
{
    for kind in StateKind::ALL {
        let bytes = state.encode(kind)?;
        storage
            .store(kind.key(), bytes)
            .await
            .map_err(RegistryError::from)?;
    }
    Ok(())
}

async fn load_document<S, T>(storage: &S, kind: StateKind) -> Result<Option<T>>
where
    S: StorageEffects + ?Sized,
    T: DeserializeOwned,
{
    let Some(bytes) = storage.retrieve(kind.key()).await? else {
        return Ok(None);
    };
    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|e| {
            StorageError::Corrupt {
                key: kind.key().to_string(),
                reason: e.to_string(),
            }
            .into()
        })
}
