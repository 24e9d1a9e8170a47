//! Registry service - every operation the conversational front end exposes
//!
//! The service owns the lock-guarded stores and an effect handle. Lookups run
//! in three phases so the record source is never queried while the write
//! guard is held:
//!
//! 1. record the attempt and run the non-mutating conflict check (flushed)
//! 2. fetch the record with no guard held
//! 3. authoritative `try_bind` plus `record_success` under the guard (flushed)
//!
//! A binding only ever exists for a record the source returned, and two racing
//! first lookups of the same record cannot both bind because phase 3 is
//! serialized.

use crate::abuse::{self, AbuseRecord};
use crate::admin::{AddOutcome, RemoveOutcome};
use crate::binding::BindOutcome;
use crate::stores::{RegistryState, RegistryStores};
use chrono::{DateTime, Utc};
use rosterlink_core::effects::RegistryEffects;
use rosterlink_core::{
    Record, RecordId, RecordSummary, RegistryError, RequesterId, Result, RosterConfig,
};
use std::sync::Arc;
use subtle::ConstantTimeEq;

/// Number of records listed in [`RegistryStats::top`].
pub const STATS_TOP_N: usize = 5;

/// Placeholder for a record the source no longer has.
pub const MISSING_NAME: &str = "—";

/// Tunables the service reads from configuration
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    /// Shared secret guarding `reset_all`
    pub reset_secret: String,
    /// Default minimum attempts for offender reports
    pub offender_threshold: u64,
}

impl ServiceSettings {
    /// Settings taken from the loaded configuration
    pub fn from_config(config: &RosterConfig) -> Self {
        Self {
            reset_secret: config.reset_secret.clone(),
            offender_threshold: config.offender_threshold,
        }
    }
}

/// How a successful lookup was authorized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupAccess {
    /// Admin lookup, binding rules skipped
    Privileged,
    /// First lookup; the record is now bound to the requester
    NewlyBound,
    /// Requester already owned the record
    Owner,
}

/// Terminal outcome of one lookup request
#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    /// Request carried no record id
    NoInput,
    /// Record returned to the requester
    Found {
        /// Record snapshot
        record: Record,
        /// Why the requester was allowed to see it
        access: LookupAccess,
    },
    /// No such record in the source
    Missing {
        /// Requested id
        record_id: RecordId,
        /// Whether the requester was an admin
        privileged: bool,
    },
    /// Record owned by someone else, or requester owns a different record
    Conflict {
        /// Requested id
        record_id: RecordId,
    },
}

/// One row of the most-looked-up list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopRecord {
    /// Record id
    pub record_id: RecordId,
    /// Display name, [`MISSING_NAME`] when the source has no row
    pub name: String,
    /// Successful lookups
    pub count: u64,
}

/// Aggregate numbers for the admin stats report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryStats {
    /// Identities currently bound to a record
    pub total_bound_identities: usize,
    /// Successful lookups across all records
    pub total_successful_lookups: u64,
    /// Most looked-up records
    pub top: Vec<TopRecord>,
}

/// Who holds a record, for admin follow-up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnershipReport {
    /// Record id
    pub record_id: RecordId,
    /// Bound requester
    pub owner: RequesterId,
    /// Display name, `None` when the source has no row
    pub name: Option<String>,
    /// Successful lookups of the record
    pub access_count: u64,
    /// Most recent successful lookup
    pub last_access: Option<DateTime<Utc>>,
}

/// The registry service
pub struct RegistryService<E> {
    effects: Arc<E>,
    stores: RegistryStores,
    settings: ServiceSettings,
}

impl<E> std::fmt::Debug for RegistryService<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryService")
            .field("stores", &self.stores)
            .field("offender_threshold", &self.settings.offender_threshold)
            .finish_non_exhaustive()
    }
}

impl<E> RegistryService<E>
where
    E: RegistryEffects,
{
    /// Load persisted state through `effects` and build the service
    pub async fn initialize(
        effects: Arc<E>,
        bootstrap_admin: RequesterId,
        settings: ServiceSettings,
    ) -> Result<Self> {
        let stores = RegistryStores::initialize(effects.as_ref(), bootstrap_admin).await?;
        Ok(Self::with_stores(effects, stores, settings))
    }

    /// Build the service around already-loaded stores
    pub fn with_stores(effects: Arc<E>, stores: RegistryStores, settings: ServiceSettings) -> Self {
        Self {
            effects,
            stores,
            settings,
        }
    }

    /// Effect handle the service was built with
    pub fn effects(&self) -> &Arc<E> {
        &self.effects
    }

    /// Consistent copy of the current state
    pub async fn snapshot(&self) -> RegistryState {
        self.stores.snapshot().await
    }

    /// True when `id` is an admin
    pub async fn is_privileged(&self, id: RequesterId) -> bool {
        self.stores.read(|state| state.admins.is_privileged(id)).await
    }

    /// Look up `record` on behalf of `requester`.
    ///
    /// `record` is raw chat text; `None` or blank yields `NoInput`.
    #[tracing::instrument(skip(self, requester), fields(requester = %requester))]
    pub async fn lookup(
        &self,
        requester: RequesterId,
        record: Option<&str>,
    ) -> Result<LookupOutcome> {
        let Some(raw) = record.map(str::trim).filter(|raw| !raw.is_empty()) else {
            return Ok(LookupOutcome::NoInput);
        };
        let record_id = RecordId::parse(raw)?;

        // Phase 1: every path below this point counts as an attempt.
        let (privileged, gate) = self
            .stores
            .mutate(self.effects.as_ref(), |state| {
                state.usage.record_attempt(&record_id, requester);
                let privileged = state.admins.is_privileged(requester);
                (privileged, state.bindings.check(requester, &record_id))
            })
            .await?;

        if !privileged && gate == BindOutcome::ConflictWithOtherOwner {
            tracing::warn!(record = %record_id, "lookup rejected, record bound elsewhere");
            return Ok(LookupOutcome::Conflict { record_id });
        }

        // Phase 2: no guard held while the source is queried.
        let Some(found) = self.effects.fetch(&record_id).await? else {
            tracing::info!(record = %record_id, privileged, "record not found");
            return Ok(LookupOutcome::Missing {
                record_id,
                privileged,
            });
        };

        // Phase 3
        let now = self.effects.now().await;
        let access = self
            .stores
            .mutate(self.effects.as_ref(), |state| {
                if privileged {
                    state.usage.record_success(&record_id, now);
                    return Some(LookupAccess::Privileged);
                }
                let access = match state.bindings.try_bind(requester, &record_id) {
                    BindOutcome::Bound => LookupAccess::NewlyBound,
                    BindOutcome::AlreadyBoundToSelf => LookupAccess::Owner,
                    BindOutcome::ConflictWithOtherOwner => return None,
                };
                state.usage.record_success(&record_id, now);
                Some(access)
            })
            .await?;

        match access {
            Some(access) => {
                tracing::info!(record = %record_id, ?access, "record served");
                Ok(LookupOutcome::Found {
                    record: found,
                    access,
                })
            }
            None => {
                tracing::warn!(record = %record_id, "lookup lost bind race");
                Ok(LookupOutcome::Conflict { record_id })
            }
        }
    }

    /// Record currently bound to `requester`
    pub async fn bind_status(&self, requester: RequesterId) -> Option<RecordId> {
        self.stores
            .read(|state| state.bindings.record_of(requester).cloned())
            .await
    }

    /// Release whatever `target` owns. Admin only; `target` is told best-effort.
    pub async fn unbind_by_requester(
        &self,
        actor: RequesterId,
        target: RequesterId,
    ) -> Result<RecordId> {
        self.require_admin(actor, "unbind accounts").await?;

        let released = self
            .stores
            .mutate(self.effects.as_ref(), |state| {
                state.bindings.unbind_by_requester(target)
            })
            .await?
            .ok_or_else(|| RegistryError::not_found(format!("no record bound to {target}")))?;

        tracing::info!(actor = %actor, target = %target, record = %released, "binding released");
        self.notify(
            target,
            "Your account was unlinked from its record by an administrator. \
             Send your record id again to link it.",
        )
        .await;
        Ok(released)
    }

    /// Release `record` from its owner. Admin only; the former owner is told best-effort.
    pub async fn unbind_by_record(&self, actor: RequesterId, record: &RecordId) -> Result<RequesterId> {
        self.require_admin(actor, "unbind records").await?;

        let owner = self
            .stores
            .mutate(self.effects.as_ref(), |state| {
                state.bindings.unbind_by_record(record)
            })
            .await?
            .ok_or_else(|| RegistryError::not_found(format!("record {record} is not bound")))?;

        tracing::info!(actor = %actor, owner = %owner, record = %record, "binding released");
        self.notify(
            owner,
            "Your record was unlinked from your account by an administrator. \
             Send your record id again to link it.",
        )
        .await;
        Ok(owner)
    }

    /// Grant admin to `target`. Admin only; the new admin is welcomed best-effort.
    pub async fn add_admin(&self, actor: RequesterId, target: RequesterId) -> Result<AddOutcome> {
        self.require_admin(actor, "add admins").await?;

        let outcome = self
            .stores
            .mutate(self.effects.as_ref(), |state| state.admins.add(target))
            .await?;

        if outcome == AddOutcome::Added {
            tracing::info!(actor = %actor, target = %target, "admin added");
            self.notify(
                target,
                "You have been promoted to admin. You can now look up any record, \
                 see who holds a record, unlink accounts and manage admins.",
            )
            .await;
        }
        Ok(outcome)
    }

    /// Revoke admin from `target`. Self-removal is refused before anything else
    /// is checked.
    pub async fn remove_admin(&self, actor: RequesterId, target: RequesterId) -> Result<()> {
        if actor == target {
            return Err(RegistryError::SelfRemoval);
        }
        self.require_admin(actor, "remove admins").await?;

        let outcome = self
            .stores
            .mutate(self.effects.as_ref(), |state| state.admins.remove(actor, target))
            .await?;

        match outcome {
            RemoveOutcome::Removed => {
                tracing::info!(actor = %actor, target = %target, "admin removed");
                self.notify(
                    target,
                    "You have been removed as an admin by another administrator. \
                     If you believe this is a mistake, please contact support.",
                )
                .await;
                Ok(())
            }
            RemoveOutcome::NotAdmin => Err(RegistryError::not_found(format!(
                "{target} is not an admin"
            ))),
            RemoveOutcome::CannotRemoveSelf => Err(RegistryError::SelfRemoval),
        }
    }

    /// Admins in the order they were added
    pub async fn admin_list(&self) -> Vec<RequesterId> {
        self.stores
            .read(|state| state.admins.members().collect())
            .await
    }

    /// Bound identities, total lookups and the most looked-up records. Admin only.
    pub async fn stats(&self, actor: RequesterId) -> Result<RegistryStats> {
        self.require_admin(actor, "view stats").await?;

        let (total_bound_identities, total_successful_lookups, ranked) = self
            .stores
            .read(|state| {
                (
                    state.bindings.len(),
                    state.usage.total_successful_lookups(),
                    state.usage.top(STATS_TOP_N),
                )
            })
            .await;

        let mut top = Vec::with_capacity(ranked.len());
        for (record_id, count) in ranked {
            let name = self
                .display_name(&record_id)
                .await
                .unwrap_or_else(|| MISSING_NAME.to_string());
            top.push(TopRecord {
                record_id,
                name,
                count,
            });
        }

        Ok(RegistryStats {
            total_bound_identities,
            total_successful_lookups,
            top,
        })
    }

    /// Requesters probing records they do not own. Admin only.
    ///
    /// `min_attempts` defaults to the configured threshold. Admins are not
    /// exempt: their lookups count as attempts and never bind, so an admin
    /// who looks up enough records is listed like anyone else.
    pub async fn offenders(
        &self,
        actor: RequesterId,
        min_attempts: Option<u64>,
    ) -> Result<Vec<AbuseRecord>> {
        self.require_admin(actor, "view offenders").await?;
        let threshold = min_attempts.unwrap_or(self.settings.offender_threshold);
        Ok(self
            .stores
            .read(|state| abuse::offenders(&state.usage, &state.bindings, threshold))
            .await)
    }

    /// Owner and usage of `record`. Admin only.
    pub async fn who_owns(&self, actor: RequesterId, record: &RecordId) -> Result<OwnershipReport> {
        self.require_admin(actor, "see record owners").await?;

        let (owner, access_count, last_access) = self
            .stores
            .read(|state| {
                let entry = state.usage.entry(record);
                (
                    state.bindings.owner_of(record),
                    entry.map_or(0, |e| e.count),
                    entry.and_then(|e| e.last_time),
                )
            })
            .await;
        let owner = owner
            .ok_or_else(|| RegistryError::not_found(format!("nobody is bound to {record}")))?;

        Ok(OwnershipReport {
            record_id: record.clone(),
            owner,
            name: self.display_name(record).await,
            access_count,
            last_access,
        })
    }

    /// Records whose name contains every term in `query`. Admin only.
    pub async fn find_by_name(&self, actor: RequesterId, query: &str) -> Result<Vec<RecordSummary>> {
        self.require_admin(actor, "search records").await?;

        let terms: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();
        if terms.is_empty() {
            return Err(RegistryError::invalid_argument("search needs at least one term"));
        }
        Ok(self.effects.search(&terms).await?)
    }

    /// Clear bindings and usage; the admin set is kept. Admin only and guarded
    /// by the operator secret.
    pub async fn reset_all(&self, actor: RequesterId, secret: &str) -> Result<()> {
        self.require_admin(actor, "reset state").await?;

        let expected = self.settings.reset_secret.as_bytes();
        let matches: bool = expected.ct_eq(secret.as_bytes()).into();
        if expected.is_empty() || !matches {
            tracing::warn!(actor = %actor, "reset refused, wrong secret");
            return Err(RegistryError::not_privileged("reset secret does not match"));
        }

        self.stores
            .mutate(self.effects.as_ref(), |state| {
                state.bindings.clear();
                state.usage.clear();
            })
            .await?;
        tracing::warn!(actor = %actor, "bindings and usage cleared");
        Ok(())
    }

    async fn require_admin(&self, actor: RequesterId, action: &str) -> Result<()> {
        if self.is_privileged(actor).await {
            Ok(())
        } else {
            Err(RegistryError::not_privileged(format!(
                "only admins may {action}"
            )))
        }
    }

    async fn display_name(&self, record: &RecordId) -> Option<String> {
        match self.effects.fetch(record).await {
            Ok(found) => found.map(|r| r.name),
            Err(err) => {
                tracing::warn!(record = %record, error = %err, "name lookup failed");
                None
            }
        }
    }

    async fn notify(&self, to: RequesterId, text: &str) {
        if let Err(err) = self.effects.send_text(to, text).await {
            tracing::warn!(recipient = %to, error = %err, "notification not delivered");
        }
    }
}
