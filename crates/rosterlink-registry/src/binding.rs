//! Binding directory
//!
//! Exclusive ownership between requester identities and record ids. A requester
//! owns at most one record and a record has at most one owner. Bindings are
//! created on a requester's first successful lookup and only removed by an
//! explicit unbind or a full reset.

use indexmap::IndexMap;
use rosterlink_core::{RecordId, RequesterId};
use serde::{Deserialize, Serialize};

/// Result of classifying a (requester, record) pair against the directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindOutcome {
    /// Requester owned nothing and the record was free; binding created
    Bound,
    /// Requester already owns exactly this record
    AlreadyBoundToSelf,
    /// Requester owns a different record, or another requester owns this one
    ConflictWithOtherOwner,
}

/// Requester to record map, persisted as `{"<requester>": "<record>"}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BindingDirectory {
    bindings: IndexMap<RequesterId, RecordId>,
}

impl BindingDirectory {
    /// Create an empty directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify the pair without mutating anything.
    ///
    /// Finding another owner is a linear scan over all bindings. A reverse
    /// index must keep exactly these semantics.
    pub fn check(&self, requester: RequesterId, record: &RecordId) -> BindOutcome {
        match self.bindings.get(&requester) {
            Some(owned) if owned == record => return BindOutcome::AlreadyBoundToSelf,
            Some(_) => return BindOutcome::ConflictWithOtherOwner,
            None => {}
        }

        let taken = self
            .bindings
            .iter()
            .any(|(owner, owned)| owned == record && *owner != requester);
        if taken {
            BindOutcome::ConflictWithOtherOwner
        } else {
            BindOutcome::Bound
        }
    }

    /// Classify the pair and create the binding when it is free
    pub fn try_bind(&mut self, requester: RequesterId, record: &RecordId) -> BindOutcome {
        let outcome = self.check(requester, record);
        if outcome == BindOutcome::Bound {
            self.bindings.insert(requester, record.clone());
        }
        outcome
    }

    /// Release whatever `requester` owns
    pub fn unbind_by_requester(&mut self, requester: RequesterId) -> Option<RecordId> {
        self.bindings.shift_remove(&requester)
    }

    /// Release `record` from its owner
    pub fn unbind_by_record(&mut self, record: &RecordId) -> Option<RequesterId> {
        let owner = self.owner_of(record)?;
        self.bindings.shift_remove(&owner);
        Some(owner)
    }

    /// Current owner of `record`
    pub fn owner_of(&self, record: &RecordId) -> Option<RequesterId> {
        self.bindings
            .iter()
            .find(|(_, owned)| *owned == record)
            .map(|(owner, _)| *owner)
    }

    /// Record owned by `requester`
    pub fn record_of(&self, requester: RequesterId) -> Option<&RecordId> {
        self.bindings.get(&requester)
    }

    /// Number of bound identities
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// True when nobody is bound
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Bindings in creation order
    pub fn iter(&self) -> impl Iterator<Item = (RequesterId, &RecordId)> {
        self.bindings.iter().map(|(owner, record)| (*owner, record))
    }

    /// Drop every binding
    pub fn clear(&mut self) {
        self.bindings.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rid(s: &str) -> RecordId {
        RecordId::parse(s).unwrap()
    }

    #[test]
    fn first_lookup_binds_and_repeat_is_idempotent() {
        let mut dir = BindingDirectory::new();
        let alice = RequesterId::new(2);

        assert_eq!(dir.try_bind(alice, &rid("A123")), BindOutcome::Bound);
        assert_eq!(dir.try_bind(alice, &rid("A123")), BindOutcome::AlreadyBoundToSelf);
        assert_eq!(dir.len(), 1);
        assert_eq!(dir.record_of(alice), Some(&rid("A123")));
        assert_eq!(dir.owner_of(&rid("A123")), Some(alice));
    }

    #[test]
    fn other_owner_conflicts_without_changing_binding() {
        let mut dir = BindingDirectory::new();
        let owner = RequesterId::new(2);
        let probe = RequesterId::new(3);
        dir.try_bind(owner, &rid("A123"));

        assert_eq!(
            dir.try_bind(probe, &rid("A123")),
            BindOutcome::ConflictWithOtherOwner
        );
        assert_eq!(dir.owner_of(&rid("A123")), Some(owner));
        assert_eq!(dir.record_of(probe), None);
    }

    #[test]
    fn owner_of_one_record_cannot_claim_another() {
        let mut dir = BindingDirectory::new();
        let owner = RequesterId::new(2);
        dir.try_bind(owner, &rid("100"));

        assert_eq!(dir.check(owner, &rid("200")), BindOutcome::ConflictWithOtherOwner);
        assert_eq!(dir.try_bind(owner, &rid("200")), BindOutcome::ConflictWithOtherOwner);
        assert_eq!(dir.owner_of(&rid("200")), None);
    }

    #[test]
    fn unbind_fully_releases() {
        let mut dir = BindingDirectory::new();
        let owner = RequesterId::new(9);
        dir.try_bind(owner, &rid("55"));

        assert_eq!(dir.unbind_by_requester(owner), Some(rid("55")));
        assert_eq!(dir.unbind_by_requester(owner), None);
        assert_eq!(dir.try_bind(owner, &rid("55")), BindOutcome::Bound);

        assert_eq!(dir.unbind_by_record(&rid("55")), Some(owner));
        assert_eq!(dir.unbind_by_record(&rid("55")), None);
        assert!(dir.is_empty());
    }

    #[test]
    fn persisted_shape_is_requester_keyed_object() {
        let mut dir = BindingDirectory::new();
        dir.try_bind(RequesterId::new(2), &rid("A123"));
        let json = serde_json::to_string(&dir).unwrap();
        assert_eq!(json, r#"{"2":"A123"}"#);

        let back: BindingDirectory = serde_json::from_str(&json).unwrap();
        assert_eq!(back, dir);
    }
}
