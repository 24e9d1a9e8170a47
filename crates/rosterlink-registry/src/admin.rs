//! Admin registry
//!
//! Privileged identities, independent of bindings. Membership gates the admin
//! commands; who may call `add`/`remove` is enforced by the service.

use indexmap::IndexSet;
use rosterlink_core::RequesterId;
use serde::{Deserialize, Serialize};

/// Result of adding an admin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// Identity was added
    Added,
    /// Identity was already an admin
    AlreadyPresent,
}

/// Result of removing an admin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// Target was removed
    Removed,
    /// Target was not an admin
    NotAdmin,
    /// Actor and target are the same identity
    CannotRemoveSelf,
}

/// Ordered set of admin ids, persisted as a JSON array
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdminRegistry {
    members: IndexSet<RequesterId>,
}

impl AdminRegistry {
    /// Registry seeded with a single bootstrap admin
    pub fn bootstrap(admin: RequesterId) -> Self {
        let mut members = IndexSet::new();
        members.insert(admin);
        Self { members }
    }

    /// True when `id` is an admin
    pub fn is_privileged(&self, id: RequesterId) -> bool {
        self.members.contains(&id)
    }

    /// Add `id` as an admin
    pub fn add(&mut self, id: RequesterId) -> AddOutcome {
        if self.members.insert(id) {
            AddOutcome::Added
        } else {
            AddOutcome::AlreadyPresent
        }
    }

    /// Remove `target` on behalf of `actor`. Self-removal is refused
    /// whatever the registry holds.
    pub fn remove(&mut self, actor: RequesterId, target: RequesterId) -> RemoveOutcome {
        if actor == target {
            return RemoveOutcome::CannotRemoveSelf;
        }
        if self.members.shift_remove(&target) {
            RemoveOutcome::Removed
        } else {
            RemoveOutcome::NotAdmin
        }
    }

    /// Admins in the order they were added
    pub fn members(&self) -> impl Iterator<Item = RequesterId> + '_ {
        self.members.iter().copied()
    }

    /// Number of admins
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// True when there are no admins
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_reports_duplicates() {
        let mut admins = AdminRegistry::bootstrap(RequesterId::new(1));
        assert_eq!(admins.add(RequesterId::new(2)), AddOutcome::Added);
        assert_eq!(admins.add(RequesterId::new(2)), AddOutcome::AlreadyPresent);
        assert_eq!(
            admins.members().collect::<Vec<_>>(),
            vec![RequesterId::new(1), RequesterId::new(2)]
        );
    }

    #[test]
    fn self_removal_is_refused_regardless_of_contents() {
        let five = RequesterId::new(5);
        let mut empty = AdminRegistry::default();
        assert_eq!(empty.remove(five, five), RemoveOutcome::CannotRemoveSelf);

        let mut solo = AdminRegistry::bootstrap(five);
        assert_eq!(solo.remove(five, five), RemoveOutcome::CannotRemoveSelf);
        assert!(solo.is_privileged(five));
    }

    #[test]
    fn remove_unknown_target_is_not_admin() {
        let mut admins = AdminRegistry::bootstrap(RequesterId::new(1));
        assert_eq!(
            admins.remove(RequesterId::new(1), RequesterId::new(9)),
            RemoveOutcome::NotAdmin
        );
        admins.add(RequesterId::new(9));
        assert_eq!(
            admins.remove(RequesterId::new(1), RequesterId::new(9)),
            RemoveOutcome::Removed
        );
        assert!(!admins.is_privileged(RequesterId::new(9)));
    }

    #[test]
    fn persisted_as_array() {
        let admins = AdminRegistry::bootstrap(RequesterId::new(933_493_534));
        assert_eq!(serde_json::to_string(&admins).unwrap(), "[933493534]");
    }
}
