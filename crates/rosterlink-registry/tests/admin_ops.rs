//! Admin operations, reporting and reset

use assert_matches::assert_matches;
use rosterlink_core::{RecordId, RegistryError, RequesterId};
use rosterlink_registry::{AddOutcome, LookupAccess, LookupOutcome, RegistryService, ServiceSettings};
use rosterlink_testkit::{record, SentMessage, TestEffects};
use std::sync::Arc;

const ADMIN: RequesterId = RequesterId::new(1);
const SECRET: &str = "operator-secret";

fn rid(s: &str) -> RecordId {
    RecordId::parse(s).unwrap()
}

async fn service(effects: &TestEffects) -> RegistryService<TestEffects> {
    RegistryService::initialize(
        Arc::new(effects.clone()),
        ADMIN,
        ServiceSettings {
            reset_secret: SECRET.to_string(),
            offender_threshold: 5,
        },
    )
    .await
    .unwrap()
}

#[tokio::test]
async fn admin_commands_require_privilege() {
    let effects = TestEffects::default();
    let svc = service(&effects).await;
    let user = RequesterId::new(2);

    assert_matches!(svc.stats(user).await, Err(RegistryError::NotPrivileged { .. }));
    assert_matches!(svc.offenders(user, None).await, Err(RegistryError::NotPrivileged { .. }));
    assert_matches!(
        svc.add_admin(user, RequesterId::new(3)).await,
        Err(RegistryError::NotPrivileged { .. })
    );
    assert_matches!(
        svc.unbind_by_record(user, &rid("1")).await,
        Err(RegistryError::NotPrivileged { .. })
    );
    assert_matches!(
        svc.reset_all(user, SECRET).await,
        Err(RegistryError::NotPrivileged { .. })
    );
    assert_eq!(svc.admin_list().await, vec![ADMIN]);
}

#[tokio::test]
async fn add_and_remove_admins_with_notifications() {
    let effects = TestEffects::default();
    let svc = service(&effects).await;
    let newcomer = RequesterId::new(20);

    assert_eq!(svc.add_admin(ADMIN, newcomer).await.unwrap(), AddOutcome::Added);
    assert_eq!(
        svc.add_admin(ADMIN, newcomer).await.unwrap(),
        AddOutcome::AlreadyPresent
    );
    assert!(svc.is_privileged(newcomer).await);
    assert_eq!(effects.transport.sent_to(newcomer).await.len(), 1);

    svc.remove_admin(newcomer, ADMIN).await.unwrap();
    assert!(!svc.is_privileged(ADMIN).await);
    assert_matches!(
        effects.transport.sent_to(ADMIN).await.as_slice(),
        [SentMessage::Text { .. }]
    );

    assert_matches!(
        svc.remove_admin(newcomer, RequesterId::new(99)).await,
        Err(RegistryError::NotFound { .. })
    );
}

#[tokio::test]
async fn self_removal_always_refused() {
    let effects = TestEffects::default();
    let svc = service(&effects).await;
    let five = RequesterId::new(5);

    assert_matches!(svc.remove_admin(five, five).await, Err(RegistryError::SelfRemoval));
    svc.add_admin(ADMIN, five).await.unwrap();
    assert_matches!(svc.remove_admin(five, five).await, Err(RegistryError::SelfRemoval));
    assert_matches!(svc.remove_admin(ADMIN, ADMIN).await, Err(RegistryError::SelfRemoval));
    assert!(svc.is_privileged(five).await);
}

#[tokio::test]
async fn transport_failure_does_not_undo_mutation() {
    let effects = TestEffects::default();
    let svc = service(&effects).await;
    effects.transport.set_failing(true);

    assert_eq!(
        svc.add_admin(ADMIN, RequesterId::new(30)).await.unwrap(),
        AddOutcome::Added
    );
    assert!(svc.is_privileged(RequesterId::new(30)).await);
}

#[tokio::test]
async fn unbind_then_rebind_same_pair() {
    let effects = TestEffects::with_records(vec![record("42", "Hala")]);
    let svc = service(&effects).await;
    let owner = RequesterId::new(7);

    svc.lookup(owner, Some("42")).await.unwrap();
    assert_eq!(svc.unbind_by_requester(ADMIN, owner).await.unwrap(), rid("42"));
    assert_eq!(effects.transport.sent_to(owner).await.len(), 1);
    assert_matches!(
        svc.unbind_by_requester(ADMIN, owner).await,
        Err(RegistryError::NotFound { .. })
    );

    let outcome = svc.lookup(owner, Some("42")).await.unwrap();
    assert_matches!(outcome, LookupOutcome::Found { access: LookupAccess::NewlyBound, .. });

    assert_eq!(svc.unbind_by_record(ADMIN, &rid("42")).await.unwrap(), owner);
    assert_matches!(
        svc.unbind_by_record(ADMIN, &rid("42")).await,
        Err(RegistryError::NotFound { .. })
    );
}

#[tokio::test]
async fn stats_lists_top_records_with_names() {
    let effects = TestEffects::with_records(vec![
        record("1", "One"),
        record("2", "Two"),
        record("3", "Three"),
    ]);
    let svc = service(&effects).await;

    svc.lookup(RequesterId::new(10), Some("1")).await.unwrap();
    for _ in 0..3 {
        svc.lookup(RequesterId::new(20), Some("2")).await.unwrap();
    }
    svc.lookup(RequesterId::new(30), Some("404")).await.unwrap();

    let stats = svc.stats(ADMIN).await.unwrap();
    assert_eq!(stats.total_bound_identities, 2);
    assert_eq!(stats.total_successful_lookups, 4);
    let top: Vec<(&str, &str, u64)> = stats
        .top
        .iter()
        .map(|t| (t.record_id.as_str(), t.name.as_str(), t.count))
        .collect();
    assert_eq!(top, vec![("2", "Two", 3), ("1", "One", 1), ("404", "—", 0)]);
}

#[tokio::test]
async fn offenders_sum_over_non_owned_records() {
    let effects = TestEffects::with_records(vec![
        record("100", "A"),
        record("200", "B"),
        record("300", "C"),
    ]);
    let svc = service(&effects).await;
    let alice = RequesterId::new(10);
    let bob = RequesterId::new(20);
    let mallory = RequesterId::new(30);

    svc.lookup(alice, Some("100")).await.unwrap();
    svc.lookup(bob, Some("200")).await.unwrap();
    for record in ["100", "200", "300", "100"] {
        svc.lookup(mallory, Some(record)).await.unwrap();
    }
    // Bob probes 100 twice; lookups of 200 (Bob's own record) do not count.
    svc.lookup(bob, Some("100")).await.unwrap();
    svc.lookup(bob, Some("100")).await.unwrap();
    svc.lookup(bob, Some("200")).await.unwrap();

    let ranked = svc.offenders(ADMIN, Some(1)).await.unwrap();
    let totals: Vec<(RequesterId, u64)> = ranked
        .iter()
        .map(|r| (r.requester, r.total_attempts))
        .collect();

    // Mallory bound 300 on the third lookup, so only 100 (x2) and 200 count.
    assert_eq!(totals, vec![(mallory, 3), (bob, 2)]);
    assert!(svc.offenders(ADMIN, None).await.unwrap().is_empty());
}

#[tokio::test]
async fn admin_lookups_count_toward_offenders() {
    let records = (1..=5).map(|i| record(&i.to_string(), "Row")).collect();
    let effects = TestEffects::with_records(records);
    let svc = service(&effects).await;

    for id in ["1", "2", "3", "4"] {
        svc.lookup(ADMIN, Some(id)).await.unwrap();
    }
    assert!(svc.offenders(ADMIN, None).await.unwrap().is_empty());

    svc.lookup(ADMIN, Some("5")).await.unwrap();
    let ranked = svc.offenders(ADMIN, None).await.unwrap();
    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].requester, ADMIN);
    assert_eq!(ranked[0].total_attempts, 5);
    assert_eq!(svc.bind_status(ADMIN).await, None);
}

#[tokio::test]
async fn who_owns_reports_usage() {
    let effects = TestEffects::with_records(vec![record("88", "Salma")]);
    let svc = service(&effects).await;
    let owner = RequesterId::new(3);

    assert_matches!(
        svc.who_owns(ADMIN, &rid("88")).await,
        Err(RegistryError::NotFound { .. })
    );
    svc.lookup(owner, Some("88")).await.unwrap();
    svc.lookup(owner, Some("88")).await.unwrap();

    let report = svc.who_owns(ADMIN, &rid("88")).await.unwrap();
    assert_eq!(report.owner, owner);
    assert_eq!(report.name.as_deref(), Some("Salma"));
    assert_eq!(report.access_count, 2);
    assert_eq!(report.last_access, Some(effects.clock.current()));
}

#[tokio::test]
async fn find_by_name_matches_all_terms() {
    let effects = TestEffects::with_records(vec![
        record("1", "Mona Adel"),
        record("2", "Mona Samir"),
        record("3", "Omar Adel"),
    ]);
    let svc = service(&effects).await;

    let hits = svc.find_by_name(ADMIN, "adel MONA").await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, rid("1"));
    assert_matches!(
        svc.find_by_name(ADMIN, "   ").await,
        Err(RegistryError::InvalidArgument { .. })
    );
}

#[tokio::test]
async fn reset_clears_bindings_and_usage_but_keeps_admins() {
    let effects = TestEffects::with_records(vec![record("5", "E")]);
    let svc = service(&effects).await;
    svc.add_admin(ADMIN, RequesterId::new(2)).await.unwrap();
    svc.lookup(RequesterId::new(9), Some("5")).await.unwrap();

    assert_matches!(
        svc.reset_all(ADMIN, "wrong").await,
        Err(RegistryError::NotPrivileged { .. })
    );
    assert_eq!(svc.snapshot().await.bindings.len(), 1);

    svc.reset_all(ADMIN, SECRET).await.unwrap();
    let state = svc.snapshot().await;
    assert!(state.bindings.is_empty());
    assert!(state.usage.is_empty());
    assert!(svc.is_privileged(ADMIN).await);
    assert!(svc.is_privileged(RequesterId::new(2)).await);
}
