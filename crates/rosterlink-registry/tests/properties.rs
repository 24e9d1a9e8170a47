//! Property tests for binding exclusivity and abuse totals

use proptest::prelude::*;
use rosterlink_core::{RecordId, RequesterId};
use rosterlink_registry::{offenders, BindOutcome, BindingDirectory, UsageLedger};
use std::collections::HashMap;

fn op_strategy() -> impl Strategy<Value = (i64, u8)> {
    (1i64..8, 0u8..6)
}

fn rid(n: u8) -> RecordId {
    RecordId::parse(&format!("R{n}")).unwrap()
}

proptest! {
    #[test]
    fn bindings_stay_exclusive(ops in prop::collection::vec(op_strategy(), 0..64)) {
        let mut dir = BindingDirectory::new();
        for (requester, record) in ops {
            let requester = RequesterId::new(requester);
            let record = rid(record);
            let owner_before = dir.owner_of(&record);
            let outcome = dir.try_bind(requester, &record);

            match outcome {
                BindOutcome::Bound => prop_assert_eq!(owner_before, None),
                BindOutcome::AlreadyBoundToSelf => prop_assert_eq!(owner_before, Some(requester)),
                BindOutcome::ConflictWithOtherOwner => {
                    prop_assert_eq!(dir.owner_of(&record), owner_before);
                }
            }

            let mut owners: HashMap<&RecordId, usize> = HashMap::new();
            for (_, owned) in dir.iter() {
                *owners.entry(owned).or_insert(0) += 1;
            }
            prop_assert!(owners.values().all(|n| *n == 1));
        }
    }

    #[test]
    fn offender_total_is_sum_over_non_owned(
        binds in prop::collection::vec(op_strategy(), 0..16),
        attempts in prop::collection::vec(op_strategy(), 0..64),
    ) {
        let mut dir = BindingDirectory::new();
        for (requester, record) in binds {
            dir.try_bind(RequesterId::new(requester), &rid(record));
        }
        let mut ledger = UsageLedger::new();
        let mut expected: HashMap<RequesterId, u64> = HashMap::new();
        for (requester, record) in attempts {
            let requester = RequesterId::new(requester);
            let record = rid(record);
            ledger.record_attempt(&record, requester);
            if dir.record_of(requester) != Some(&record) {
                *expected.entry(requester).or_insert(0) += 1;
            }
        }

        let ranked = offenders(&ledger, &dir, 1);
        prop_assert_eq!(ranked.len(), expected.len());
        for window in ranked.windows(2) {
            prop_assert!(window[0].total_attempts >= window[1].total_attempts);
        }
        for row in ranked {
            prop_assert_eq!(Some(&row.total_attempts), expected.get(&row.requester));
        }
    }
}
