//! Abuse aggregation
//!
//! Read-only view over the usage ledger and binding directory that surfaces
//! requesters probing records they do not own. Recomputed on every call and
//! never persisted.

use crate::binding::BindingDirectory;
use crate::usage::UsageLedger;
use indexmap::IndexMap;
use rosterlink_core::RequesterId;
use serde::{Deserialize, Serialize};

pub use rosterlink_core::config::DEFAULT_OFFENDER_THRESHOLD;

/// One offending requester
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbuseRecord {
    /// Offending requester
    pub requester: RequesterId,
    /// Attempts against records the requester does not own
    pub total_attempts: u64,
}

/// Requesters with at least `min_attempts` attempts against records they do
/// not own, descending by total. Ties keep first-seen order.
pub fn offenders(
    ledger: &UsageLedger,
    directory: &BindingDirectory,
    min_attempts: u64,
) -> Vec<AbuseRecord> {
    let mut totals: IndexMap<RequesterId, u64> = IndexMap::new();

    for (record, entry) in ledger.iter() {
        for (requester, attempts) in &entry.by {
            if directory.record_of(*requester) != Some(record) {
                *totals.entry(*requester).or_insert(0) += attempts;
            }
        }
    }

    let mut ranked: Vec<AbuseRecord> = totals
        .into_iter()
        .filter(|(_, total)| *total >= min_attempts)
        .map(|(requester, total_attempts)| AbuseRecord {
            requester,
            total_attempts,
        })
        .collect();
    ranked.sort_by(|a, b| b.total_attempts.cmp(&a.total_attempts));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use rosterlink_core::RecordId;

    fn rid(s: &str) -> RecordId {
        RecordId::parse(s).unwrap()
    }

    fn attempts(ledger: &mut UsageLedger, record: &str, requester: i64, n: u64) {
        for _ in 0..n {
            ledger.record_attempt(&rid(record), RequesterId::new(requester));
        }
    }

    #[test]
    fn sums_attempts_across_non_owned_records() {
        let mut ledger = UsageLedger::new();
        let mut dir = BindingDirectory::new();
        dir.try_bind(RequesterId::new(10), &rid("100"));
        dir.try_bind(RequesterId::new(20), &rid("200"));

        attempts(&mut ledger, "100", 10, 4); // owner, ignored
        attempts(&mut ledger, "100", 20, 2);
        attempts(&mut ledger, "200", 20, 9); // owner, ignored
        attempts(&mut ledger, "200", 30, 3);
        attempts(&mut ledger, "300", 20, 1);
        attempts(&mut ledger, "300", 30, 5);
        attempts(&mut ledger, "300", 10, 1);

        let ranked = offenders(&ledger, &dir, 1);
        assert_eq!(
            ranked,
            vec![
                AbuseRecord {
                    requester: RequesterId::new(30),
                    total_attempts: 8
                },
                AbuseRecord {
                    requester: RequesterId::new(20),
                    total_attempts: 3
                },
                AbuseRecord {
                    requester: RequesterId::new(10),
                    total_attempts: 1
                },
            ]
        );
    }

    #[test]
    fn equal_totals_keep_first_seen_order() {
        let mut ledger = UsageLedger::new();
        let dir = BindingDirectory::new();
        attempts(&mut ledger, "1", 40, 1);
        attempts(&mut ledger, "1", 20, 2);
        attempts(&mut ledger, "2", 30, 3);
        attempts(&mut ledger, "2", 40, 2);
        attempts(&mut ledger, "3", 20, 1);

        let order: Vec<(i64, u64)> = offenders(&ledger, &dir, 1)
            .iter()
            .map(|o| (o.requester.get(), o.total_attempts))
            .collect();
        assert_eq!(order, vec![(40, 3), (20, 3), (30, 3)]);

        // Record rankings break ties the same way, by first attempt.
        let at = chrono::Utc::now();
        for id in ["3", "1", "2"] {
            ledger.record_success(&rid(id), at);
        }
        let top: Vec<String> = ledger.top(3).into_iter().map(|(id, _)| id.to_string()).collect();
        assert_eq!(top, vec!["1", "2", "3"]);
    }

    #[test]
    fn threshold_drops_incidental_attempts() {
        let mut ledger = UsageLedger::new();
        let dir = BindingDirectory::new();
        attempts(&mut ledger, "1", 7, 4);
        attempts(&mut ledger, "2", 8, 5);

        let ranked = offenders(&ledger, &dir, DEFAULT_OFFENDER_THRESHOLD);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].requester, RequesterId::new(8));
    }

    #[test]
    fn aggregation_does_not_mutate_inputs() {
        let mut ledger = UsageLedger::new();
        let dir = BindingDirectory::new();
        attempts(&mut ledger, "1", 7, 2);
        let ledger_before = ledger.clone();
        let dir_before = dir.clone();

        let _ = offenders(&ledger, &dir, 0);
        assert_eq!(ledger, ledger_before);
        assert_eq!(dir, dir_before);
    }
}
