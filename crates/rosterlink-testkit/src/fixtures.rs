//! Record fixtures

use rosterlink_core::{Record, RecordId, SubjectGrade};

/// Record `id` named `name` with two passing subjects.
///
/// Panics on an invalid id; fixtures are test-only.
pub fn record(id: &str, name: &str) -> Record {
    record_with_scores(id, name, &[("Dermatology", 80.0), ("Radiology", 70.0)])
}

/// Record with explicit subject scores; total is their sum and percentage is
/// relative to 100 points per subject.
#[allow(clippy::expect_used)]
pub fn record_with_scores(id: &str, name: &str, scores: &[(&str, f64)]) -> Record {
    let subjects: Vec<SubjectGrade> = scores
        .iter()
        .map(|(subject, score)| SubjectGrade {
            subject: (*subject).to_string(),
            score: *score,
        })
        .collect();
    let total: f64 = subjects.iter().map(|g| g.score).sum();
    let percentage = if subjects.is_empty() {
        0.0
    } else {
        total / subjects.len() as f64
    };
    Record {
        id: RecordId::parse(id).expect("fixture record id must be valid"),
        name: name.to_string(),
        subjects,
        total,
        percentage,
    }
}
