//! Aggregate score maintenance.
//!
//! Two distinct composites live here on purpose. The persisted aggregate
//! (tests + trainer ratings) gates job-listing visibility, while the
//! evaluation-bucketed effective score gates application submission. The two
//! disagree by design in the upstream product and must not be unified without
//! a behavior change sign-off.

use std::collections::BTreeMap;

use chrono::Datelike;

use super::domain::{EvaluationRecord, StudentRecord};

/// Share of the persisted aggregate contributed by test performance.
pub const TEST_COMPONENT_WEIGHT: f64 = 0.7;
/// Share of the persisted aggregate contributed by trainer ratings.
pub const TRAINER_COMPONENT_WEIGHT: f64 = 0.3;

/// Result of recomputing a student's derived placement fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregateOutcome {
    pub score: u8,
    pub eligible: bool,
}

/// Derive the persisted 0-100 aggregate and the eligibility flag from the
/// student's tests, trainer ratings, and placement status. Pure and
/// idempotent; callers persist the result atomically with the mutation that
/// triggered it.
pub fn compute_aggregate(student: &StudentRecord) -> AggregateOutcome {
    let test_score = student.test_percentage_mean().unwrap_or(0.0);
    let trainer_score = student.trainer_rating_scale().unwrap_or(0.0);

    let combined = test_score * TEST_COMPONENT_WEIGHT + trainer_score * TRAINER_COMPONENT_WEIGHT;
    let score = combined.round().clamp(0.0, 100.0) as u8;

    AggregateOutcome {
        score,
        eligible: student.placement_status.is_eligible(),
    }
}

/// Evaluation-based aggregate checked against a job's minimum at application
/// time.
///
/// Evaluations are bucketed by the UTC (year, month) of their period start
/// (falling back to the recorded date, then creation time); each month
/// contributes the unweighted mean of its percentage scores, and the result is
/// the unweighted mean of those monthly means. A month with many evaluations
/// counts the same as a month with one. Records with no usable date or a zero
/// `max_score` carry no signal and are skipped. With no usable evaluations the
/// persisted aggregate is returned unchanged.
pub fn compute_effective_score(
    student: &StudentRecord,
    evaluations: &[EvaluationRecord],
) -> f64 {
    let mut buckets: BTreeMap<(i32, u32), Vec<f64>> = BTreeMap::new();

    for evaluation in evaluations {
        if evaluation.max_score <= 0.0 {
            continue;
        }
        let Some(date) = evaluation.bucket_date() else {
            continue;
        };
        buckets
            .entry((date.year(), date.month()))
            .or_default()
            .push(evaluation.score / evaluation.max_score * 100.0);
    }

    let monthly_means: Vec<f64> = buckets
        .values()
        .map(|percentages| percentages.iter().sum::<f64>() / percentages.len() as f64)
        .collect();

    if monthly_means.is_empty() {
        return student.aggregate_score as f64;
    }

    monthly_means.iter().sum::<f64>() / monthly_means.len() as f64
}
