use chrono::NaiveDate;
use serde::Serialize;

use super::domain::{JobRecord, JobStatus, PlacementError, PlacementStatus, StudentId, StudentRecord};
use super::scoring::{MatchExplanation, MatchScorer, MatchWeights};

/// Cap applied when callers do not supply their own.
pub const DEFAULT_RANK_LIMIT: usize = 10;

/// Options accepted by the candidate ranker.
#[derive(Debug, Clone)]
pub struct RankOptions {
    pub weights: Option<MatchWeights>,
    pub limit: usize,
    pub include_explanation: bool,
}

impl Default for RankOptions {
    fn default() -> Self {
        Self {
            weights: None,
            limit: DEFAULT_RANK_LIMIT,
            include_explanation: false,
        }
    }
}

/// One entry in a ranked candidate list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedCandidate {
    pub student: StudentId,
    pub score: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<MatchExplanation>,
}

/// Rank the eligible population against one open job.
///
/// Students must be placement-eligible and approved, meet the job's minimum
/// aggregate score, fall inside its batch/program filters, and not already be
/// in the applicant set. Zero scores are dropped. Ties break by student id
/// ascending so the ordering is deterministic. Read-only: neither the job nor
/// any student record is mutated.
pub(crate) fn rank_candidates(
    job: &JobRecord,
    students: &[StudentRecord],
    default_weights: MatchWeights,
    options: &RankOptions,
    today: NaiveDate,
) -> Result<Vec<RankedCandidate>, PlacementError> {
    if job.effective_status(today) != JobStatus::Open {
        return Err(PlacementError::InvalidState(format!(
            "job {} is not open for matching",
            job.id.0
        )));
    }

    let scorer = MatchScorer::new(options.weights.unwrap_or(default_weights));

    let mut ranked: Vec<RankedCandidate> = students
        .iter()
        .filter(|student| {
            student.placement_eligible && student.placement_status == PlacementStatus::Approved
        })
        .filter(|student| student.aggregate_score >= job.min_aggregate_score)
        .filter(|student| job.admits(student))
        .filter(|student| !job.has_applicant(&student.id))
        .map(|student| {
            let outcome = scorer.score(student, job, today, options.include_explanation);
            RankedCandidate {
                student: student.id.clone(),
                score: outcome.score,
                explanation: outcome.explanation,
            }
        })
        .filter(|candidate| candidate.score > 0)
        .collect();

    ranked.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| a.student.cmp(&b.student))
    });
    ranked.truncate(options.limit);

    Ok(ranked)
}
