//! Placement matching core: aggregate score maintenance, evaluation-based
//! effective scores, the placement eligibility workflow, per-pair match
//! scoring, and candidate ranking for open job postings.

pub mod aggregate;
pub mod domain;
pub(crate) mod eligibility;
pub mod memory;
pub mod ranking;
pub mod repository;
pub mod router;
pub(crate) mod scoring;
pub mod service;

#[cfg(test)]
mod tests;

pub use aggregate::{compute_aggregate, compute_effective_score, AggregateOutcome};
pub use domain::{
    ApplicantStatus, EvaluationRecord, JobApplicant, JobId, JobRecord, JobStatus, PlacementError,
    PlacementRequest, PlacementStatus, ProfileApprovalStatus, RequestId, RequestStatus,
    SkillEntry, SkillRequirement, StudentId, StudentRecord, TestEntry, TrainerId, TrainerRemark,
};
pub use memory::MemoryStore;
pub use ranking::{RankOptions, RankedCandidate, DEFAULT_RANK_LIMIT};
pub use repository::{
    EvaluationRepository, JobApplication, JobRepository, PlacementRequestRepository,
    RepositoryError, StudentRepository,
};
pub use router::placement_router;
pub use scoring::{
    MatchExplanation, MatchFactor, MatchOutcome, MatchScorer, MatchWeights, ScoreComponent,
    DEFAULT_MATCH_WEIGHTS,
};
pub use service::{PlacementService, PlacementServiceError, StudentScoreView};
