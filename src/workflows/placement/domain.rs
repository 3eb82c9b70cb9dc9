use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::aggregate;

/// Identifier wrapper for student profiles.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StudentId(pub String);

/// Identifier wrapper for job postings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub String);

/// Identifier wrapper for trainers who own student profiles.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrainerId(pub String);

/// Identifier wrapper for placement requests.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub String);

/// Workflow-level failure surfaced verbatim to callers; each error is scoped
/// to a single request and never fatal to the process.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlacementError {
    #[error("record not found")]
    NotFound,
    #[error("invalid state: {0}")]
    InvalidState(String),
    #[error("conflict: {0}")]
    Conflict(String),
}

/// One named skill on a student profile, leveled 0-100.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillEntry {
    pub name: String,
    pub level: u8,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// A recorded test attempt. `max_score` of zero is treated as "no signal".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestEntry {
    pub title: String,
    pub taken_on: NaiveDate,
    pub score: f64,
    pub max_score: f64,
    #[serde(default)]
    pub subject_breakdown: BTreeMap<String, f64>,
}

impl TestEntry {
    pub fn percentage(&self) -> Option<f64> {
        if self.max_score > 0.0 {
            Some(self.score / self.max_score * 100.0)
        } else {
            None
        }
    }
}

/// Trainer feedback with a 1-5 rating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainerRemark {
    pub trainer: TrainerId,
    pub noted_on: NaiveDate,
    pub remark: String,
    pub rating: u8,
}

/// Admin review state of the student profile itself, distinct from the
/// placement workflow status below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

/// Placement lifecycle state governed by the eligibility workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementStatus {
    NotRequested,
    Pending,
    Approved,
    Rejected,
    Placed,
    Removed,
}

impl PlacementStatus {
    pub const fn label(self) -> &'static str {
        match self {
            PlacementStatus::NotRequested => "not_requested",
            PlacementStatus::Pending => "pending",
            PlacementStatus::Approved => "approved",
            PlacementStatus::Rejected => "rejected",
            PlacementStatus::Placed => "placed",
            PlacementStatus::Removed => "removed",
        }
    }

    /// Eligibility is derived from status, never stored independently.
    pub const fn is_eligible(self) -> bool {
        matches!(self, PlacementStatus::Approved | PlacementStatus::Placed)
    }
}

/// Student profile snapshot consumed and mutated by the placement core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentRecord {
    pub id: StudentId,
    pub name: String,
    pub trainer: TrainerId,
    pub batch: String,
    pub program: String,
    pub profile_approval: ProfileApprovalStatus,
    pub skills: Vec<SkillEntry>,
    pub tests: Vec<TestEntry>,
    pub trainer_remarks: Vec<TrainerRemark>,
    pub aggregate_score: u8,
    pub placement_status: PlacementStatus,
    pub placement_eligible: bool,
    pub placement_admin_remarks: Option<String>,
    pub placement_reviewed_at: Option<DateTime<Utc>>,
}

impl StudentRecord {
    /// Mean test percentage across tests carrying a usable `max_score`.
    pub fn test_percentage_mean(&self) -> Option<f64> {
        let percentages: Vec<f64> = self
            .tests
            .iter()
            .filter_map(TestEntry::percentage)
            .collect();
        if percentages.is_empty() {
            return None;
        }
        Some(percentages.iter().sum::<f64>() / percentages.len() as f64)
    }

    /// Mean trainer rating mapped from the 1-5 scale onto 0-100; `None` when
    /// no remarks exist so callers choose their own default.
    pub fn trainer_rating_scale(&self) -> Option<f64> {
        if self.trainer_remarks.is_empty() {
            return None;
        }
        let mean = self
            .trainer_remarks
            .iter()
            .map(|remark| remark.rating as f64)
            .sum::<f64>()
            / self.trainer_remarks.len() as f64;
        Some((mean - 1.0) * 25.0)
    }

    /// Record a test and recompute the derived fields in the same step.
    pub fn record_test(&mut self, test: TestEntry) {
        self.tests.push(test);
        self.refresh_derived();
    }

    /// Record trainer feedback and recompute the derived fields in the same step.
    pub fn record_trainer_remark(&mut self, remark: TrainerRemark) {
        self.trainer_remarks.push(remark);
        self.refresh_derived();
    }

    /// Move the placement status and recompute the derived fields in the same step.
    pub fn set_placement_status(&mut self, status: PlacementStatus) {
        self.placement_status = status;
        self.refresh_derived();
    }

    /// Recompute `aggregate_score` and `placement_eligible` together. The two
    /// fields are never written independently of each other.
    pub fn refresh_derived(&mut self) {
        let outcome = aggregate::compute_aggregate(self);
        self.aggregate_score = outcome.score;
        self.placement_eligible = outcome.eligible;
    }
}

/// A skill requirement on a job posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillRequirement {
    pub name: String,
    pub min_level: u8,
}

/// Lifecycle of a job posting. Open postings auto-close once the deadline passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Draft,
    Open,
    Closed,
}

impl JobStatus {
    pub const fn label(self) -> &'static str {
        match self {
            JobStatus::Draft => "draft",
            JobStatus::Open => "open",
            JobStatus::Closed => "closed",
        }
    }
}

/// Per-student entry in a job's applicant set, unique per student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobApplicant {
    pub student: StudentId,
    pub status: ApplicantStatus,
    pub match_score: u8,
}

/// Status of one applicant within a posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicantStatus {
    Applied,
    Shortlisted,
    Rejected,
    Hired,
}

/// Job posting snapshot. Empty batch/program filters mean no restriction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: JobId,
    pub title: String,
    pub company: String,
    pub required_skills: Vec<SkillRequirement>,
    pub min_aggregate_score: u8,
    #[serde(default)]
    pub eligible_batches: Vec<String>,
    #[serde(default)]
    pub eligible_programs: Vec<String>,
    #[serde(default)]
    pub applicants: Vec<JobApplicant>,
    pub status: JobStatus,
    pub deadline: Option<NaiveDate>,
}

impl JobRecord {
    /// Status with the deadline auto-close rule applied.
    pub fn effective_status(&self, today: NaiveDate) -> JobStatus {
        if self.status == JobStatus::Open {
            if let Some(deadline) = self.deadline {
                if deadline < today {
                    return JobStatus::Closed;
                }
            }
        }
        self.status
    }

    pub fn is_open(&self, today: NaiveDate) -> bool {
        self.effective_status(today) == JobStatus::Open
    }

    /// Batch/program membership check; an empty filter admits everyone.
    pub fn admits(&self, student: &StudentRecord) -> bool {
        let batch_ok = self.eligible_batches.is_empty()
            || self.eligible_batches.iter().any(|batch| batch == &student.batch);
        let program_ok = self.eligible_programs.is_empty()
            || self
                .eligible_programs
                .iter()
                .any(|program| program == &student.program);
        batch_ok && program_ok
    }

    pub fn has_applicant(&self, student: &StudentId) -> bool {
        self.applicants
            .iter()
            .any(|applicant| &applicant.student == student)
    }

    /// First writer wins; a second entry for the same student is a conflict.
    pub fn add_applicant(&mut self, applicant: JobApplicant) -> Result<(), PlacementError> {
        if self.has_applicant(&applicant.student) {
            return Err(PlacementError::Conflict(format!(
                "student {} already applied to job {}",
                applicant.student.0, self.id.0
            )));
        }
        self.applicants.push(applicant);
        Ok(())
    }
}

/// Periodic trainer assessment, unique per (student, kind, period_start).
/// Consumed only by the effective-score reconciler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    pub student: StudentId,
    pub trainer: TrainerId,
    pub kind: String,
    pub period_start: Option<NaiveDate>,
    pub period_end: Option<NaiveDate>,
    pub score: f64,
    pub max_score: f64,
    pub recorded_at: Option<NaiveDate>,
    pub created_at: Option<DateTime<Utc>>,
}

impl EvaluationRecord {
    /// Date used for monthly bucketing: period start, then the recorded date,
    /// then creation time. `None` means the record carries no usable date.
    pub fn bucket_date(&self) -> Option<NaiveDate> {
        self.period_start
            .or(self.recorded_at)
            .or_else(|| self.created_at.map(|at| at.date_naive()))
    }
}

/// Review state of a placement request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub const fn label(self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
        }
    }
}

/// Trainer-initiated workflow object reviewed by a coordinator. At most one
/// pending request may exist per student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementRequest {
    pub id: RequestId,
    pub student: StudentId,
    pub trainer: TrainerId,
    pub avg_score: u8,
    pub status: RequestStatus,
    pub admin_remarks: Option<String>,
    pub created_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
}
