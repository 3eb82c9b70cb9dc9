use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::info;

use super::aggregate::{self, AggregateOutcome};
use super::domain::{
    ApplicantStatus, JobApplicant, JobId, PlacementError, PlacementRequest, PlacementStatus,
    RequestId, StudentId, StudentRecord, TrainerId,
};
use super::eligibility;
use super::ranking::{self, RankOptions, RankedCandidate};
use super::repository::{
    EvaluationRepository, JobApplication, JobRepository, PlacementRequestRepository,
    RepositoryError, StudentRepository,
};
use super::scoring::{MatchOutcome, MatchScorer, MatchWeights};

/// Service facade composing the repositories, the match scorer, and the
/// eligibility state machine.
pub struct PlacementService<S, J, E, P> {
    students: Arc<S>,
    jobs: Arc<J>,
    evaluations: Arc<E>,
    requests: Arc<P>,
    weights: MatchWeights,
}

static REQUEST_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_request_id() -> RequestId {
    let id = REQUEST_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    RequestId(format!("req-{id:06}"))
}

impl<S, J, E, P> PlacementService<S, J, E, P>
where
    S: StudentRepository + 'static,
    J: JobRepository + 'static,
    E: EvaluationRepository + 'static,
    P: PlacementRequestRepository + 'static,
{
    pub fn new(
        students: Arc<S>,
        jobs: Arc<J>,
        evaluations: Arc<E>,
        requests: Arc<P>,
        weights: MatchWeights,
    ) -> Self {
        Self {
            students,
            jobs,
            evaluations,
            requests,
            weights,
        }
    }

    fn student(&self, id: &StudentId) -> Result<StudentRecord, PlacementServiceError> {
        self.students
            .fetch(id)?
            .ok_or(PlacementError::NotFound.into())
    }

    /// Recompute and persist the student's aggregate score and eligibility
    /// flag. Idempotent on an unchanged record.
    pub fn refresh_aggregate(
        &self,
        student_id: &StudentId,
    ) -> Result<AggregateOutcome, PlacementServiceError> {
        let mut student = self.student(student_id)?;
        student.refresh_derived();
        let outcome = AggregateOutcome {
            score: student.aggregate_score,
            eligible: student.placement_eligible,
        };
        self.students.update(student)?;
        Ok(outcome)
    }

    /// Evaluation-bucketed score used at application time.
    pub fn effective_score(&self, student_id: &StudentId) -> Result<f64, PlacementServiceError> {
        let student = self.student(student_id)?;
        let evaluations = self.evaluations.for_student(student_id)?;
        Ok(aggregate::compute_effective_score(&student, &evaluations))
    }

    /// Score one (student, job) pair, optionally with the explanation payload.
    pub fn score_match(
        &self,
        student_id: &StudentId,
        job_id: &JobId,
        weights: Option<MatchWeights>,
        explain: bool,
    ) -> Result<MatchOutcome, PlacementServiceError> {
        let student = self.student(student_id)?;
        let job = self.jobs.fetch(job_id)?.ok_or(PlacementError::NotFound)?;
        let scorer = MatchScorer::new(weights.unwrap_or(self.weights));
        Ok(scorer.score(&student, &job, Utc::now().date_naive(), explain))
    }

    /// Rank the eligible population against one open job. Read-only.
    pub fn rank_candidates(
        &self,
        job_id: &JobId,
        options: RankOptions,
    ) -> Result<Vec<RankedCandidate>, PlacementServiceError> {
        let job = self.jobs.fetch(job_id)?.ok_or(PlacementError::NotFound)?;
        let students = self.students.all()?;
        let ranked = ranking::rank_candidates(
            &job,
            &students,
            self.weights,
            &options,
            Utc::now().date_naive(),
        )?;
        Ok(ranked)
    }

    /// Trainer opens a placement request for a student they own.
    pub fn request_placement(
        &self,
        student_id: &StudentId,
        trainer: &TrainerId,
    ) -> Result<PlacementRequest, PlacementServiceError> {
        let student = self.student(student_id)?;
        let has_pending = self.requests.pending_for(student_id)?.is_some();

        let (student, request) = eligibility::request_placement(
            student,
            trainer,
            next_request_id(),
            has_pending,
            Utc::now(),
        )?;

        let stored = self.requests.save_with_student(request, student)?;
        info!(request = %stored.id.0, student = %student_id.0, "placement requested");
        Ok(stored)
    }

    /// Coordinator approves a pending request.
    pub fn approve_request(
        &self,
        request_id: &RequestId,
        remarks: Option<String>,
    ) -> Result<PlacementRequest, PlacementServiceError> {
        self.review(request_id, remarks, eligibility::approve_request)
    }

    /// Coordinator rejects a pending request.
    pub fn reject_request(
        &self,
        request_id: &RequestId,
        remarks: Option<String>,
    ) -> Result<PlacementRequest, PlacementServiceError> {
        self.review(request_id, remarks, eligibility::reject_request)
    }

    fn review(
        &self,
        request_id: &RequestId,
        remarks: Option<String>,
        transition: impl FnOnce(
            PlacementRequest,
            StudentRecord,
            Option<String>,
            chrono::DateTime<Utc>,
        )
            -> Result<(PlacementRequest, StudentRecord), PlacementError>,
    ) -> Result<PlacementRequest, PlacementServiceError> {
        let request = self
            .requests
            .fetch(request_id)?
            .ok_or(PlacementError::NotFound)?;
        let student = self.student(&request.student)?;

        let (request, student) = transition(request, student, remarks, Utc::now())?;
        let stored = self.requests.save_with_student(request, student)?;
        info!(
            request = %stored.id.0,
            verdict = stored.status.label(),
            "placement request reviewed"
        );
        Ok(stored)
    }

    /// Trainer cancels their own pending request; the request is deleted and
    /// the student returns to `not_requested`.
    pub fn cancel_request(
        &self,
        request_id: &RequestId,
        trainer: &TrainerId,
    ) -> Result<(), PlacementServiceError> {
        let request = self
            .requests
            .fetch(request_id)?
            .ok_or(PlacementError::NotFound)?;
        let student = self.student(&request.student)?;

        let student = eligibility::cancel_request(&request, student, trainer)?;
        self.requests.delete_with_student(request_id, student)?;
        info!(request = %request_id.0, "placement request cancelled");
        Ok(())
    }

    /// Student applies to an open job. The evaluation-based effective score,
    /// not the persisted aggregate, is checked against the job's minimum.
    pub fn apply_to_job(
        &self,
        job_id: &JobId,
        student_id: &StudentId,
    ) -> Result<JobApplication, PlacementServiceError> {
        let mut job = self.jobs.fetch(job_id)?.ok_or(PlacementError::NotFound)?;
        let today = Utc::now().date_naive();
        if !job.is_open(today) {
            return Err(PlacementError::InvalidState(format!(
                "job {} is not open for applications",
                job.id.0
            ))
            .into());
        }

        let student = self.student(student_id)?;
        if student.placement_status != PlacementStatus::Approved || !student.placement_eligible {
            return Err(PlacementError::InvalidState(format!(
                "student {} is not approved for placement",
                student.id.0
            ))
            .into());
        }
        if !job.admits(&student) {
            return Err(PlacementError::InvalidState(format!(
                "student {} is outside the job's batch/program filters",
                student.id.0
            ))
            .into());
        }
        if job.has_applicant(student_id) {
            return Err(PlacementError::Conflict(format!(
                "student {} already applied to job {}",
                student.id.0, job.id.0
            ))
            .into());
        }

        let evaluations = self.evaluations.for_student(student_id)?;
        let effective = aggregate::compute_effective_score(&student, &evaluations);
        if effective < job.min_aggregate_score as f64 {
            return Err(PlacementError::InvalidState(format!(
                "effective score {effective:.1} is below the job minimum {}",
                job.min_aggregate_score
            ))
            .into());
        }

        let scorer = MatchScorer::new(self.weights);
        let outcome = scorer.score(&student, &job, today, false);

        job.add_applicant(JobApplicant {
            student: student.id.clone(),
            status: ApplicantStatus::Applied,
            match_score: outcome.score,
        })?;

        let application = JobApplication {
            job: job.id.clone(),
            student: student.id.clone(),
            status: ApplicantStatus::Applied,
            match_score: outcome.score,
            applied_at: Utc::now(),
        };

        let stored = self.jobs.save_with_application(job, application)?;
        info!(
            job = %stored.job.0,
            student = %stored.student.0,
            score = stored.match_score,
            "application recorded"
        );
        Ok(stored)
    }

    /// Aggregate and effective scores side by side for the score view API.
    pub fn student_score_view(
        &self,
        student_id: &StudentId,
    ) -> Result<StudentScoreView, PlacementServiceError> {
        let student = self.student(student_id)?;
        let evaluations = self.evaluations.for_student(student_id)?;
        let effective = aggregate::compute_effective_score(&student, &evaluations);

        Ok(StudentScoreView {
            student: student.id.clone(),
            aggregate_score: student.aggregate_score,
            effective_score: effective,
            placement_status: student.placement_status.label(),
            placement_eligible: student.placement_eligible,
        })
    }
}

/// Error raised by the placement service.
#[derive(Debug, thiserror::Error)]
pub enum PlacementServiceError {
    #[error(transparent)]
    Placement(#[from] PlacementError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Sanitized representation of a student's two scores.
#[derive(Debug, Clone, Serialize)]
pub struct StudentScoreView {
    pub student: StudentId,
    pub aggregate_score: u8,
    pub effective_score: f64,
    pub placement_status: &'static str,
    pub placement_eligible: bool,
}
