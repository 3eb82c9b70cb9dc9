use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{
    ApplicantStatus, EvaluationRecord, JobId, JobRecord, PlacementRequest, RequestId, StudentId,
    StudentRecord,
};

/// Error enumeration for storage failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Storage abstraction over student profiles so the service module can be
/// exercised in isolation.
pub trait StudentRepository: Send + Sync {
    fn fetch(&self, id: &StudentId) -> Result<Option<StudentRecord>, RepositoryError>;
    fn all(&self) -> Result<Vec<StudentRecord>, RepositoryError>;
    fn update(&self, record: StudentRecord) -> Result<(), RepositoryError>;
}

/// Storage abstraction over job postings and their applicant sets.
pub trait JobRepository: Send + Sync {
    fn fetch(&self, id: &JobId) -> Result<Option<JobRecord>, RepositoryError>;
    /// Persist the mutated job together with the new application record as a
    /// single unit. A duplicate (job, student) application is a conflict.
    fn save_with_application(
        &self,
        job: JobRecord,
        application: JobApplication,
    ) -> Result<JobApplication, RepositoryError>;
}

/// Read access to periodic evaluations, ordered by period.
pub trait EvaluationRepository: Send + Sync {
    fn for_student(&self, student: &StudentId) -> Result<Vec<EvaluationRecord>, RepositoryError>;
}

/// Storage abstraction over placement requests. The compound methods persist
/// the request and the student profile as a single unit so the two records
/// can never be observed disagreeing.
pub trait PlacementRequestRepository: Send + Sync {
    fn fetch(&self, id: &RequestId) -> Result<Option<PlacementRequest>, RepositoryError>;
    fn pending_for(&self, student: &StudentId)
        -> Result<Option<PlacementRequest>, RepositoryError>;
    /// Insert or update the request together with the student. Inserting a
    /// second pending request for the same student is a conflict; the first
    /// writer wins.
    fn save_with_student(
        &self,
        request: PlacementRequest,
        student: StudentRecord,
    ) -> Result<PlacementRequest, RepositoryError>;
    /// Delete the request and persist the reset student as a single unit.
    fn delete_with_student(
        &self,
        id: &RequestId,
        student: StudentRecord,
    ) -> Result<(), RepositoryError>;
}

/// Standalone application record persisted alongside the job's applicant set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobApplication {
    pub job: JobId,
    pub student: StudentId,
    pub status: ApplicantStatus,
    pub match_score: u8,
    pub applied_at: DateTime<Utc>,
}
