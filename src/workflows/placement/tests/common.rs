use std::sync::Arc;

use axum::response::Response;
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use serde_json::Value;

use crate::workflows::placement::domain::{
    EvaluationRecord, JobId, JobRecord, JobStatus, PlacementRequest, PlacementStatus,
    ProfileApprovalStatus, RequestId, SkillEntry, SkillRequirement, StudentId, StudentRecord,
    TestEntry, TrainerId, TrainerRemark,
};
use crate::workflows::placement::memory::MemoryStore;
use crate::workflows::placement::repository::{
    EvaluationRepository, JobApplication, JobRepository, PlacementRequestRepository,
    RepositoryError, StudentRepository,
};
use crate::workflows::placement::scoring::DEFAULT_MATCH_WEIGHTS;
use crate::workflows::placement::service::PlacementService;

pub(super) fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 8, 25).expect("valid date")
}

pub(super) fn trainer() -> TrainerId {
    TrainerId("trainer-01".to_string())
}

pub(super) fn student(suffix: &str) -> StudentRecord {
    let mut record = StudentRecord {
        id: StudentId(format!("stu-{suffix}")),
        name: format!("Student {suffix}"),
        trainer: trainer(),
        batch: "2026A".to_string(),
        program: "fullstack".to_string(),
        profile_approval: ProfileApprovalStatus::Approved,
        skills: vec![
            SkillEntry {
                name: "JavaScript".to_string(),
                level: 85,
                tags: vec!["web".to_string()],
            },
            SkillEntry {
                name: "React".to_string(),
                level: 80,
                tags: vec!["web".to_string()],
            },
        ],
        tests: Vec::new(),
        trainer_remarks: Vec::new(),
        aggregate_score: 0,
        placement_status: PlacementStatus::NotRequested,
        placement_eligible: false,
        placement_admin_remarks: None,
        placement_reviewed_at: None,
    };
    record.refresh_derived();
    record
}

pub(super) fn approved_student(suffix: &str) -> StudentRecord {
    let mut record = student(suffix);
    record.record_test(test_entry("Weekly assessment", today() - Duration::days(5), 87.0, 100.0));
    record.record_trainer_remark(remark(today() - Duration::days(2), 5));
    record.record_trainer_remark(remark(today() - Duration::days(40), 4));
    record.set_placement_status(PlacementStatus::Approved);
    record
}

pub(super) fn test_entry(title: &str, taken_on: NaiveDate, score: f64, max_score: f64) -> TestEntry {
    TestEntry {
        title: title.to_string(),
        taken_on,
        score,
        max_score,
        subject_breakdown: Default::default(),
    }
}

pub(super) fn remark(noted_on: NaiveDate, rating: u8) -> TrainerRemark {
    TrainerRemark {
        trainer: trainer(),
        noted_on,
        remark: "steady progress".to_string(),
        rating,
    }
}

pub(super) fn job(suffix: &str) -> JobRecord {
    JobRecord {
        id: JobId(format!("job-{suffix}")),
        title: "Frontend Engineer".to_string(),
        company: "Orbital Labs".to_string(),
        required_skills: vec![
            SkillRequirement {
                name: "JavaScript".to_string(),
                min_level: 80,
            },
            SkillRequirement {
                name: "React".to_string(),
                min_level: 75,
            },
        ],
        min_aggregate_score: 50,
        eligible_batches: Vec::new(),
        eligible_programs: Vec::new(),
        applicants: Vec::new(),
        status: JobStatus::Open,
        deadline: Some(today() + Duration::days(14)),
    }
}

pub(super) fn evaluation(
    student_id: &StudentId,
    period_start: Option<NaiveDate>,
    score: f64,
    max_score: f64,
) -> EvaluationRecord {
    EvaluationRecord {
        student: student_id.clone(),
        trainer: trainer(),
        kind: "monthly".to_string(),
        period_start,
        period_end: period_start.map(|start| start + Duration::days(27)),
        score,
        max_score,
        recorded_at: None,
        created_at: Some(Utc.with_ymd_and_hms(2026, 8, 1, 9, 0, 0).unwrap()),
    }
}

pub(super) type MemoryService =
    PlacementService<MemoryStore, MemoryStore, MemoryStore, MemoryStore>;

pub(super) fn build_service() -> (MemoryService, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let service = PlacementService::new(
        store.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
        DEFAULT_MATCH_WEIGHTS,
    );
    (service, store)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

/// Repository stub that reports storage as offline for every call.
pub(super) struct UnavailableStore;

impl StudentRepository for UnavailableStore {
    fn fetch(&self, _id: &StudentId) -> Result<Option<StudentRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn all(&self) -> Result<Vec<StudentRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _record: StudentRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

impl JobRepository for UnavailableStore {
    fn fetch(&self, _id: &JobId) -> Result<Option<JobRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn save_with_application(
        &self,
        _job: JobRecord,
        _application: JobApplication,
    ) -> Result<JobApplication, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

impl EvaluationRepository for UnavailableStore {
    fn for_student(
        &self,
        _student: &StudentId,
    ) -> Result<Vec<EvaluationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

impl PlacementRequestRepository for UnavailableStore {
    fn fetch(&self, _id: &RequestId) -> Result<Option<PlacementRequest>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn pending_for(
        &self,
        _student: &StudentId,
    ) -> Result<Option<PlacementRequest>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn save_with_student(
        &self,
        _request: PlacementRequest,
        _student: StudentRecord,
    ) -> Result<PlacementRequest, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn delete_with_student(
        &self,
        _id: &RequestId,
        _student: StudentRecord,
    ) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}
