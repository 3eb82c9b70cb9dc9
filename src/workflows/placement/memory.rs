//! In-memory store backing the demo binary and the integration tests. A
//! single mutex guards all collections, so the compound saves required by the
//! eligibility workflow and the application flow are genuinely atomic.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use super::domain::{
    EvaluationRecord, JobId, JobRecord, PlacementRequest, RequestId, RequestStatus, StudentId,
    StudentRecord,
};
use super::repository::{
    EvaluationRepository, JobApplication, JobRepository, PlacementRequestRepository,
    RepositoryError, StudentRepository,
};

#[derive(Default)]
struct MemoryState {
    students: HashMap<StudentId, StudentRecord>,
    jobs: HashMap<JobId, JobRecord>,
    evaluations: Vec<EvaluationRecord>,
    requests: HashMap<RequestId, PlacementRequest>,
    applications: Vec<JobApplication>,
}

/// Single-process store implementing every placement repository trait.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> Result<MutexGuard<'_, MemoryState>, RepositoryError> {
        self.state
            .lock()
            .map_err(|_| RepositoryError::Unavailable("placement store mutex poisoned".to_string()))
    }

    pub fn seed_student(&self, student: StudentRecord) -> Result<(), RepositoryError> {
        let mut state = self.state()?;
        if state.students.contains_key(&student.id) {
            return Err(RepositoryError::Conflict);
        }
        state.students.insert(student.id.clone(), student);
        Ok(())
    }

    pub fn seed_job(&self, job: JobRecord) -> Result<(), RepositoryError> {
        let mut state = self.state()?;
        if state.jobs.contains_key(&job.id) {
            return Err(RepositoryError::Conflict);
        }
        state.jobs.insert(job.id.clone(), job);
        Ok(())
    }

    /// Evaluations are unique per (student, kind, period_start).
    pub fn seed_evaluation(&self, evaluation: EvaluationRecord) -> Result<(), RepositoryError> {
        let mut state = self.state()?;
        let duplicate = state.evaluations.iter().any(|existing| {
            existing.student == evaluation.student
                && existing.kind == evaluation.kind
                && existing.period_start == evaluation.period_start
        });
        if duplicate {
            return Err(RepositoryError::Conflict);
        }
        state.evaluations.push(evaluation);
        Ok(())
    }

    pub fn applications(&self) -> Result<Vec<JobApplication>, RepositoryError> {
        Ok(self.state()?.applications.clone())
    }
}

impl StudentRepository for MemoryStore {
    fn fetch(&self, id: &StudentId) -> Result<Option<StudentRecord>, RepositoryError> {
        Ok(self.state()?.students.get(id).cloned())
    }

    fn all(&self) -> Result<Vec<StudentRecord>, RepositoryError> {
        let mut students: Vec<StudentRecord> = self.state()?.students.values().cloned().collect();
        students.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(students)
    }

    fn update(&self, record: StudentRecord) -> Result<(), RepositoryError> {
        let mut state = self.state()?;
        if !state.students.contains_key(&record.id) {
            return Err(RepositoryError::NotFound);
        }
        state.students.insert(record.id.clone(), record);
        Ok(())
    }
}

impl JobRepository for MemoryStore {
    fn fetch(&self, id: &JobId) -> Result<Option<JobRecord>, RepositoryError> {
        Ok(self.state()?.jobs.get(id).cloned())
    }

    fn save_with_application(
        &self,
        job: JobRecord,
        application: JobApplication,
    ) -> Result<JobApplication, RepositoryError> {
        let mut state = self.state()?;
        let duplicate = state.applications.iter().any(|existing| {
            existing.job == application.job && existing.student == application.student
        });
        if duplicate {
            return Err(RepositoryError::Conflict);
        }
        state.jobs.insert(job.id.clone(), job);
        state.applications.push(application.clone());
        Ok(application)
    }
}

impl EvaluationRepository for MemoryStore {
    fn for_student(&self, student: &StudentId) -> Result<Vec<EvaluationRecord>, RepositoryError> {
        let mut evaluations: Vec<EvaluationRecord> = self
            .state()?
            .evaluations
            .iter()
            .filter(|evaluation| &evaluation.student == student)
            .cloned()
            .collect();
        evaluations.sort_by_key(EvaluationRecord::bucket_date);
        Ok(evaluations)
    }
}

impl PlacementRequestRepository for MemoryStore {
    fn fetch(&self, id: &RequestId) -> Result<Option<PlacementRequest>, RepositoryError> {
        Ok(self.state()?.requests.get(id).cloned())
    }

    fn pending_for(
        &self,
        student: &StudentId,
    ) -> Result<Option<PlacementRequest>, RepositoryError> {
        Ok(self
            .state()?
            .requests
            .values()
            .find(|request| {
                &request.student == student && request.status == RequestStatus::Pending
            })
            .cloned())
    }

    fn save_with_student(
        &self,
        request: PlacementRequest,
        student: StudentRecord,
    ) -> Result<PlacementRequest, RepositoryError> {
        let mut state = self.state()?;
        if request.status == RequestStatus::Pending {
            let duplicate = state.requests.values().any(|existing| {
                existing.id != request.id
                    && existing.student == request.student
                    && existing.status == RequestStatus::Pending
            });
            if duplicate {
                return Err(RepositoryError::Conflict);
            }
        }
        state.requests.insert(request.id.clone(), request.clone());
        state.students.insert(student.id.clone(), student);
        Ok(request)
    }

    fn delete_with_student(
        &self,
        id: &RequestId,
        student: StudentRecord,
    ) -> Result<(), RepositoryError> {
        let mut state = self.state()?;
        if state.requests.remove(id).is_none() {
            return Err(RepositoryError::NotFound);
        }
        state.students.insert(student.id.clone(), student);
        Ok(())
    }
}
