//! End-to-end specifications for the placement eligibility and matching
//! workflow, exercised through the public service facade and HTTP router.

mod common {
    use std::sync::Arc;

    use chrono::{Duration, NaiveDate, Utc};

    use placement_match::workflows::placement::{
        EvaluationRecord, JobId, JobRecord, JobStatus, MemoryStore, PlacementService,
        PlacementStatus, ProfileApprovalStatus, SkillEntry, SkillRequirement, StudentId,
        StudentRecord, TestEntry, TrainerId, TrainerRemark, DEFAULT_MATCH_WEIGHTS,
    };

    pub(super) type Service =
        PlacementService<MemoryStore, MemoryStore, MemoryStore, MemoryStore>;

    pub(super) fn trainer() -> TrainerId {
        TrainerId("trainer-01".to_string())
    }

    pub(super) fn build_service() -> (Service, Arc<MemoryStore>) {
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

    pub(super) fn candidate(suffix: &str) -> StudentRecord {
        let today = Utc::now().date_naive();
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
                    tags: Vec::new(),
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
        record.record_test(TestEntry {
            title: "Mock interview".to_string(),
            taken_on: today - Duration::days(6),
            score: 87.0,
            max_score: 100.0,
            subject_breakdown: Default::default(),
        });
        record.record_trainer_remark(TrainerRemark {
            trainer: trainer(),
            noted_on: today - Duration::days(3),
            remark: "interview ready".to_string(),
            rating: 5,
        });
        record
    }

    pub(super) fn posting(suffix: &str) -> JobRecord {
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
            deadline: Some(Utc::now().date_naive() + Duration::days(21)),
        }
    }

    pub(super) fn monthly_evaluation(
        student: &StudentId,
        period_start: Option<NaiveDate>,
        score: f64,
    ) -> EvaluationRecord {
        EvaluationRecord {
            student: student.clone(),
            trainer: trainer(),
            kind: "monthly".to_string(),
            period_start,
            period_end: period_start.map(|start| start + Duration::days(27)),
            score,
            max_score: 100.0,
            recorded_at: None,
            created_at: Some(Utc::now()),
        }
    }
}

use common::*;
use placement_match::workflows::placement::{
    placement_router, PlacementError, PlacementServiceError, PlacementStatus, RankOptions,
    StudentRepository,
};
use std::sync::Arc;
use tower::ServiceExt;

#[test]
fn full_lifecycle_from_request_to_application() {
    let (service, store) = build_service();
    let student = candidate("lifecycle");
    store.seed_student(student.clone()).expect("seeded");
    let job = posting("lifecycle");
    store.seed_job(job.clone()).expect("seeded");

    // ineligible until the coordinator approves
    let ranked = service
        .rank_candidates(&job.id, RankOptions::default())
        .expect("ranking succeeds");
    assert!(ranked.is_empty());

    let request = service
        .request_placement(&student.id, &trainer())
        .expect("request opens");
    service
        .approve_request(&request.id, Some("cleared for placement".to_string()))
        .expect("approval succeeds");

    let ranked = service
        .rank_candidates(&job.id, RankOptions::default())
        .expect("ranking succeeds");
    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].student, student.id);

    let application = service
        .apply_to_job(&job.id, &student.id)
        .expect("application succeeds");
    assert_eq!(application.match_score, ranked[0].score);

    // applicants disappear from subsequent rankings
    let ranked = service
        .rank_candidates(&job.id, RankOptions::default())
        .expect("ranking succeeds");
    assert!(ranked.is_empty());
}

#[test]
fn eligibility_gate_never_leaves_records_disagreeing() {
    let (service, store) = build_service();
    let student = candidate("atomic");
    store.seed_student(student.clone()).expect("seeded");

    let request = service
        .request_placement(&student.id, &trainer())
        .expect("request opens");

    // a duplicate attempt fails and leaves the original state intact
    match service.request_placement(&student.id, &trainer()) {
        Err(PlacementServiceError::Placement(PlacementError::Conflict(_))) => {}
        other => panic!("expected conflict, got {other:?}"),
    }
    let stored = StudentRepository::fetch(store.as_ref(), &student.id)
        .expect("fetch succeeds")
        .expect("student present");
    assert_eq!(stored.placement_status, PlacementStatus::Pending);

    service
        .reject_request(&request.id, Some("not yet".to_string()))
        .expect("rejection succeeds");
    let stored = StudentRepository::fetch(store.as_ref(), &student.id)
        .expect("fetch succeeds")
        .expect("student present");
    assert_eq!(stored.placement_status, PlacementStatus::Rejected);
    assert!(!stored.placement_eligible);
}

#[test]
fn application_gate_reconciles_monthly_evaluations() {
    let (service, store) = build_service();
    let student = candidate("reconcile");
    store.seed_student(student.clone()).expect("seeded");

    let request = service
        .request_placement(&student.id, &trainer())
        .expect("request opens");
    service
        .approve_request(&request.id, None)
        .expect("approval succeeds");

    let january = chrono::NaiveDate::from_ymd_opt(2026, 1, 12);
    let february = chrono::NaiveDate::from_ymd_opt(2026, 2, 9);
    store
        .seed_evaluation(monthly_evaluation(&student.id, january, 80.0))
        .expect("seeded");
    store
        .seed_evaluation(monthly_evaluation(
            &student.id,
            january.map(|d| d + chrono::Duration::days(10)),
            100.0,
        ))
        .expect("seeded");
    store
        .seed_evaluation(monthly_evaluation(&student.id, february, 50.0))
        .expect("seeded");

    // bucketed mean is 70: month means (90, 50), not a flat mean of 76.67
    let effective = service
        .effective_score(&student.id)
        .expect("reconciliation works");
    assert!((effective - 70.0).abs() < f64::EPSILON);

    // a posting demanding more than the bucketed mean refuses the application
    let mut job = posting("reconcile");
    job.min_aggregate_score = 75;
    store.seed_job(job.clone()).expect("seeded");
    match service.apply_to_job(&job.id, &student.id) {
        Err(PlacementServiceError::Placement(PlacementError::InvalidState(_))) => {}
        other => panic!("expected invalid state, got {other:?}"),
    }
}

#[tokio::test]
async fn http_surface_drives_the_same_workflow() {
    let (service, store) = build_service();
    store
        .seed_student(candidate("http"))
        .expect("seeded");
    store.seed_job(posting("http")).expect("seeded");
    let router = placement_router(Arc::new(service));

    let created = router
        .clone()
        .oneshot(
            axum::http::Request::post("/api/v1/placements/requests")
                .header(axum::http::header::CONTENT_TYPE, "application/json")
                .body(axum::body::Body::from(
                    serde_json::json!({
                        "student_id": "stu-http",
                        "trainer_id": "trainer-01"
                    })
                    .to_string(),
                ))
                .expect("request builds"),
        )
        .await
        .expect("route executes");
    assert_eq!(created.status(), axum::http::StatusCode::CREATED);

    let body = axum::body::to_bytes(created.into_body(), 64 * 1024)
        .await
        .expect("read body");
    let payload: serde_json::Value = serde_json::from_slice(&body).expect("json payload");
    let request_id = payload
        .get("id")
        .and_then(serde_json::Value::as_str)
        .expect("request id present")
        .to_string();

    let reviewed = router
        .clone()
        .oneshot(
            axum::http::Request::post(format!(
                "/api/v1/placements/requests/{request_id}/review"
            ))
            .header(axum::http::header::CONTENT_TYPE, "application/json")
            .body(axum::body::Body::from(
                serde_json::json!({ "decision": "approve" }).to_string(),
            ))
            .expect("request builds"),
        )
        .await
        .expect("route executes");
    assert_eq!(reviewed.status(), axum::http::StatusCode::OK);

    let ranked = router
        .oneshot(
            axum::http::Request::post("/api/v1/placements/jobs/job-http/rank")
                .header(axum::http::header::CONTENT_TYPE, "application/json")
                .body(axum::body::Body::from("{}"))
                .expect("request builds"),
        )
        .await
        .expect("route executes");
    assert_eq!(ranked.status(), axum::http::StatusCode::OK);

    let body = axum::body::to_bytes(ranked.into_body(), 64 * 1024)
        .await
        .expect("read body");
    let payload: serde_json::Value = serde_json::from_slice(&body).expect("json payload");
    assert_eq!(payload.as_array().map(Vec::len), Some(1));
}
