use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{JobId, PlacementError, RequestId, StudentId, TrainerId};
use super::ranking::{RankOptions, DEFAULT_RANK_LIMIT};
use super::repository::{
    EvaluationRepository, JobRepository, PlacementRequestRepository, RepositoryError,
    StudentRepository,
};
use super::scoring::MatchWeights;
use super::service::{PlacementService, PlacementServiceError};

/// Router builder exposing the placement matching and eligibility endpoints.
pub fn placement_router<S, J, E, P>(service: Arc<PlacementService<S, J, E, P>>) -> Router
where
    S: StudentRepository + 'static,
    J: JobRepository + 'static,
    E: EvaluationRepository + 'static,
    P: PlacementRequestRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/placements/jobs/:job_id/rank",
            post(rank_handler::<S, J, E, P>),
        )
        .route(
            "/api/v1/placements/jobs/:job_id/apply",
            post(apply_handler::<S, J, E, P>),
        )
        .route(
            "/api/v1/placements/jobs/:job_id/match/:student_id",
            get(explain_handler::<S, J, E, P>),
        )
        .route(
            "/api/v1/placements/requests",
            post(request_handler::<S, J, E, P>),
        )
        .route(
            "/api/v1/placements/requests/:request_id/review",
            post(review_handler::<S, J, E, P>),
        )
        .route(
            "/api/v1/placements/requests/:request_id",
            delete(cancel_handler::<S, J, E, P>),
        )
        .route(
            "/api/v1/placements/students/:student_id/score",
            get(score_handler::<S, J, E, P>),
        )
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RankRequest {
    #[serde(default)]
    weights: Option<MatchWeights>,
    #[serde(default)]
    limit: Option<usize>,
    #[serde(default)]
    include_explanation: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApplyRequest {
    student_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PlacementRequestBody {
    student_id: String,
    trainer_id: String,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum ReviewDecision {
    Approve,
    Reject,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReviewRequest {
    decision: ReviewDecision,
    #[serde(default)]
    remarks: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CancelRequest {
    trainer_id: String,
}

pub(crate) async fn rank_handler<S, J, E, P>(
    State(service): State<Arc<PlacementService<S, J, E, P>>>,
    Path(job_id): Path<String>,
    axum::Json(body): axum::Json<RankRequest>,
) -> Response
where
    S: StudentRepository + 'static,
    J: JobRepository + 'static,
    E: EvaluationRepository + 'static,
    P: PlacementRequestRepository + 'static,
{
    let options = RankOptions {
        weights: body.weights,
        limit: body.limit.unwrap_or(DEFAULT_RANK_LIMIT),
        include_explanation: body.include_explanation,
    };

    match service.rank_candidates(&JobId(job_id), options) {
        Ok(candidates) => (StatusCode::OK, axum::Json(candidates)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn apply_handler<S, J, E, P>(
    State(service): State<Arc<PlacementService<S, J, E, P>>>,
    Path(job_id): Path<String>,
    axum::Json(body): axum::Json<ApplyRequest>,
) -> Response
where
    S: StudentRepository + 'static,
    J: JobRepository + 'static,
    E: EvaluationRepository + 'static,
    P: PlacementRequestRepository + 'static,
{
    match service.apply_to_job(&JobId(job_id), &StudentId(body.student_id)) {
        Ok(application) => (StatusCode::CREATED, axum::Json(application)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn explain_handler<S, J, E, P>(
    State(service): State<Arc<PlacementService<S, J, E, P>>>,
    Path((job_id, student_id)): Path<(String, String)>,
) -> Response
where
    S: StudentRepository + 'static,
    J: JobRepository + 'static,
    E: EvaluationRepository + 'static,
    P: PlacementRequestRepository + 'static,
{
    match service.score_match(&StudentId(student_id), &JobId(job_id), None, true) {
        Ok(outcome) => (StatusCode::OK, axum::Json(outcome)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn request_handler<S, J, E, P>(
    State(service): State<Arc<PlacementService<S, J, E, P>>>,
    axum::Json(body): axum::Json<PlacementRequestBody>,
) -> Response
where
    S: StudentRepository + 'static,
    J: JobRepository + 'static,
    E: EvaluationRepository + 'static,
    P: PlacementRequestRepository + 'static,
{
    match service.request_placement(&StudentId(body.student_id), &TrainerId(body.trainer_id)) {
        Ok(request) => (StatusCode::CREATED, axum::Json(request)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn review_handler<S, J, E, P>(
    State(service): State<Arc<PlacementService<S, J, E, P>>>,
    Path(request_id): Path<String>,
    axum::Json(body): axum::Json<ReviewRequest>,
) -> Response
where
    S: StudentRepository + 'static,
    J: JobRepository + 'static,
    E: EvaluationRepository + 'static,
    P: PlacementRequestRepository + 'static,
{
    let id = RequestId(request_id);
    let result = match body.decision {
        ReviewDecision::Approve => service.approve_request(&id, body.remarks),
        ReviewDecision::Reject => service.reject_request(&id, body.remarks),
    };

    match result {
        Ok(request) => (StatusCode::OK, axum::Json(request)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn cancel_handler<S, J, E, P>(
    State(service): State<Arc<PlacementService<S, J, E, P>>>,
    Path(request_id): Path<String>,
    axum::Json(body): axum::Json<CancelRequest>,
) -> Response
where
    S: StudentRepository + 'static,
    J: JobRepository + 'static,
    E: EvaluationRepository + 'static,
    P: PlacementRequestRepository + 'static,
{
    match service.cancel_request(&RequestId(request_id), &TrainerId(body.trainer_id)) {
        Ok(()) => (
            StatusCode::OK,
            axum::Json(json!({ "status": "cancelled" })),
        )
            .into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn score_handler<S, J, E, P>(
    State(service): State<Arc<PlacementService<S, J, E, P>>>,
    Path(student_id): Path<String>,
) -> Response
where
    S: StudentRepository + 'static,
    J: JobRepository + 'static,
    E: EvaluationRepository + 'static,
    P: PlacementRequestRepository + 'static,
{
    match service.student_score_view(&StudentId(student_id)) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

/// Canonical status mapping for workflow failures, shared with the top-level
/// application error.
pub(crate) fn error_status(error: &PlacementServiceError) -> StatusCode {
    match error {
        PlacementServiceError::Placement(PlacementError::NotFound)
        | PlacementServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        PlacementServiceError::Placement(PlacementError::InvalidState(_)) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        PlacementServiceError::Placement(PlacementError::Conflict(_))
        | PlacementServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        PlacementServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn error_response(error: PlacementServiceError) -> Response {
    let payload = json!({ "error": error.to_string() });
    (error_status(&error), axum::Json(payload)).into_response()
}
