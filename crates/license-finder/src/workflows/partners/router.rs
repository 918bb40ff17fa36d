use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use super::domain::{
    CandidateFeedbackInput, CandidateId, NewCandidate, NewEvidenceLink, NewProject, ProjectFeedbackInput,
    ProjectId,
};
use super::judgment::JudgmentSource;
use super::repository::ProjectRepository;
use super::service::{DiscoveryServiceError, PartnerDiscoveryService};

type SharedService<R, J> = Arc<PartnerDiscoveryService<R, J>>;

/// Router builder exposing project, candidate, scoring and outreach endpoints.
pub fn partner_router<R, J>(service: SharedService<R, J>) -> Router
where
    R: ProjectRepository + 'static,
    J: JudgmentSource + 'static,
{
    Router::new()
        .route(
            "/api/v1/projects",
            get(list_projects_handler::<R, J>).post(create_project_handler::<R, J>),
        )
        .route(
            "/api/v1/projects/:project_id",
            get(project_handler::<R, J>).put(update_project_handler::<R, J>),
        )
        .route(
            "/api/v1/projects/:project_id/candidates",
            post(add_candidate_handler::<R, J>).delete(clear_candidates_handler::<R, J>),
        )
        .route(
            "/api/v1/projects/:project_id/candidates/import",
            post(import_roster_handler::<R, J>),
        )
        .route(
            "/api/v1/projects/:project_id/candidates/delete",
            post(delete_candidates_handler::<R, J>),
        )
        .route(
            "/api/v1/projects/:project_id/score",
            post(score_handler::<R, J>),
        )
        .route(
            "/api/v1/projects/:project_id/results",
            get(results_handler::<R, J>),
        )
        .route(
            "/api/v1/projects/:project_id/export.csv",
            get(export_handler::<R, J>),
        )
        .route(
            "/api/v1/projects/:project_id/outreach",
            post(tier_a_outreach_handler::<R, J>),
        )
        .route(
            "/api/v1/projects/:project_id/feedback",
            put(project_feedback_handler::<R, J>),
        )
        .route(
            "/api/v1/candidates/:candidate_id",
            delete(delete_candidate_handler::<R, J>),
        )
        .route(
            "/api/v1/candidates/:candidate_id/evidence",
            post(add_evidence_handler::<R, J>),
        )
        .route(
            "/api/v1/candidates/:candidate_id/outreach",
            post(candidate_outreach_handler::<R, J>),
        )
        .route(
            "/api/v1/candidates/:candidate_id/feedback",
            put(candidate_feedback_handler::<R, J>),
        )
        .with_state(service)
}

/// Optional subset for a scoring run; absent or empty means the whole project.
#[derive(Debug, Default, Deserialize)]
pub struct ScoreRequest {
    #[serde(default)]
    pub candidate_ids: Vec<CandidateId>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteCandidatesRequest {
    pub candidate_ids: Vec<CandidateId>,
}

pub(crate) fn error_response(err: DiscoveryServiceError) -> Response {
    let status = match &err {
        DiscoveryServiceError::ProjectNotFound { .. }
        | DiscoveryServiceError::CandidateNotFound { .. } => StatusCode::NOT_FOUND,
        DiscoveryServiceError::InvalidUrl(_)
        | DiscoveryServiceError::InvalidRating(_)
        | DiscoveryServiceError::NotScored { .. }
        | DiscoveryServiceError::Roster(_) => StatusCode::UNPROCESSABLE_ENTITY,
        DiscoveryServiceError::Judgment(_) | DiscoveryServiceError::Validation(_) => {
            StatusCode::BAD_GATEWAY
        }
        DiscoveryServiceError::Export(_) | DiscoveryServiceError::Repository(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    if status.is_server_error() {
        error!(error = %err, "request failed");
    }
    let payload = json!({
        "error": err.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}

fn ok_json<T: serde::Serialize>(status: StatusCode, value: T) -> Response {
    (status, axum::Json(value)).into_response()
}

fn join_failure(err: tokio::task::JoinError) -> Response {
    error!(error = %err, "background task failed");
    let payload = json!({
        "error": "background task failed",
    });
    (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
}

pub(crate) async fn list_projects_handler<R, J>(
    State(service): State<SharedService<R, J>>,
) -> Response
where
    R: ProjectRepository + 'static,
    J: JudgmentSource + 'static,
{
    match service.list_projects() {
        Ok(projects) => ok_json(StatusCode::OK, projects),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn create_project_handler<R, J>(
    State(service): State<SharedService<R, J>>,
    axum::Json(input): axum::Json<NewProject>,
) -> Response
where
    R: ProjectRepository + 'static,
    J: JudgmentSource + 'static,
{
    match service.create_project(input) {
        Ok(project) => ok_json(StatusCode::CREATED, project),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn project_handler<R, J>(
    State(service): State<SharedService<R, J>>,
    Path(project_id): Path<String>,
) -> Response
where
    R: ProjectRepository + 'static,
    J: JudgmentSource + 'static,
{
    match service.project_overview(&ProjectId(project_id)) {
        Ok(overview) => ok_json(StatusCode::OK, overview),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn update_project_handler<R, J>(
    State(service): State<SharedService<R, J>>,
    Path(project_id): Path<String>,
    axum::Json(input): axum::Json<NewProject>,
) -> Response
where
    R: ProjectRepository + 'static,
    J: JudgmentSource + 'static,
{
    match service.update_project(&ProjectId(project_id), input) {
        Ok(project) => ok_json(StatusCode::OK, project),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn add_candidate_handler<R, J>(
    State(service): State<SharedService<R, J>>,
    Path(project_id): Path<String>,
    axum::Json(input): axum::Json<NewCandidate>,
) -> Response
where
    R: ProjectRepository + 'static,
    J: JudgmentSource + 'static,
{
    match service.add_candidate(&ProjectId(project_id), input) {
        Ok(Some(record)) => ok_json(StatusCode::CREATED, record),
        Ok(None) => ok_json(
            StatusCode::OK,
            json!({
                "skipped": true,
                "reason": "blank name or on the exclude list",
            }),
        ),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn import_roster_handler<R, J>(
    State(service): State<SharedService<R, J>>,
    Path(project_id): Path<String>,
    body: String,
) -> Response
where
    R: ProjectRepository + 'static,
    J: JudgmentSource + 'static,
{
    match service.import_roster(&ProjectId(project_id), body.as_bytes()) {
        Ok(summary) => ok_json(StatusCode::CREATED, summary),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn delete_candidates_handler<R, J>(
    State(service): State<SharedService<R, J>>,
    Path(project_id): Path<String>,
    axum::Json(request): axum::Json<DeleteCandidatesRequest>,
) -> Response
where
    R: ProjectRepository + 'static,
    J: JudgmentSource + 'static,
{
    match service.delete_candidates(&ProjectId(project_id), &request.candidate_ids) {
        Ok(removed) => ok_json(StatusCode::OK, json!({ "removed": removed })),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn clear_candidates_handler<R, J>(
    State(service): State<SharedService<R, J>>,
    Path(project_id): Path<String>,
) -> Response
where
    R: ProjectRepository + 'static,
    J: JudgmentSource + 'static,
{
    match service.clear_candidates(&ProjectId(project_id)) {
        Ok(removed) => ok_json(StatusCode::OK, json!({ "removed": removed })),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn delete_candidate_handler<R, J>(
    State(service): State<SharedService<R, J>>,
    Path(candidate_id): Path<String>,
) -> Response
where
    R: ProjectRepository + 'static,
    J: JudgmentSource + 'static,
{
    match service.delete_candidate(&CandidateId(candidate_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn add_evidence_handler<R, J>(
    State(service): State<SharedService<R, J>>,
    Path(candidate_id): Path<String>,
    axum::Json(input): axum::Json<NewEvidenceLink>,
) -> Response
where
    R: ProjectRepository + 'static,
    J: JudgmentSource + 'static,
{
    match service.add_evidence(&CandidateId(candidate_id), input) {
        Ok(link) => ok_json(StatusCode::CREATED, link),
        Err(err) => error_response(err),
    }
}

/// Scoring blocks on the judgment source and paces calls, so it runs off the async workers.
pub(crate) async fn score_handler<R, J>(
    State(service): State<SharedService<R, J>>,
    Path(project_id): Path<String>,
    request: Option<axum::Json<ScoreRequest>>,
) -> Response
where
    R: ProjectRepository + 'static,
    J: JudgmentSource + 'static,
{
    let ids = request.map(|axum::Json(body)| body.candidate_ids).unwrap_or_default();
    let project_id = ProjectId(project_id);
    let outcome = tokio::task::spawn_blocking(move || {
        if ids.is_empty() {
            service.score_project(&project_id)
        } else {
            service.score_candidates(&project_id, &ids)
        }
    })
    .await;

    match outcome {
        Ok(Ok(summary)) => ok_json(StatusCode::OK, summary),
        Ok(Err(err)) => error_response(err),
        Err(err) => join_failure(err),
    }
}

pub(crate) async fn results_handler<R, J>(
    State(service): State<SharedService<R, J>>,
    Path(project_id): Path<String>,
) -> Response
where
    R: ProjectRepository + 'static,
    J: JudgmentSource + 'static,
{
    match service.results(&ProjectId(project_id)) {
        Ok(results) => ok_json(StatusCode::OK, results),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn export_handler<R, J>(
    State(service): State<SharedService<R, J>>,
    Path(project_id): Path<String>,
) -> Response
where
    R: ProjectRepository + 'static,
    J: JudgmentSource + 'static,
{
    match service.export_csv(&ProjectId(project_id)) {
        Ok(file) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", file.filename),
                ),
            ],
            file.body,
        )
            .into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn tier_a_outreach_handler<R, J>(
    State(service): State<SharedService<R, J>>,
    Path(project_id): Path<String>,
) -> Response
where
    R: ProjectRepository + 'static,
    J: JudgmentSource + 'static,
{
    let project_id = ProjectId(project_id);
    let outcome =
        tokio::task::spawn_blocking(move || service.draft_outreach_for_tier_a(&project_id)).await;
    match outcome {
        Ok(Ok(summary)) => ok_json(StatusCode::OK, summary),
        Ok(Err(err)) => error_response(err),
        Err(err) => join_failure(err),
    }
}

pub(crate) async fn candidate_outreach_handler<R, J>(
    State(service): State<SharedService<R, J>>,
    Path(candidate_id): Path<String>,
) -> Response
where
    R: ProjectRepository + 'static,
    J: JudgmentSource + 'static,
{
    let candidate_id = CandidateId(candidate_id);
    let outcome = tokio::task::spawn_blocking(move || service.draft_outreach(&candidate_id)).await;
    match outcome {
        Ok(Ok(draft)) => ok_json(StatusCode::OK, draft),
        Ok(Err(err)) => error_response(err),
        Err(err) => join_failure(err),
    }
}

pub(crate) async fn project_feedback_handler<R, J>(
    State(service): State<SharedService<R, J>>,
    Path(project_id): Path<String>,
    axum::Json(input): axum::Json<ProjectFeedbackInput>,
) -> Response
where
    R: ProjectRepository + 'static,
    J: JudgmentSource + 'static,
{
    match service.save_project_feedback(&ProjectId(project_id), input) {
        Ok(feedback) => ok_json(StatusCode::OK, feedback),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn candidate_feedback_handler<R, J>(
    State(service): State<SharedService<R, J>>,
    Path(candidate_id): Path<String>,
    axum::Json(input): axum::Json<CandidateFeedbackInput>,
) -> Response
where
    R: ProjectRepository + 'static,
    J: JudgmentSource + 'static,
{
    match service.save_candidate_feedback(&CandidateId(candidate_id), input) {
        Ok(feedback) => ok_json(StatusCode::OK, feedback),
        Err(err) => error_response(err),
    }
}
