//! Proctoring session handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::proctoring::{
    CreateSessionRequest, EnvironmentCheckRequest, EnvironmentCheckResult,
    ReportViolationRequest, ReviewRequest, Session, SessionListQuery, SessionReport,
    SnapshotRequest, SnapshotResult, TerminateRequest, Violation,
};

use super::ApiResponse;

type Envelope<T> = Json<ApiResponse<T>>;

#[instrument(skip(state))]
pub async fn list_sessions(
    State(state): State<AppState>,
    Query(query): Query<SessionListQuery>,
) -> ApiResult<Envelope<Vec<Session>>> {
    Ok(ApiResponse::ok(state.proctoring.list_sessions(&query)))
}

#[instrument(skip(state, request))]
pub async fn create_session(
    State(state): State<AppState>,
    Json(request): Json<CreateSessionRequest>,
) -> ApiResult<(StatusCode, Envelope<Session>)> {
    let session = state.proctoring.create_session(request)?;
    Ok(ApiResponse::created(session))
}

#[instrument(skip(state))]
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Envelope<Session>> {
    Ok(ApiResponse::ok(state.proctoring.get_session(&session_id)?))
}

#[instrument(skip(state, request))]
pub async fn environment_check(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<EnvironmentCheckRequest>,
) -> ApiResult<Envelope<EnvironmentCheckResult>> {
    let result = state.proctoring.environment_check(&session_id, request)?;
    Ok(ApiResponse::ok(result))
}

#[instrument(skip(state))]
pub async fn start_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Envelope<Session>> {
    Ok(ApiResponse::ok(state.proctoring.start_session(&session_id)?))
}

#[instrument(skip(state, request))]
pub async fn report_violation(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<ReportViolationRequest>,
) -> ApiResult<(StatusCode, Envelope<Session>)> {
    let session = state.proctoring.report_violation(&session_id, request)?;
    Ok(ApiResponse::created(session))
}

#[instrument(skip(state))]
pub async fn list_violations(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Envelope<Vec<Violation>>> {
    Ok(ApiResponse::ok(state.proctoring.list_violations(&session_id)?))
}

#[instrument(skip(state, request))]
pub async fn upload_snapshot(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<SnapshotRequest>,
) -> ApiResult<(StatusCode, Envelope<SnapshotResult>)> {
    let result = state.proctoring.upload_snapshot(&session_id, request)?;
    Ok(ApiResponse::created(result))
}

#[instrument(skip(state))]
pub async fn complete_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Envelope<Session>> {
    Ok(ApiResponse::ok(state.proctoring.complete_session(&session_id)?))
}

/// Terminate a session. The body is optional.
#[instrument(skip(state, request))]
pub async fn terminate_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    request: Option<Json<TerminateRequest>>,
) -> ApiResult<Envelope<Session>> {
    let request = request.map(|Json(r)| r).unwrap_or_default();
    let session = state.proctoring.terminate_session(&session_id, request)?;
    Ok(ApiResponse::ok(session))
}

#[instrument(skip(state, request))]
pub async fn review_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<ReviewRequest>,
) -> ApiResult<Envelope<Session>> {
    let session = state.proctoring.review_session(&session_id, request)?;
    Ok(ApiResponse::ok(session))
}

#[instrument(skip(state))]
pub async fn session_report(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Envelope<SessionReport>> {
    Ok(ApiResponse::ok(state.proctoring.report(&session_id)?))
}
