//! Assessment handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::assessment::{
    Assessment, AssessmentListQuery, AssessmentStats, CandidateAssessment,
    CreateAssessmentRequest, SubmitAssessmentRequest, Submission, UpdateAssessmentRequest,
};

use super::{ApiResponse, Deleted};

type Envelope<T> = Json<ApiResponse<T>>;

#[instrument(skip(state))]
pub async fn list_assessments(
    State(state): State<AppState>,
    Query(query): Query<AssessmentListQuery>,
) -> ApiResult<Envelope<Vec<Assessment>>> {
    Ok(ApiResponse::ok(state.assessments.list_assessments(&query)))
}

#[instrument(skip(state, request))]
pub async fn create_assessment(
    State(state): State<AppState>,
    Json(request): Json<CreateAssessmentRequest>,
) -> ApiResult<(StatusCode, Envelope<Assessment>)> {
    let assessment = state.assessments.create_assessment(request)?;
    Ok(ApiResponse::created(assessment))
}

#[instrument(skip(state))]
pub async fn get_assessment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Envelope<Assessment>> {
    Ok(ApiResponse::ok(state.assessments.get_assessment(&id)?))
}

#[instrument(skip(state, request))]
pub async fn update_assessment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateAssessmentRequest>,
) -> ApiResult<Envelope<Assessment>> {
    let assessment = state.assessments.update_assessment(&id, request)?;
    Ok(ApiResponse::ok(assessment))
}

#[instrument(skip(state))]
pub async fn delete_assessment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Envelope<Deleted>> {
    state.assessments.delete_assessment(&id)?;
    Ok(ApiResponse::ok(Deleted::yes()))
}

#[instrument(skip(state))]
pub async fn publish_assessment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Envelope<Assessment>> {
    Ok(ApiResponse::ok(state.assessments.publish_assessment(&id)?))
}

/// Candidate view of a published assessment, without answer keys.
#[instrument(skip(state))]
pub async fn take_assessment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Envelope<CandidateAssessment>> {
    Ok(ApiResponse::ok(state.assessments.candidate_view(&id)?))
}

#[instrument(skip(state, request))]
pub async fn submit_assessment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<SubmitAssessmentRequest>,
) -> ApiResult<(StatusCode, Envelope<Submission>)> {
    let submission = state.assessments.submit(&id, request)?;
    Ok(ApiResponse::created(submission))
}

#[instrument(skip(state))]
pub async fn list_submissions(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Envelope<Vec<Submission>>> {
    Ok(ApiResponse::ok(state.assessments.list_submissions(&id)?))
}

#[instrument(skip(state))]
pub async fn get_submission(
    State(state): State<AppState>,
    Path((id, submission_id)): Path<(String, String)>,
) -> ApiResult<Envelope<Submission>> {
    let submission = state.assessments.get_submission(&id, &submission_id)?;
    Ok(ApiResponse::ok(submission))
}

#[instrument(skip(state))]
pub async fn assessment_stats(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Envelope<AssessmentStats>> {
    Ok(ApiResponse::ok(state.assessments.stats(&id)?))
}
