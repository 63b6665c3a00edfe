//! Team and candidate feedback handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;

use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::collaboration::{
    AddMemberRequest, Comment, CreateCommentRequest, CreateTeamRequest, Evaluation,
    EvaluationSummary, SubmitEvaluationRequest, Team, UpdateMemberRequest,
};

use super::{ApiResponse, Deleted};

type Envelope<T> = Json<ApiResponse<T>>;

#[instrument(skip(state))]
pub async fn list_teams(State(state): State<AppState>) -> ApiResult<Envelope<Vec<Team>>> {
    Ok(ApiResponse::ok(state.collaboration.list_teams()))
}

#[instrument(skip(state, request))]
pub async fn create_team(
    State(state): State<AppState>,
    Json(request): Json<CreateTeamRequest>,
) -> ApiResult<(StatusCode, Envelope<Team>)> {
    Ok(ApiResponse::created(state.collaboration.create_team(request)?))
}

#[instrument(skip(state))]
pub async fn get_team(
    State(state): State<AppState>,
    Path(team_id): Path<String>,
) -> ApiResult<Envelope<Team>> {
    Ok(ApiResponse::ok(state.collaboration.get_team(&team_id)?))
}

#[instrument(skip(state))]
pub async fn delete_team(
    State(state): State<AppState>,
    Path(team_id): Path<String>,
) -> ApiResult<Envelope<Deleted>> {
    state.collaboration.delete_team(&team_id)?;
    Ok(ApiResponse::ok(Deleted::yes()))
}

#[instrument(skip(state, request))]
pub async fn add_member(
    State(state): State<AppState>,
    Path(team_id): Path<String>,
    Json(request): Json<AddMemberRequest>,
) -> ApiResult<(StatusCode, Envelope<Team>)> {
    let team = state.collaboration.add_member(&team_id, request)?;
    Ok(ApiResponse::created(team))
}

#[instrument(skip(state, request))]
pub async fn update_member(
    State(state): State<AppState>,
    Path((team_id, user_id)): Path<(String, String)>,
    Json(request): Json<UpdateMemberRequest>,
) -> ApiResult<Envelope<Team>> {
    let team = state
        .collaboration
        .update_member(&team_id, &user_id, request)?;
    Ok(ApiResponse::ok(team))
}

#[instrument(skip(state))]
pub async fn remove_member(
    State(state): State<AppState>,
    Path((team_id, user_id)): Path<(String, String)>,
) -> ApiResult<Envelope<Team>> {
    let team = state.collaboration.remove_member(&team_id, &user_id)?;
    Ok(ApiResponse::ok(team))
}

#[instrument(skip(state))]
pub async fn list_comments(
    State(state): State<AppState>,
    Path(candidate_id): Path<String>,
) -> ApiResult<Envelope<Vec<Comment>>> {
    Ok(ApiResponse::ok(state.collaboration.list_comments(&candidate_id)))
}

#[instrument(skip(state, request))]
pub async fn add_comment(
    State(state): State<AppState>,
    Path(candidate_id): Path<String>,
    Json(request): Json<CreateCommentRequest>,
) -> ApiResult<(StatusCode, Envelope<Comment>)> {
    let comment = state.collaboration.add_comment(&candidate_id, request)?;
    Ok(ApiResponse::created(comment))
}

#[instrument(skip(state))]
pub async fn delete_comment(
    State(state): State<AppState>,
    Path((candidate_id, comment_id)): Path<(String, String)>,
) -> ApiResult<Envelope<Deleted>> {
    state
        .collaboration
        .delete_comment(&candidate_id, &comment_id)?;
    Ok(ApiResponse::ok(Deleted::yes()))
}

#[instrument(skip(state))]
pub async fn list_evaluations(
    State(state): State<AppState>,
    Path(candidate_id): Path<String>,
) -> ApiResult<Envelope<Vec<Evaluation>>> {
    Ok(ApiResponse::ok(
        state.collaboration.list_evaluations(&candidate_id),
    ))
}

#[instrument(skip(state, request))]
pub async fn submit_evaluation(
    State(state): State<AppState>,
    Path(candidate_id): Path<String>,
    Json(request): Json<SubmitEvaluationRequest>,
) -> ApiResult<(StatusCode, Envelope<Evaluation>)> {
    let evaluation = state
        .collaboration
        .submit_evaluation(&candidate_id, request)?;
    Ok(ApiResponse::created(evaluation))
}

#[instrument(skip(state))]
pub async fn evaluation_summary(
    State(state): State<AppState>,
    Path(candidate_id): Path<String>,
) -> ApiResult<Envelope<EvaluationSummary>> {
    Ok(ApiResponse::ok(state.collaboration.summary(&candidate_id)))
}
