//! ATS integration handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::ats::{
    ConnectionTestResult, CreateIntegrationRequest, ExportRecord, ExportRequest, Integration,
    IntegrationListQuery, SyncResult, UpdateIntegrationRequest,
};

use super::{ApiResponse, Deleted};

type Envelope<T> = Json<ApiResponse<T>>;

#[instrument(skip(state))]
pub async fn list_integrations(
    State(state): State<AppState>,
    Query(query): Query<IntegrationListQuery>,
) -> ApiResult<Envelope<Vec<Integration>>> {
    Ok(ApiResponse::ok(state.ats.list_integrations(&query)))
}

#[instrument(skip(state, request))]
pub async fn create_integration(
    State(state): State<AppState>,
    Json(request): Json<CreateIntegrationRequest>,
) -> ApiResult<(StatusCode, Envelope<Integration>)> {
    let integration = state.ats.create_integration(request)?;
    Ok(ApiResponse::created(integration))
}

#[instrument(skip(state))]
pub async fn get_integration(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Envelope<Integration>> {
    Ok(ApiResponse::ok(state.ats.get_integration(&id)?))
}

#[instrument(skip(state, request))]
pub async fn update_integration(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateIntegrationRequest>,
) -> ApiResult<Envelope<Integration>> {
    Ok(ApiResponse::ok(state.ats.update_integration(&id, request)?))
}

#[instrument(skip(state))]
pub async fn delete_integration(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Envelope<Deleted>> {
    state.ats.delete_integration(&id)?;
    Ok(ApiResponse::ok(Deleted::yes()))
}

#[instrument(skip(state))]
pub async fn test_connection(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Envelope<ConnectionTestResult>> {
    Ok(ApiResponse::ok(state.ats.test_connection(&id)?))
}

#[instrument(skip(state))]
pub async fn sync_candidates(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Envelope<SyncResult>> {
    Ok(ApiResponse::ok(state.ats.sync(&id)?))
}

#[instrument(skip(state, request))]
pub async fn export_result(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<ExportRequest>,
) -> ApiResult<(StatusCode, Envelope<ExportRecord>)> {
    let record = state.ats.export_result(&id, request)?;
    Ok(ApiResponse::created(record))
}

#[instrument(skip(state))]
pub async fn list_exports(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Envelope<Vec<ExportRecord>>> {
    Ok(ApiResponse::ok(state.ats.list_exports(&id)?))
}
