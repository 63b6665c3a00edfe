//! API route definitions.

use axum::{
    Router,
    routing::{delete, get, post, put},
};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use super::error::panic_response;
use super::handlers::{assessments, ats, collaboration, misc, proctoring};
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_request(DefaultOnRequest::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    let api = Router::new()
        .merge(assessment_routes())
        .merge(ats_routes())
        .merge(collaboration_routes())
        .merge(proctoring_routes());

    Router::new()
        .route("/health", get(misc::health))
        .nest("/api", api)
        .with_state(state)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(CorsLayer::permissive())
        .layer(trace_layer)
}

fn assessment_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/assessments",
            get(assessments::list_assessments).post(assessments::create_assessment),
        )
        .route(
            "/assessments/{id}",
            get(assessments::get_assessment)
                .put(assessments::update_assessment)
                .delete(assessments::delete_assessment),
        )
        .route(
            "/assessments/{id}/publish",
            post(assessments::publish_assessment),
        )
        .route("/assessments/{id}/take", get(assessments::take_assessment))
        .route(
            "/assessments/{id}/submit",
            post(assessments::submit_assessment),
        )
        .route(
            "/assessments/{id}/submissions",
            get(assessments::list_submissions),
        )
        .route(
            "/assessments/{id}/submissions/{submission_id}",
            get(assessments::get_submission),
        )
        .route("/assessments/{id}/stats", get(assessments::assessment_stats))
}

fn ats_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/ats/integrations",
            get(ats::list_integrations).post(ats::create_integration),
        )
        .route(
            "/ats/integrations/{id}",
            get(ats::get_integration)
                .put(ats::update_integration)
                .delete(ats::delete_integration),
        )
        .route("/ats/integrations/{id}/test", post(ats::test_connection))
        .route("/ats/integrations/{id}/sync", post(ats::sync_candidates))
        .route("/ats/integrations/{id}/export", post(ats::export_result))
        .route("/ats/integrations/{id}/exports", get(ats::list_exports))
}

fn collaboration_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/collaboration/teams",
            get(collaboration::list_teams).post(collaboration::create_team),
        )
        .route(
            "/collaboration/teams/{id}",
            get(collaboration::get_team).delete(collaboration::delete_team),
        )
        .route(
            "/collaboration/teams/{id}/members",
            post(collaboration::add_member),
        )
        .route(
            "/collaboration/teams/{id}/members/{user_id}",
            put(collaboration::update_member).delete(collaboration::remove_member),
        )
        .route(
            "/collaboration/candidates/{candidate_id}/comments",
            get(collaboration::list_comments).post(collaboration::add_comment),
        )
        .route(
            "/collaboration/candidates/{candidate_id}/comments/{comment_id}",
            delete(collaboration::delete_comment),
        )
        .route(
            "/collaboration/candidates/{candidate_id}/evaluations",
            get(collaboration::list_evaluations).post(collaboration::submit_evaluation),
        )
        .route(
            "/collaboration/candidates/{candidate_id}/summary",
            get(collaboration::evaluation_summary),
        )
}

fn proctoring_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/proctoring/sessions",
            get(proctoring::list_sessions).post(proctoring::create_session),
        )
        .route("/proctoring/sessions/{id}", get(proctoring::get_session))
        .route(
            "/proctoring/sessions/{id}/environment-check",
            post(proctoring::environment_check),
        )
        .route(
            "/proctoring/sessions/{id}/start",
            post(proctoring::start_session),
        )
        .route(
            "/proctoring/sessions/{id}/violations",
            get(proctoring::list_violations).post(proctoring::report_violation),
        )
        .route(
            "/proctoring/sessions/{id}/snapshots",
            post(proctoring::upload_snapshot),
        )
        .route(
            "/proctoring/sessions/{id}/complete",
            post(proctoring::complete_session),
        )
        .route(
            "/proctoring/sessions/{id}/terminate",
            post(proctoring::terminate_session),
        )
        .route(
            "/proctoring/sessions/{id}/review",
            post(proctoring::review_session),
        )
        .route(
            "/proctoring/sessions/{id}/report",
            get(proctoring::session_report),
        )
}
