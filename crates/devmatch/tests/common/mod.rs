//! Test utilities and common setup.
#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use devmatch::api::{self, AppState};
use devmatch::assessment::{
    AssessmentRepository, AssessmentService, AssessmentServiceConfig, FixedScoreSource,
};
use devmatch::config::AppConfig;
use devmatch::proctoring::{
    FixedFaceDetector, ProctoringService, ProctoringServiceConfig, SessionRepository,
};
use serde_json::Value;
use tower::ServiceExt;

/// Router with deterministic detection and grading: one face per snapshot,
/// mock scores at the top of their band.
pub fn test_app() -> Router {
    test_app_with_faces(1)
}

pub fn test_app_with_faces(faces: u32) -> Router {
    let state = AppState::from_config(&AppConfig::default())
        .with_proctoring(ProctoringService::with_detector(
            SessionRepository::new(),
            Arc::new(FixedFaceDetector(faces)),
            ProctoringServiceConfig::default(),
        ))
        .with_assessments(AssessmentService::with_score_source(
            AssessmentRepository::new(),
            Arc::new(FixedScoreSource(1.0)),
            AssessmentServiceConfig::default(),
        ));
    api::create_router(state)
}

/// Send a request to a clone of the router and decode the JSON body.
pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().uri(uri).method(method);
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(serde_json::to_string(&json).unwrap())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None).await
}

pub async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn post_empty(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::POST, uri, None).await
}
