//! Unified API error handling with structured responses.

use std::any::Any;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error};

use crate::assessment::AssessmentError;
use crate::ats::AtsError;
use crate::collaboration::CollaborationError;
use crate::proctoring::ProctoringError;

/// API error type with structured responses.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Conflict(_) => "CONFLICT",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

/// Error envelope: `{"success": false, "message": ..., "code": ...}`.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    pub code: &'static str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();

        let message = match &self {
            ApiError::Internal(msg) => {
                error!(error_code = code, message = %msg, "API error");
                "Internal server error".to_string()
            }
            _ => {
                let message = self.to_string();
                debug!(error_code = code, message = %message, "Client error");
                message
            }
        };

        let body = ErrorResponse {
            success: false,
            message,
            code,
        };

        (status, Json(body)).into_response()
    }
}

impl From<ProctoringError> for ApiError {
    fn from(err: ProctoringError) -> Self {
        match err {
            ProctoringError::SessionNotFound(_) => ApiError::NotFound(err.to_string()),
            ProctoringError::InvalidState { .. }
            | ProctoringError::EnvironmentNotVerified
            | ProctoringError::Validation(_) => ApiError::BadRequest(err.to_string()),
        }
    }
}

impl From<AssessmentError> for ApiError {
    fn from(err: AssessmentError) -> Self {
        match err {
            AssessmentError::NotFound(_) | AssessmentError::SubmissionNotFound(_) => {
                ApiError::NotFound(err.to_string())
            }
            AssessmentError::NotPublished(_) | AssessmentError::Validation(_) => {
                ApiError::BadRequest(err.to_string())
            }
        }
    }
}

impl From<AtsError> for ApiError {
    fn from(err: AtsError) -> Self {
        match err {
            AtsError::NotFound(_) => ApiError::NotFound(err.to_string()),
            AtsError::NotConnected(_) | AtsError::Validation(_) => {
                ApiError::BadRequest(err.to_string())
            }
        }
    }
}

impl From<CollaborationError> for ApiError {
    fn from(err: CollaborationError) -> Self {
        match err {
            CollaborationError::TeamNotFound(_)
            | CollaborationError::MemberNotFound { .. }
            | CollaborationError::CommentNotFound(_) => ApiError::NotFound(err.to_string()),
            CollaborationError::DuplicateMember(_) => ApiError::Conflict(err.to_string()),
            CollaborationError::LastOwner | CollaborationError::Validation(_) => {
                ApiError::BadRequest(err.to_string())
            }
        }
    }
}

/// Turn a handler panic into a 500 envelope. Installed through
/// `CatchPanicLayer`, so the panic payload only reaches the log.
pub fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_string());
    ApiError::Internal(format!("handler panicked: {detail}")).into_response()
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_error_mapping() {
        let err: ApiError = ProctoringError::SessionNotFound("s1".into()).into();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "Session s1 not found");

        let err: ApiError = ProctoringError::EnvironmentNotVerified.into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let err: ApiError = AtsError::NotConnected("i1".into()).into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let err: ApiError = CollaborationError::DuplicateMember("u1".into()).into();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);

        let err: ApiError = AssessmentError::SubmissionNotFound("x".into()).into();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_internal_error_hides_detail() {
        let response = ApiError::Internal("pool exhausted".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "INTERNAL_ERROR");
        assert_eq!(body["message"], "Internal server error");
    }

    #[tokio::test]
    async fn test_panic_response_is_generic_500() {
        let response = panic_response(Box::new("index out of bounds"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["message"], "Internal server error");
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(ApiError::NotFound(String::new()).error_code(), "NOT_FOUND");
        assert_eq!(ApiError::Conflict(String::new()).status_code(), StatusCode::CONFLICT);
        assert_eq!(
            ApiError::Internal(String::new()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
