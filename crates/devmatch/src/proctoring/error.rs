//! Proctoring error types.

use thiserror::Error;

use super::models::SessionStatus;

/// Result type for proctoring operations.
pub type ProctoringResult<T> = Result<T, ProctoringError>;

/// Errors raised by the session workflow.
#[derive(Debug, Error)]
pub enum ProctoringError {
    /// No session with this id.
    #[error("Session {0} not found")]
    SessionNotFound(String),

    /// The operation is not allowed in the session's current state.
    #[error("Cannot {action} session in status {status}")]
    InvalidState {
        action: &'static str,
        status: SessionStatus,
    },

    /// Start was attempted before the environment check passed.
    #[error("Environment check must pass before the session can start")]
    EnvironmentNotVerified,

    /// Request body failed validation.
    #[error("Invalid request: {0}")]
    Validation(String),
}
