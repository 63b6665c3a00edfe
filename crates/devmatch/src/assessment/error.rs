//! Assessment error types.

use thiserror::Error;

/// Result type for assessment operations.
pub type AssessmentResult<T> = Result<T, AssessmentError>;

#[derive(Debug, Error)]
pub enum AssessmentError {
    #[error("Assessment {0} not found")]
    NotFound(String),

    #[error("Submission {0} not found")]
    SubmissionNotFound(String),

    /// Submissions are only accepted for published assessments.
    #[error("Assessment {0} is not published")]
    NotPublished(String),

    #[error("Invalid assessment: {0}")]
    Validation(String),
}
