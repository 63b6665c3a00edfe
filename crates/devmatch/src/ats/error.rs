//! ATS error types.

use thiserror::Error;

pub type AtsResult<T> = Result<T, AtsError>;

#[derive(Debug, Error)]
pub enum AtsError {
    #[error("Integration {0} not found")]
    NotFound(String),

    #[error("Integration {0} is not connected; run a connection test first")]
    NotConnected(String),

    #[error("Invalid integration: {0}")]
    Validation(String),
}
