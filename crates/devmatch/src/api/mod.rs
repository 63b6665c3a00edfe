//! HTTP API module.
//!
//! REST endpoints for assessments, ATS integrations, collaboration and
//! proctoring, wrapped in `{success, data}` / `{success, message}` envelopes.

mod error;
mod handlers;
mod routes;
mod state;

pub use error::{ApiError, ApiResult, ErrorResponse, panic_response};
pub use handlers::ApiResponse;
pub use routes::create_router;
pub use state::AppState;
