//! HTTP handlers, grouped by module.

pub mod assessments;
pub mod ats;
pub mod collaboration;
pub mod misc;
pub mod proctoring;

use axum::{Json, http::StatusCode};
use serde::Serialize;

/// Success envelope: `{"success": true, "data": ...}`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data,
        })
    }

    pub fn created(data: T) -> (StatusCode, Json<Self>) {
        (StatusCode::CREATED, Self::ok(data))
    }
}

/// Data for endpoints that only acknowledge an action.
#[derive(Debug, Serialize)]
pub struct Deleted {
    pub deleted: bool,
}

impl Deleted {
    pub fn yes() -> Deleted {
        Deleted { deleted: true }
    }
}
