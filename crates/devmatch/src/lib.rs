//! DevMatch backend.
//!
//! In-memory services for proctored assessments, grading, ATS integrations
//! and hiring-team collaboration, served over a REST API.

pub mod api;
pub mod assessment;
pub mod ats;
pub mod collaboration;
pub mod config;
pub mod proctoring;
