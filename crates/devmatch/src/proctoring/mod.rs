//! Proctoring module.
//!
//! Tracks proctored assessment attempts: environment verification, the
//! session lifecycle, violation accumulation into a risk score, and the
//! review gate derived from that score.

mod detector;
mod error;
mod models;
mod repository;
mod service;

pub use detector::{FaceDetector, FixedFaceDetector, SimulatedFaceDetector};
pub use error::{ProctoringError, ProctoringResult};
pub use models::{
    CreateSessionRequest, EnvironmentCheck, EnvironmentCheckRequest, EnvironmentCheckResult,
    ProctoringSettings, ReportViolationRequest, ReviewRequest, ReviewStatus, Session,
    SessionListQuery, SessionReport, SessionStatus, Severity, Snapshot, SnapshotRequest,
    SnapshotResult, TerminateRequest, Violation, ViolationType,
};
pub use repository::SessionRepository;
pub use service::{ProctoringService, ProctoringServiceConfig, VIOLATION_LIMIT_REASON};
