//! Proctoring data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a proctoring session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Created, environment not yet verified or session not yet started.
    NotStarted,
    /// Candidate is taking the assessment.
    InProgress,
    /// Candidate finished normally.
    Completed,
    /// Ended early, manually or by the violation limit.
    Terminated,
}

impl SessionStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionStatus::Completed | SessionStatus::Terminated)
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionStatus::NotStarted => write!(f, "not_started"),
            SessionStatus::InProgress => write!(f, "in_progress"),
            SessionStatus::Completed => write!(f, "completed"),
            SessionStatus::Terminated => write!(f, "terminated"),
        }
    }
}

/// Review outcome attached to a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    Pending,
    Flagged,
    Approved,
}

impl ReviewStatus {
    /// Derive the review gate from a final risk score.
    pub fn from_risk_score(score: u8) -> Self {
        if score >= 50 {
            ReviewStatus::Flagged
        } else if score >= 25 {
            ReviewStatus::Pending
        } else {
            ReviewStatus::Approved
        }
    }
}

impl std::fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReviewStatus::Pending => write!(f, "pending"),
            ReviewStatus::Flagged => write!(f, "flagged"),
            ReviewStatus::Approved => write!(f, "approved"),
        }
    }
}

/// Severity of a violation, which decides its risk weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Low,
        Severity::Medium,
        Severity::High,
        Severity::Critical,
    ];

    /// Risk score delta contributed by one violation of this severity.
    pub fn weight(self) -> u8 {
        match self {
            Severity::Low => 5,
            Severity::Medium => 15,
            Severity::High => 30,
            Severity::Critical => 50,
        }
    }
}

/// Kind of anomalous event observed during a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationType {
    TabSwitch,
    WindowBlur,
    FullscreenExit,
    CopyPaste,
    NoFace,
    MultipleFaces,
    FaceMismatch,
    AudioDetected,
    DevtoolsOpen,
    #[serde(other)]
    Other,
}

/// A recorded violation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    #[serde(rename = "type")]
    pub kind: ViolationType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    pub severity: Severity,
    pub timestamp: DateTime<Utc>,
}

/// Result of the pre-start environment check.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentCheck {
    pub webcam: bool,
    pub microphone: bool,
    pub screen_share: bool,
    pub fullscreen: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub browser: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked_at: Option<DateTime<Utc>>,
    /// Set only when every required check passed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passed_at: Option<DateTime<Utc>>,
}

/// Per-session proctoring rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProctoringSettings {
    pub max_violations: usize,
    pub auto_terminate: bool,
    pub require_webcam: bool,
    pub require_microphone: bool,
    pub require_screen_share: bool,
    pub require_fullscreen: bool,
}

impl Default for ProctoringSettings {
    fn default() -> Self {
        Self {
            max_violations: 10,
            auto_terminate: true,
            require_webcam: true,
            require_microphone: true,
            require_screen_share: false,
            require_fullscreen: true,
        }
    }
}

/// Snapshot metadata. Image bytes are not retained.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub id: String,
    pub face_count: u32,
    pub size_bytes: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub violation: Option<ViolationType>,
    pub timestamp: DateTime<Utc>,
}

/// One proctored assessment attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub assessment_id: String,
    pub candidate_id: String,
    pub status: SessionStatus,
    pub settings: ProctoringSettings,
    pub environment_check: EnvironmentCheck,
    pub violations: Vec<Violation>,
    pub snapshots: Vec<Snapshot>,
    /// Accumulated risk, 0..=100, never decreases.
    pub risk_score: u8,
    pub review_status: ReviewStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
    /// Seconds between start and end.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub termination_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn new(
        id: String,
        assessment_id: String,
        candidate_id: String,
        settings: ProctoringSettings,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            assessment_id,
            candidate_id,
            status: SessionStatus::NotStarted,
            settings,
            environment_check: EnvironmentCheck::default(),
            violations: Vec::new(),
            snapshots: Vec::new(),
            risk_score: 0,
            review_status: ReviewStatus::Pending,
            started_at: None,
            ended_at: None,
            duration: None,
            termination_reason: None,
            reviewed_by: None,
            review_notes: None,
            reviewed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Add a violation's weight to the risk score, saturating at 100.
    pub fn accumulate_risk(&mut self, severity: Severity) {
        self.risk_score = self.risk_score.saturating_add(severity.weight()).min(100);
    }

    /// Move into a terminal state and settle the review gate.
    pub(crate) fn finish(&mut self, status: SessionStatus, now: DateTime<Utc>) {
        debug_assert!(status.is_terminal());
        self.status = status;
        self.ended_at = Some(now);
        self.duration = Some(
            self.started_at
                .map(|started| (now - started).num_seconds().max(0))
                .unwrap_or(0),
        );
        self.review_status = ReviewStatus::from_risk_score(self.risk_score);
        self.updated_at = now;
    }
}

/// Request to open a proctoring session.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    pub assessment_id: String,
    pub candidate_id: String,
    #[serde(default)]
    pub settings: Option<ProctoringSettings>,
}

/// Environment check submitted by the client.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentCheckRequest {
    #[serde(default)]
    pub webcam: bool,
    #[serde(default)]
    pub microphone: bool,
    #[serde(default)]
    pub screen_share: bool,
    #[serde(default)]
    pub fullscreen: bool,
    #[serde(default)]
    pub browser: Option<String>,
}

/// Outcome of an environment check.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentCheckResult {
    pub passed: bool,
    pub failed_checks: Vec<&'static str>,
    pub session: Session,
}

/// Client-reported violation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportViolationRequest {
    #[serde(rename = "type")]
    pub kind: ViolationType,
    pub severity: Severity,
    #[serde(default)]
    pub details: Option<serde_json::Value>,
}

/// Webcam snapshot upload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotRequest {
    /// Encoded image (usually a base64 data URL).
    pub image_data: String,
    /// Face count from client-side detection, if the client ran one.
    #[serde(default)]
    pub face_count: Option<u32>,
}

/// Outcome of a snapshot upload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotResult {
    pub snapshot: Snapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub violation: Option<Violation>,
    pub session: Session,
}

/// Manual termination.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerminateRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

/// Human review decision.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
    pub status: ReviewStatus,
    pub reviewer_id: String,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Filters for listing sessions.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionListQuery {
    pub assessment_id: Option<String>,
    pub candidate_id: Option<String>,
    pub status: Option<SessionStatus>,
    pub review_status: Option<ReviewStatus>,
}

impl SessionListQuery {
    pub fn matches(&self, session: &Session) -> bool {
        self.assessment_id
            .as_deref()
            .is_none_or(|id| session.assessment_id == id)
            && self
                .candidate_id
                .as_deref()
                .is_none_or(|id| session.candidate_id == id)
            && self.status.is_none_or(|s| session.status == s)
            && self.review_status.is_none_or(|r| session.review_status == r)
    }
}

/// Session summary for reviewers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionReport {
    pub session_id: String,
    pub assessment_id: String,
    pub candidate_id: String,
    pub status: SessionStatus,
    pub risk_score: u8,
    pub review_status: ReviewStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
    pub violation_count: usize,
    pub by_severity: std::collections::BTreeMap<Severity, usize>,
    pub by_type: std::collections::BTreeMap<ViolationType, usize>,
    pub snapshot_count: usize,
    pub flagged_snapshots: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub termination_reason: Option<String>,
}

impl From<&Session> for SessionReport {
    fn from(session: &Session) -> Self {
        let mut by_severity = std::collections::BTreeMap::new();
        let mut by_type = std::collections::BTreeMap::new();
        for violation in &session.violations {
            *by_severity.entry(violation.severity).or_insert(0) += 1;
            *by_type.entry(violation.kind).or_insert(0) += 1;
        }

        Self {
            session_id: session.id.clone(),
            assessment_id: session.assessment_id.clone(),
            candidate_id: session.candidate_id.clone(),
            status: session.status,
            risk_score: session.risk_score,
            review_status: session.review_status,
            duration: session.duration,
            violation_count: session.violations.len(),
            by_severity,
            by_type,
            snapshot_count: session.snapshots.len(),
            flagged_snapshots: session
                .snapshots
                .iter()
                .filter(|s| s.violation.is_some())
                .count(),
            termination_reason: session.termination_reason.clone(),
        }
    }
}
