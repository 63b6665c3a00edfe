//! Proctoring service - drives the session state machine.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::detector::{FaceDetector, SimulatedFaceDetector};
use super::error::{ProctoringError, ProctoringResult};
use super::models::{
    CreateSessionRequest, EnvironmentCheck, EnvironmentCheckRequest, EnvironmentCheckResult,
    ProctoringSettings, ReportViolationRequest, ReviewRequest, ReviewStatus, Session,
    SessionListQuery, SessionReport, SessionStatus, Severity, Snapshot, SnapshotRequest,
    SnapshotResult, TerminateRequest, Violation, ViolationType,
};
use super::repository::SessionRepository;

/// Reason recorded when the violation limit ends a session.
pub const VIOLATION_LIMIT_REASON: &str = "violation limit reached";

/// Proctoring service configuration.
#[derive(Debug, Clone, Default)]
pub struct ProctoringServiceConfig {
    /// Settings applied when a session is created without its own.
    pub default_settings: ProctoringSettings,
}

/// Service for proctoring sessions.
#[derive(Clone)]
pub struct ProctoringService {
    repo: SessionRepository,
    detector: Arc<dyn FaceDetector>,
    config: ProctoringServiceConfig,
}

impl ProctoringService {
    /// Create a service with the simulated face detector.
    pub fn new(repo: SessionRepository, config: ProctoringServiceConfig) -> Self {
        Self::with_detector(repo, Arc::new(SimulatedFaceDetector::default()), config)
    }

    pub fn with_detector(
        repo: SessionRepository,
        detector: Arc<dyn FaceDetector>,
        config: ProctoringServiceConfig,
    ) -> Self {
        Self {
            repo,
            detector,
            config,
        }
    }

    #[instrument(skip(self, request), fields(assessment_id = %request.assessment_id, candidate_id = %request.candidate_id))]
    pub fn create_session(&self, request: CreateSessionRequest) -> ProctoringResult<Session> {
        if request.assessment_id.trim().is_empty() {
            return Err(ProctoringError::Validation(
                "assessmentId must not be empty".to_string(),
            ));
        }
        if request.candidate_id.trim().is_empty() {
            return Err(ProctoringError::Validation(
                "candidateId must not be empty".to_string(),
            ));
        }

        let settings = request
            .settings
            .unwrap_or_else(|| self.config.default_settings.clone());
        if settings.max_violations == 0 {
            return Err(ProctoringError::Validation(
                "maxViolations must be at least 1".to_string(),
            ));
        }

        let session = Session::new(
            Uuid::new_v4().to_string(),
            request.assessment_id,
            request.candidate_id,
            settings,
            Utc::now(),
        );
        self.repo.insert(session.clone());
        info!(session_id = %session.id, "Created proctoring session");

        Ok(session)
    }

    pub fn list_sessions(&self, query: &SessionListQuery) -> Vec<Session> {
        self.repo.list(query)
    }

    pub fn get_session(&self, id: &str) -> ProctoringResult<Session> {
        self.repo
            .get(id)
            .ok_or_else(|| ProctoringError::SessionNotFound(id.to_string()))
    }

    /// Record an environment check. `passedAt` is set only if every check the
    /// session requires is satisfied.
    #[instrument(skip(self, request))]
    pub fn environment_check(
        &self,
        id: &str,
        request: EnvironmentCheckRequest,
    ) -> ProctoringResult<EnvironmentCheckResult> {
        self.mutate(id, |session| {
            if session.status != SessionStatus::NotStarted {
                return Err(ProctoringError::InvalidState {
                    action: "run environment check for",
                    status: session.status,
                });
            }

            let failed_checks = failed_checks(&session.settings, &request);
            let now = Utc::now();
            session.environment_check = EnvironmentCheck {
                webcam: request.webcam,
                microphone: request.microphone,
                screen_share: request.screen_share,
                fullscreen: request.fullscreen,
                browser: request.browser,
                checked_at: Some(now),
                passed_at: failed_checks.is_empty().then_some(now),
            };
            session.updated_at = now;

            let passed = failed_checks.is_empty();
            if passed {
                info!(session_id = %session.id, "Environment check passed");
            } else {
                debug!(session_id = %session.id, ?failed_checks, "Environment check failed");
            }

            Ok(EnvironmentCheckResult {
                passed,
                failed_checks,
                session: session.clone(),
            })
        })
    }

    #[instrument(skip(self))]
    pub fn start_session(&self, id: &str) -> ProctoringResult<Session> {
        self.mutate(id, |session| {
            if session.status != SessionStatus::NotStarted {
                return Err(ProctoringError::InvalidState {
                    action: "start",
                    status: session.status,
                });
            }
            if session.environment_check.passed_at.is_none() {
                return Err(ProctoringError::EnvironmentNotVerified);
            }

            let now = Utc::now();
            session.status = SessionStatus::InProgress;
            session.started_at = Some(now);
            session.updated_at = now;
            info!(session_id = %session.id, "Started proctoring session");
            Ok(session.clone())
        })
    }

    #[instrument(skip(self, request), fields(kind = ?request.kind, severity = ?request.severity))]
    pub fn report_violation(
        &self,
        id: &str,
        request: ReportViolationRequest,
    ) -> ProctoringResult<Session> {
        self.mutate(id, |session| {
            ensure_in_progress(session, "report violation for")?;
            record_violation(session, request.kind, request.severity, request.details);
            Ok(session.clone())
        })
    }

    /// Store snapshot metadata and raise a face violation when needed.
    #[instrument(skip(self, request), fields(size = request.image_data.len()))]
    pub fn upload_snapshot(
        &self,
        id: &str,
        request: SnapshotRequest,
    ) -> ProctoringResult<SnapshotResult> {
        if request.image_data.trim().is_empty() {
            return Err(ProctoringError::Validation(
                "imageData must not be empty".to_string(),
            ));
        }

        self.mutate(id, |session| {
            ensure_in_progress(session, "upload snapshot for")?;

            let face_count = request
                .face_count
                .unwrap_or_else(|| self.detector.count_faces(&request.image_data));
            let flagged = face_violation(face_count);

            let snapshot = Snapshot {
                id: Uuid::new_v4().to_string(),
                face_count,
                size_bytes: request.image_data.len(),
                violation: flagged.map(|(kind, _)| kind),
                timestamp: Utc::now(),
            };
            session.snapshots.push(snapshot.clone());

            let violation = flagged.map(|(kind, severity)| {
                record_violation(
                    session,
                    kind,
                    severity,
                    Some(serde_json::json!({
                        "snapshotId": snapshot.id,
                        "faceCount": face_count,
                    })),
                )
            });
            session.updated_at = snapshot.timestamp;

            Ok(SnapshotResult {
                snapshot,
                violation,
                session: session.clone(),
            })
        })
    }

    #[instrument(skip(self))]
    pub fn complete_session(&self, id: &str) -> ProctoringResult<Session> {
        self.mutate(id, |session| {
            ensure_in_progress(session, "complete")?;
            session.finish(SessionStatus::Completed, Utc::now());
            info!(
                session_id = %session.id,
                risk_score = session.risk_score,
                review_status = %session.review_status,
                "Completed proctoring session"
            );
            Ok(session.clone())
        })
    }

    #[instrument(skip(self, request))]
    pub fn terminate_session(
        &self,
        id: &str,
        request: TerminateRequest,
    ) -> ProctoringResult<Session> {
        self.mutate(id, |session| {
            if session.status.is_terminal() {
                return Err(ProctoringError::InvalidState {
                    action: "terminate",
                    status: session.status,
                });
            }
            session.termination_reason = Some(
                request
                    .reason
                    .filter(|r| !r.trim().is_empty())
                    .unwrap_or_else(|| "terminated by proctor".to_string()),
            );
            session.finish(SessionStatus::Terminated, Utc::now());
            warn!(session_id = %session.id, reason = ?session.termination_reason, "Terminated session");
            Ok(session.clone())
        })
    }

    #[instrument(skip(self, request), fields(reviewer = %request.reviewer_id))]
    pub fn review_session(&self, id: &str, request: ReviewRequest) -> ProctoringResult<Session> {
        if request.status == ReviewStatus::Pending {
            return Err(ProctoringError::Validation(
                "review status must be approved or flagged".to_string(),
            ));
        }
        if request.reviewer_id.trim().is_empty() {
            return Err(ProctoringError::Validation(
                "reviewerId must not be empty".to_string(),
            ));
        }

        self.mutate(id, |session| {
            if !session.status.is_terminal() {
                return Err(ProctoringError::InvalidState {
                    action: "review",
                    status: session.status,
                });
            }
            let now = Utc::now();
            session.review_status = request.status;
            session.reviewed_by = Some(request.reviewer_id);
            session.review_notes = request.notes;
            session.reviewed_at = Some(now);
            session.updated_at = now;
            info!(session_id = %session.id, review_status = %session.review_status, "Reviewed session");
            Ok(session.clone())
        })
    }

    pub fn list_violations(&self, id: &str) -> ProctoringResult<Vec<Violation>> {
        Ok(self.get_session(id)?.violations)
    }

    pub fn report(&self, id: &str) -> ProctoringResult<SessionReport> {
        Ok(SessionReport::from(&self.get_session(id)?))
    }

    fn mutate<T>(
        &self,
        id: &str,
        f: impl FnOnce(&mut Session) -> ProctoringResult<T>,
    ) -> ProctoringResult<T> {
        self.repo
            .update(id, f)
            .unwrap_or_else(|| Err(ProctoringError::SessionNotFound(id.to_string())))
    }
}

fn ensure_in_progress(session: &Session, action: &'static str) -> ProctoringResult<()> {
    if session.status == SessionStatus::InProgress {
        Ok(())
    } else {
        Err(ProctoringError::InvalidState {
            action,
            status: session.status,
        })
    }
}

/// Append a violation, raise the risk score, and apply the violation limit.
fn record_violation(
    session: &mut Session,
    kind: ViolationType,
    severity: Severity,
    details: Option<serde_json::Value>,
) -> Violation {
    let now = Utc::now();
    let violation = Violation {
        kind,
        details,
        severity,
        timestamp: now,
    };
    session.violations.push(violation.clone());
    session.accumulate_risk(severity);
    session.updated_at = now;
    debug!(
        session_id = %session.id,
        ?kind,
        ?severity,
        risk_score = session.risk_score,
        "Recorded violation"
    );

    if session.settings.auto_terminate
        && session.violations.len() >= session.settings.max_violations
    {
        session.termination_reason = Some(VIOLATION_LIMIT_REASON.to_string());
        session.finish(SessionStatus::Terminated, now);
        warn!(
            session_id = %session.id,
            violations = session.violations.len(),
            "Violation limit reached, session terminated"
        );
    }

    violation
}

/// Map a face count to the violation it triggers, if any.
fn face_violation(face_count: u32) -> Option<(ViolationType, Severity)> {
    match face_count {
        0 => Some((ViolationType::NoFace, Severity::Medium)),
        1 => None,
        _ => Some((ViolationType::MultipleFaces, Severity::High)),
    }
}

fn failed_checks(
    settings: &ProctoringSettings,
    request: &EnvironmentCheckRequest,
) -> Vec<&'static str> {
    [
        (settings.require_webcam, request.webcam, "webcam"),
        (settings.require_microphone, request.microphone, "microphone"),
        (
            settings.require_screen_share,
            request.screen_share,
            "screenShare",
        ),
        (settings.require_fullscreen, request.fullscreen, "fullscreen"),
    ]
    .into_iter()
    .filter(|(required, ok, _)| *required && !*ok)
    .map(|(_, _, name)| name)
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proctoring::detector::FixedFaceDetector;

    fn service() -> ProctoringService {
        ProctoringService::new(SessionRepository::new(), ProctoringServiceConfig::default())
    }

    fn passing_check() -> EnvironmentCheckRequest {
        EnvironmentCheckRequest {
            webcam: true,
            microphone: true,
            screen_share: true,
            fullscreen: true,
            browser: Some("firefox".to_string()),
        }
    }

    fn started(service: &ProctoringService) -> Session {
        let session = service
            .create_session(CreateSessionRequest {
                assessment_id: "asm-1".to_string(),
                candidate_id: "cand-1".to_string(),
                settings: None,
            })
            .unwrap();
        service.environment_check(&session.id, passing_check()).unwrap();
        service.start_session(&session.id).unwrap()
    }

    fn violation(severity: Severity) -> ReportViolationRequest {
        ReportViolationRequest {
            kind: ViolationType::TabSwitch,
            severity,
            details: None,
        }
    }

    #[test]
    fn test_create_rejects_empty_ids() {
        let svc = service();
        let err = svc
            .create_session(CreateSessionRequest {
                assessment_id: " ".to_string(),
                candidate_id: "c".to_string(),
                settings: None,
            })
            .unwrap_err();
        assert!(matches!(err, ProctoringError::Validation(_)));
    }

    #[test]
    fn test_start_requires_passed_environment_check() {
        let svc = service();
        let session = svc
            .create_session(CreateSessionRequest {
                assessment_id: "a".to_string(),
                candidate_id: "c".to_string(),
                settings: None,
            })
            .unwrap();

        let err = svc.start_session(&session.id).unwrap_err();
        assert!(matches!(err, ProctoringError::EnvironmentNotVerified));

        let result = svc
            .environment_check(
                &session.id,
                EnvironmentCheckRequest {
                    webcam: true,
                    microphone: false,
                    ..passing_check()
                },
            )
            .unwrap();
        assert!(!result.passed);
        assert_eq!(result.failed_checks, vec!["microphone"]);
        assert!(result.session.environment_check.passed_at.is_none());
        assert!(svc.start_session(&session.id).is_err());
        assert_eq!(
            svc.get_session(&session.id).unwrap().status,
            SessionStatus::NotStarted
        );

        let result = svc.environment_check(&session.id, passing_check()).unwrap();
        assert!(result.passed);
        let started = svc.start_session(&session.id).unwrap();
        assert_eq!(started.status, SessionStatus::InProgress);
        assert!(started.started_at.is_some());
    }

    #[test]
    fn test_screen_share_optional_by_default() {
        let svc = service();
        let session = svc
            .create_session(CreateSessionRequest {
                assessment_id: "a".to_string(),
                candidate_id: "c".to_string(),
                settings: None,
            })
            .unwrap();
        let result = svc
            .environment_check(
                &session.id,
                EnvironmentCheckRequest {
                    screen_share: false,
                    ..passing_check()
                },
            )
            .unwrap();
        assert!(result.passed);
    }

    #[test]
    fn test_violation_weights_accumulate() {
        let svc = service();
        let session = started(&svc);

        svc.report_violation(&session.id, violation(Severity::Low)).unwrap();
        svc.report_violation(&session.id, violation(Severity::Medium)).unwrap();
        let updated = svc
            .report_violation(&session.id, violation(Severity::High))
            .unwrap();
        assert_eq!(updated.risk_score, 50);
        assert_eq!(updated.violations.len(), 3);
        assert_eq!(updated.violations[0].severity, Severity::Low);
        assert_eq!(updated.violations[2].severity, Severity::High);
    }

    #[test]
    fn test_risk_clamped_at_100() {
        let svc = service();
        let session = started(&svc);
        for _ in 0..3 {
            svc.report_violation(&session.id, violation(Severity::Critical))
                .unwrap();
        }
        assert_eq!(svc.get_session(&session.id).unwrap().risk_score, 100);
    }

    #[test]
    fn test_auto_terminate_at_max_violations() {
        let svc = service();
        let session = svc
            .create_session(CreateSessionRequest {
                assessment_id: "a".to_string(),
                candidate_id: "c".to_string(),
                settings: Some(ProctoringSettings {
                    max_violations: 2,
                    ..ProctoringSettings::default()
                }),
            })
            .unwrap();
        svc.environment_check(&session.id, passing_check()).unwrap();
        svc.start_session(&session.id).unwrap();

        let first = svc
            .report_violation(&session.id, violation(Severity::Low))
            .unwrap();
        assert_eq!(first.status, SessionStatus::InProgress);

        let second = svc
            .report_violation(&session.id, violation(Severity::Low))
            .unwrap();
        assert_eq!(second.status, SessionStatus::Terminated);
        assert_eq!(
            second.termination_reason.as_deref(),
            Some(VIOLATION_LIMIT_REASON)
        );
        assert_eq!(second.review_status, ReviewStatus::Approved);

        let err = svc
            .report_violation(&session.id, violation(Severity::Low))
            .unwrap_err();
        assert!(matches!(err, ProctoringError::InvalidState { .. }));
    }

    #[test]
    fn test_no_auto_terminate_when_disabled() {
        let svc = service();
        let session = svc
            .create_session(CreateSessionRequest {
                assessment_id: "a".to_string(),
                candidate_id: "c".to_string(),
                settings: Some(ProctoringSettings {
                    max_violations: 1,
                    auto_terminate: false,
                    ..ProctoringSettings::default()
                }),
            })
            .unwrap();
        svc.environment_check(&session.id, passing_check()).unwrap();
        svc.start_session(&session.id).unwrap();
        for _ in 0..3 {
            let s = svc
                .report_violation(&session.id, violation(Severity::Low))
                .unwrap();
            assert_eq!(s.status, SessionStatus::InProgress);
        }
    }

    #[test]
    fn test_snapshot_face_violations() {
        let svc = service();
        let session = started(&svc);

        let ok = svc
            .upload_snapshot(
                &session.id,
                SnapshotRequest {
                    image_data: "data:image/png;base64,AAAA".to_string(),
                    face_count: Some(1),
                },
            )
            .unwrap();
        assert!(ok.violation.is_none());
        assert_eq!(ok.session.risk_score, 0);

        let empty = svc
            .upload_snapshot(
                &session.id,
                SnapshotRequest {
                    image_data: "AAAA".to_string(),
                    face_count: Some(0),
                },
            )
            .unwrap();
        let v = empty.violation.unwrap();
        assert_eq!(v.kind, ViolationType::NoFace);
        assert_eq!(v.severity, Severity::Medium);
        assert_eq!(empty.session.risk_score, 15);

        let crowded = svc
            .upload_snapshot(
                &session.id,
                SnapshotRequest {
                    image_data: "AAAA".to_string(),
                    face_count: Some(3),
                },
            )
            .unwrap();
        let v = crowded.violation.unwrap();
        assert_eq!(v.kind, ViolationType::MultipleFaces);
        assert_eq!(v.severity, Severity::High);
        assert_eq!(crowded.session.risk_score, 45);
        assert_eq!(crowded.session.snapshots.len(), 3);
    }

    #[test]
    fn test_snapshot_uses_detector_without_hint() {
        let svc = ProctoringService::with_detector(
            SessionRepository::new(),
            Arc::new(FixedFaceDetector(0)),
            ProctoringServiceConfig::default(),
        );
        let session = started(&svc);
        let result = svc
            .upload_snapshot(
                &session.id,
                SnapshotRequest {
                    image_data: "AAAA".to_string(),
                    face_count: None,
                },
            )
            .unwrap();
        assert_eq!(result.snapshot.face_count, 0);
        assert_eq!(result.violation.unwrap().kind, ViolationType::NoFace);
    }

    #[test]
    fn test_complete_derives_review_status() {
        let cases = [
            (vec![Severity::Critical, Severity::Low], ReviewStatus::Flagged),
            (vec![Severity::Medium, Severity::Low, Severity::Low], ReviewStatus::Pending),
            (vec![Severity::Low, Severity::Low], ReviewStatus::Approved),
        ];
        for (severities, expected) in cases {
            let svc = service();
            let session = started(&svc);
            for severity in severities {
                svc.report_violation(&session.id, violation(severity)).unwrap();
            }
            let done = svc.complete_session(&session.id).unwrap();
            assert_eq!(done.status, SessionStatus::Completed);
            assert_eq!(done.review_status, expected);
            assert!(done.duration.is_some());
            assert!(done.ended_at.is_some());
        }
    }

    #[test]
    fn test_complete_requires_in_progress() {
        let svc = service();
        let session = svc
            .create_session(CreateSessionRequest {
                assessment_id: "a".to_string(),
                candidate_id: "c".to_string(),
                settings: None,
            })
            .unwrap();
        assert!(matches!(
            svc.complete_session(&session.id).unwrap_err(),
            ProctoringError::InvalidState { .. }
        ));
    }

    #[test]
    fn test_review_only_after_terminal() {
        let svc = service();
        let session = started(&svc);
        let request = || ReviewRequest {
            status: ReviewStatus::Approved,
            reviewer_id: "rev-1".to_string(),
            notes: Some("looks fine".to_string()),
        };
        assert!(svc.review_session(&session.id, request()).is_err());

        svc.terminate_session(&session.id, TerminateRequest::default())
            .unwrap();
        let reviewed = svc.review_session(&session.id, request()).unwrap();
        assert_eq!(reviewed.review_status, ReviewStatus::Approved);
        assert_eq!(reviewed.reviewed_by.as_deref(), Some("rev-1"));
        assert!(reviewed.reviewed_at.is_some());
    }

    #[test]
    fn test_review_rejects_pending() {
        let svc = service();
        let err = svc
            .review_session(
                "whatever",
                ReviewRequest {
                    status: ReviewStatus::Pending,
                    reviewer_id: "r".to_string(),
                    notes: None,
                },
            )
            .unwrap_err();
        assert!(matches!(err, ProctoringError::Validation(_)));
    }

    #[test]
    fn test_terminate_unstarted_session_has_zero_duration() {
        let svc = service();
        let session = svc
            .create_session(CreateSessionRequest {
                assessment_id: "a".to_string(),
                candidate_id: "c".to_string(),
                settings: None,
            })
            .unwrap();
        let terminated = svc
            .terminate_session(
                &session.id,
                TerminateRequest {
                    reason: Some("no show".to_string()),
                },
            )
            .unwrap();
        assert_eq!(terminated.duration, Some(0));
        assert_eq!(terminated.termination_reason.as_deref(), Some("no show"));
        assert!(svc.terminate_session(&session.id, TerminateRequest::default()).is_err());
    }

    #[test]
    fn test_report_counts() {
        let svc = service();
        let session = started(&svc);
        svc.report_violation(&session.id, violation(Severity::Low)).unwrap();
        svc.report_violation(&session.id, violation(Severity::Low)).unwrap();
        svc.upload_snapshot(
            &session.id,
            SnapshotRequest {
                image_data: "AAAA".to_string(),
                face_count: Some(2),
            },
        )
        .unwrap();

        let report = svc.report(&session.id).unwrap();
        assert_eq!(report.violation_count, 3);
        assert_eq!(report.by_severity.get(&Severity::Low), Some(&2));
        assert_eq!(report.by_type.get(&ViolationType::MultipleFaces), Some(&1));
        assert_eq!(report.snapshot_count, 1);
        assert_eq!(report.flagged_snapshots, 1);
        assert_eq!(report.risk_score, 40);
    }

    #[test]
    fn test_missing_session() {
        let svc = service();
        assert!(matches!(
            svc.get_session("nope").unwrap_err(),
            ProctoringError::SessionNotFound(_)
        ));
        assert!(matches!(
            svc.start_session("nope").unwrap_err(),
            ProctoringError::SessionNotFound(_)
        ));
    }
}
