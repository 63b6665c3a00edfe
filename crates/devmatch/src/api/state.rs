//! Application state shared across handlers.

use std::sync::Arc;

use crate::assessment::{AssessmentRepository, AssessmentService};
use crate::ats::AtsService;
use crate::collaboration::CollaborationService;
use crate::config::AppConfig;
use crate::proctoring::{ProctoringService, SessionRepository, SimulatedFaceDetector};

#[derive(Clone)]
pub struct AppState {
    /// Proctoring sessions and violations.
    pub proctoring: Arc<ProctoringService>,
    /// Assessments, submissions and grading.
    pub assessments: Arc<AssessmentService>,
    /// ATS vendor integrations.
    pub ats: Arc<AtsService>,
    /// Hiring teams and candidate feedback.
    pub collaboration: Arc<CollaborationService>,
}

impl AppState {
    pub fn new(
        proctoring: ProctoringService,
        assessments: AssessmentService,
        ats: AtsService,
        collaboration: CollaborationService,
    ) -> Self {
        Self {
            proctoring: Arc::new(proctoring),
            assessments: Arc::new(assessments),
            ats: Arc::new(ats),
            collaboration: Arc::new(collaboration),
        }
    }

    /// Build every service with its simulated backends, as configured.
    pub fn from_config(config: &AppConfig) -> Self {
        let detector = SimulatedFaceDetector::new(
            config.proctoring.no_face_probability,
            config.proctoring.multiple_faces_probability,
        );
        Self::new(
            ProctoringService::with_detector(
                SessionRepository::new(),
                Arc::new(detector),
                config.proctoring.service_config(),
            ),
            AssessmentService::new(
                AssessmentRepository::new(),
                config.assessments.service_config(),
            ),
            AtsService::new(config.ats.service_config()),
            CollaborationService::new(),
        )
    }

    pub fn with_proctoring(mut self, proctoring: ProctoringService) -> Self {
        self.proctoring = Arc::new(proctoring);
        self
    }

    pub fn with_assessments(mut self, assessments: AssessmentService) -> Self {
        self.assessments = Arc::new(assessments);
        self
    }
}
