//! Assessment module.
//!
//! Authoring of skill assessments, candidate submissions, grading and the
//! simulated hiring predictions attached to each graded submission.

mod error;
pub mod grading;
mod models;
mod repository;
mod service;

pub use error::{AssessmentError, AssessmentResult};
pub use grading::{FixedScoreSource, Grader, RandomScoreSource, ScoreSource};
pub use models::{
    AiPredictions, Answer, Assessment, AssessmentListQuery, AssessmentStats, AssessmentStatus,
    CandidateAssessment, CandidateQuestion, CreateAssessmentRequest, ExperienceLevel, NewQuestion,
    Question, QuestionResult, QuestionType, SubmitAssessmentRequest, Submission,
    UpdateAssessmentRequest,
};
pub use repository::AssessmentRepository;
pub use service::{AssessmentService, AssessmentServiceConfig, MAX_QUESTION_POINTS, MAX_QUESTIONS};
