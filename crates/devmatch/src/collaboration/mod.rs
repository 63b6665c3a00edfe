//! Collaboration module.
//!
//! Hiring teams with role-based membership, plus comments and structured
//! evaluations attached to candidates.

mod error;
mod models;
mod service;

pub use error::{CollaborationError, CollaborationResult};
pub use models::{
    AddMemberRequest, Comment, CreateCommentRequest, CreateTeamRequest, Evaluation,
    EvaluationSummary, Recommendation, RecommendationCounts, SubmitEvaluationRequest, Team,
    TeamMember, TeamOwner, TeamRole, UpdateMemberRequest,
};
pub use service::{CollaborationService, extract_mentions};
