//! Collaboration error types.

use thiserror::Error;

pub type CollaborationResult<T> = Result<T, CollaborationError>;

#[derive(Debug, Error)]
pub enum CollaborationError {
    #[error("Team {0} not found")]
    TeamNotFound(String),

    #[error("Member {user_id} not found in team {team_id}")]
    MemberNotFound { team_id: String, user_id: String },

    #[error("Comment {0} not found")]
    CommentNotFound(String),

    #[error("User {0} is already a member of this team")]
    DuplicateMember(String),

    #[error("A team must keep at least one owner")]
    LastOwner,

    #[error("Invalid request: {0}")]
    Validation(String),
}
