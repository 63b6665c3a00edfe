//! Hiring team and candidate feedback service.

use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{info, instrument};
use uuid::Uuid;

use super::error::{CollaborationError, CollaborationResult};
use super::models::{
    AddMemberRequest, Comment, CreateCommentRequest, CreateTeamRequest, Evaluation,
    EvaluationSummary, SubmitEvaluationRequest, Team, TeamMember, TeamRole, UpdateMemberRequest,
};

static MENTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|[^\w@])@([A-Za-z0-9_][A-Za-z0-9_.-]*)").expect("mention pattern is valid")
});

/// Extract `@name` mentions, deduplicated, in order of first appearance.
pub fn extract_mentions(content: &str) -> Vec<String> {
    let mut mentions: Vec<String> = Vec::new();
    for cap in MENTION_RE.captures_iter(content) {
        let name = cap[1].trim_end_matches(['.', '-']).to_string();
        if !name.is_empty() && !mentions.contains(&name) {
            mentions.push(name);
        }
    }
    mentions
}

#[derive(Clone, Default)]
pub struct CollaborationService {
    teams: Arc<DashMap<String, Team>>,
    /// Comments keyed by candidate id, oldest first.
    comments: Arc<DashMap<String, Vec<Comment>>>,
    /// Evaluations keyed by candidate id, one per evaluator.
    evaluations: Arc<DashMap<String, Vec<Evaluation>>>,
}

impl CollaborationService {
    pub fn new() -> Self {
        Self::default()
    }

    #[instrument(skip(self, request))]
    pub fn create_team(&self, request: CreateTeamRequest) -> CollaborationResult<Team> {
        let name = request.name.trim();
        if name.is_empty() {
            return Err(CollaborationError::Validation(
                "team name must not be empty".to_string(),
            ));
        }

        let now = Utc::now();
        let mut members = Vec::new();
        if let Some(owner) = request.owner {
            validate_identity(&owner.user_id, &owner.email)?;
            members.push(TeamMember {
                user_id: owner.user_id,
                name: owner.name,
                email: owner.email,
                role: TeamRole::Owner,
                joined_at: now,
            });
        }

        let team = Team {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            description: request.description,
            members,
            created_at: now,
            updated_at: now,
        };
        self.teams.insert(team.id.clone(), team.clone());
        info!(team_id = %team.id, "Created team");
        Ok(team)
    }

    pub fn list_teams(&self) -> Vec<Team> {
        let mut teams: Vec<Team> = self.teams.iter().map(|e| e.value().clone()).collect();
        teams.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        teams
    }

    pub fn get_team(&self, id: &str) -> CollaborationResult<Team> {
        self.teams
            .get(id)
            .map(|e| e.value().clone())
            .ok_or_else(|| CollaborationError::TeamNotFound(id.to_string()))
    }

    #[instrument(skip(self))]
    pub fn delete_team(&self, id: &str) -> CollaborationResult<()> {
        self.teams
            .remove(id)
            .ok_or_else(|| CollaborationError::TeamNotFound(id.to_string()))?;
        info!(team_id = %id, "Deleted team");
        Ok(())
    }

    #[instrument(skip(self, request), fields(user_id = %request.user_id))]
    pub fn add_member(&self, team_id: &str, request: AddMemberRequest) -> CollaborationResult<Team> {
        validate_identity(&request.user_id, &request.email)?;
        self.mutate_team(team_id, |team| {
            if team.members.iter().any(|m| m.user_id == request.user_id) {
                return Err(CollaborationError::DuplicateMember(request.user_id));
            }
            let now = Utc::now();
            team.members.push(TeamMember {
                user_id: request.user_id,
                name: request.name,
                email: request.email,
                role: request.role,
                joined_at: now,
            });
            team.updated_at = now;
            Ok(team.clone())
        })
    }

    #[instrument(skip(self, request))]
    pub fn update_member(
        &self,
        team_id: &str,
        user_id: &str,
        request: UpdateMemberRequest,
    ) -> CollaborationResult<Team> {
        self.mutate_team(team_id, |team| {
            let owners = team.owner_count();
            let member = team
                .members
                .iter_mut()
                .find(|m| m.user_id == user_id)
                .ok_or_else(|| member_not_found(team_id, user_id))?;
            if member.role == TeamRole::Owner && request.role != TeamRole::Owner && owners <= 1 {
                return Err(CollaborationError::LastOwner);
            }
            member.role = request.role;
            team.updated_at = Utc::now();
            Ok(team.clone())
        })
    }

    #[instrument(skip(self))]
    pub fn remove_member(&self, team_id: &str, user_id: &str) -> CollaborationResult<Team> {
        self.mutate_team(team_id, |team| {
            let index = team
                .members
                .iter()
                .position(|m| m.user_id == user_id)
                .ok_or_else(|| member_not_found(team_id, user_id))?;
            if team.members[index].role == TeamRole::Owner && team.owner_count() <= 1 {
                return Err(CollaborationError::LastOwner);
            }
            team.members.remove(index);
            team.updated_at = Utc::now();
            Ok(team.clone())
        })
    }

    #[instrument(skip(self, request), fields(author_id = %request.author_id))]
    pub fn add_comment(
        &self,
        candidate_id: &str,
        request: CreateCommentRequest,
    ) -> CollaborationResult<Comment> {
        let content = request.content.trim();
        if content.is_empty() {
            return Err(CollaborationError::Validation(
                "comment content must not be empty".to_string(),
            ));
        }
        if request.author_id.trim().is_empty() {
            return Err(CollaborationError::Validation(
                "authorId must not be empty".to_string(),
            ));
        }
        if let Some(team_id) = request.team_id.as_deref()
            && !self.teams.contains_key(team_id)
        {
            return Err(CollaborationError::TeamNotFound(team_id.to_string()));
        }

        let comment = Comment {
            id: Uuid::new_v4().to_string(),
            candidate_id: candidate_id.to_string(),
            author_id: request.author_id,
            author_name: request.author_name,
            mentions: extract_mentions(content),
            content: content.to_string(),
            team_id: request.team_id,
            created_at: Utc::now(),
        };
        self.comments
            .entry(candidate_id.to_string())
            .or_default()
            .push(comment.clone());
        info!(comment_id = %comment.id, mentions = comment.mentions.len(), "Added comment");
        Ok(comment)
    }

    pub fn list_comments(&self, candidate_id: &str) -> Vec<Comment> {
        let mut comments = self
            .comments
            .get(candidate_id)
            .map(|e| e.value().clone())
            .unwrap_or_default();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        comments
    }

    #[instrument(skip(self))]
    pub fn delete_comment(&self, candidate_id: &str, comment_id: &str) -> CollaborationResult<()> {
        let mut entry = self
            .comments
            .get_mut(candidate_id)
            .ok_or_else(|| CollaborationError::CommentNotFound(comment_id.to_string()))?;
        let index = entry
            .iter()
            .position(|c| c.id == comment_id)
            .ok_or_else(|| CollaborationError::CommentNotFound(comment_id.to_string()))?;
        entry.remove(index);
        Ok(())
    }

    /// Record an evaluation, replacing any earlier one by the same evaluator.
    #[instrument(skip(self, request), fields(evaluator_id = %request.evaluator_id))]
    pub fn submit_evaluation(
        &self,
        candidate_id: &str,
        request: SubmitEvaluationRequest,
    ) -> CollaborationResult<Evaluation> {
        if request.evaluator_id.trim().is_empty() {
            return Err(CollaborationError::Validation(
                "evaluatorId must not be empty".to_string(),
            ));
        }
        if !(1..=5).contains(&request.rating) {
            return Err(CollaborationError::Validation(format!(
                "rating must be between 1 and 5, got {}",
                request.rating
            )));
        }

        let now = Utc::now();
        let mut entry = self.evaluations.entry(candidate_id.to_string()).or_default();
        let evaluation = match entry
            .iter_mut()
            .find(|e| e.evaluator_id == request.evaluator_id)
        {
            Some(existing) => {
                existing.rating = request.rating;
                existing.recommendation = request.recommendation;
                existing.notes = request.notes;
                existing.updated_at = now;
                existing.clone()
            }
            None => {
                let evaluation = Evaluation {
                    id: Uuid::new_v4().to_string(),
                    candidate_id: candidate_id.to_string(),
                    evaluator_id: request.evaluator_id,
                    rating: request.rating,
                    recommendation: request.recommendation,
                    notes: request.notes,
                    created_at: now,
                    updated_at: now,
                };
                entry.push(evaluation.clone());
                evaluation
            }
        };
        Ok(evaluation)
    }

    pub fn list_evaluations(&self, candidate_id: &str) -> Vec<Evaluation> {
        self.evaluations
            .get(candidate_id)
            .map(|e| e.value().clone())
            .unwrap_or_default()
    }

    pub fn summary(&self, candidate_id: &str) -> EvaluationSummary {
        EvaluationSummary::from_evaluations(candidate_id, &self.list_evaluations(candidate_id))
    }

    fn mutate_team<T>(
        &self,
        id: &str,
        f: impl FnOnce(&mut Team) -> CollaborationResult<T>,
    ) -> CollaborationResult<T> {
        match self.teams.get_mut(id) {
            Some(mut entry) => f(entry.value_mut()),
            None => Err(CollaborationError::TeamNotFound(id.to_string())),
        }
    }
}

fn validate_identity(user_id: &str, email: &str) -> CollaborationResult<()> {
    if user_id.trim().is_empty() {
        return Err(CollaborationError::Validation(
            "userId must not be empty".to_string(),
        ));
    }
    if !email.contains('@') {
        return Err(CollaborationError::Validation(format!(
            "invalid email address: {email}"
        )));
    }
    Ok(())
}

fn member_not_found(team_id: &str, user_id: &str) -> CollaborationError {
    CollaborationError::MemberNotFound {
        team_id: team_id.to_string(),
        user_id: user_id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaboration::models::{Recommendation, TeamOwner};

    fn team_with_owner(svc: &CollaborationService) -> Team {
        svc.create_team(CreateTeamRequest {
            name: "Platform hiring".to_string(),
            description: None,
            owner: Some(TeamOwner {
                user_id: "u1".to_string(),
                name: "Ana".to_string(),
                email: "ana@example.com".to_string(),
            }),
        })
        .unwrap()
    }

    fn member(user_id: &str, role: TeamRole) -> AddMemberRequest {
        AddMemberRequest {
            user_id: user_id.to_string(),
            name: user_id.to_uppercase(),
            email: format!("{user_id}@example.com"),
            role,
        }
    }

    fn comment(content: &str) -> CreateCommentRequest {
        CreateCommentRequest {
            author_id: "u1".to_string(),
            author_name: "Ana".to_string(),
            content: content.to_string(),
            team_id: None,
        }
    }

    fn evaluation(evaluator: &str, rating: u8, rec: Recommendation) -> SubmitEvaluationRequest {
        SubmitEvaluationRequest {
            evaluator_id: evaluator.to_string(),
            rating,
            recommendation: rec,
            notes: None,
        }
    }

    #[test]
    fn test_extract_mentions() {
        assert_eq!(
            extract_mentions("@bob please pair with @carol.smith, cc @bob."),
            vec!["bob".to_string(), "carol.smith".to_string()]
        );
        assert!(extract_mentions("mail me at dev@example.com").is_empty());
        assert!(extract_mentions("no mentions here").is_empty());
    }

    #[test]
    fn test_create_team_requires_name() {
        let svc = CollaborationService::new();
        let err = svc
            .create_team(CreateTeamRequest {
                name: "  ".to_string(),
                description: None,
                owner: None,
            })
            .unwrap_err();
        assert!(matches!(err, CollaborationError::Validation(_)));
    }

    #[test]
    fn test_member_rules() {
        let svc = CollaborationService::new();
        let team = team_with_owner(&svc);
        assert_eq!(team.members[0].role, TeamRole::Owner);

        svc.add_member(&team.id, member("u2", TeamRole::Recruiter))
            .unwrap();
        assert!(matches!(
            svc.add_member(&team.id, member("u2", TeamRole::Viewer))
                .unwrap_err(),
            CollaborationError::DuplicateMember(_)
        ));

        let mut bad_email = member("u3", TeamRole::Viewer);
        bad_email.email = "nope".to_string();
        assert!(matches!(
            svc.add_member(&team.id, bad_email).unwrap_err(),
            CollaborationError::Validation(_)
        ));

        assert!(matches!(
            svc.remove_member(&team.id, "u1").unwrap_err(),
            CollaborationError::LastOwner
        ));
        assert!(matches!(
            svc.update_member(
                &team.id,
                "u1",
                UpdateMemberRequest {
                    role: TeamRole::Admin
                }
            )
            .unwrap_err(),
            CollaborationError::LastOwner
        ));

        svc.update_member(
            &team.id,
            "u2",
            UpdateMemberRequest {
                role: TeamRole::Owner,
            },
        )
        .unwrap();
        let team = svc.remove_member(&team.id, "u1").unwrap();
        assert_eq!(team.members.len(), 1);
        assert_eq!(team.owner_count(), 1);
    }

    #[test]
    fn test_comments_chronological_and_deletable() {
        let svc = CollaborationService::new();
        let first = svc.add_comment("cand", comment("Strong systems design, @bob")).unwrap();
        svc.add_comment("cand", comment("Follow up on testing")).unwrap();
        assert_eq!(first.mentions, vec!["bob".to_string()]);

        let comments = svc.list_comments("cand");
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].id, first.id);

        svc.delete_comment("cand", &first.id).unwrap();
        assert_eq!(svc.list_comments("cand").len(), 1);
        assert!(svc.delete_comment("cand", &first.id).is_err());
        assert!(svc.add_comment("cand", comment(" ")).is_err());
    }

    #[test]
    fn test_comment_team_must_exist() {
        let svc = CollaborationService::new();
        let mut request = comment("hello");
        request.team_id = Some("missing".to_string());
        assert!(matches!(
            svc.add_comment("cand", request).unwrap_err(),
            CollaborationError::TeamNotFound(_)
        ));
    }

    #[test]
    fn test_evaluation_replaced_per_evaluator() {
        let svc = CollaborationService::new();
        svc.submit_evaluation("cand", evaluation("u1", 2, Recommendation::NoHire))
            .unwrap();
        svc.submit_evaluation("cand", evaluation("u1", 5, Recommendation::StrongHire))
            .unwrap();
        svc.submit_evaluation("cand", evaluation("u2", 4, Recommendation::StrongHire))
            .unwrap();

        let evaluations = svc.list_evaluations("cand");
        assert_eq!(evaluations.len(), 2);

        let summary = svc.summary("cand");
        assert_eq!(summary.count, 2);
        assert_eq!(summary.average_rating, 4.5);
        assert_eq!(summary.consensus, Some(Recommendation::StrongHire));

        assert!(
            svc.submit_evaluation("cand", evaluation("u3", 6, Recommendation::Hire))
                .is_err()
        );
        assert!(
            svc.submit_evaluation("cand", evaluation("u3", 0, Recommendation::Hire))
                .is_err()
        );
    }
}
