//! Collaboration data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamRole {
    Owner,
    Admin,
    Recruiter,
    Interviewer,
    Viewer,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub role: TeamRole,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub members: Vec<TeamMember>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Team {
    pub fn owner_count(&self) -> usize {
        self.members
            .iter()
            .filter(|m| m.role == TeamRole::Owner)
            .count()
    }
}

/// Identity of the user creating a team, added as its owner.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamOwner {
    pub user_id: String,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTeamRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub owner: Option<TeamOwner>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMemberRequest {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub role: TeamRole,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMemberRequest {
    pub role: TeamRole,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub candidate_id: String,
    pub author_id: String,
    pub author_name: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_id: Option<String>,
    /// Names referenced as `@name` in the content, in order of appearance.
    pub mentions: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub author_id: String,
    pub author_name: String,
    pub content: String,
    #[serde(default)]
    pub team_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    StrongHire,
    Hire,
    NoHire,
    StrongNoHire,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    pub id: String,
    pub candidate_id: String,
    pub evaluator_id: String,
    /// 1 to 5.
    pub rating: u8,
    pub recommendation: Recommendation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitEvaluationRequest {
    pub evaluator_id: String,
    pub rating: u8,
    pub recommendation: Recommendation,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationCounts {
    pub strong_hire: usize,
    pub hire: usize,
    pub no_hire: usize,
    pub strong_no_hire: usize,
}

impl RecommendationCounts {
    fn bump(&mut self, recommendation: Recommendation) {
        match recommendation {
            Recommendation::StrongHire => self.strong_hire += 1,
            Recommendation::Hire => self.hire += 1,
            Recommendation::NoHire => self.no_hire += 1,
            Recommendation::StrongNoHire => self.strong_no_hire += 1,
        }
    }

    fn pairs(&self) -> [(Recommendation, usize); 4] {
        [
            (Recommendation::StrongHire, self.strong_hire),
            (Recommendation::Hire, self.hire),
            (Recommendation::NoHire, self.no_hire),
            (Recommendation::StrongNoHire, self.strong_no_hire),
        ]
    }
}

/// Aggregate of every evaluation for one candidate.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationSummary {
    pub candidate_id: String,
    pub count: usize,
    pub average_rating: f64,
    pub recommendations: RecommendationCounts,
    /// Recommendation held by more than half of the evaluators.
    pub consensus: Option<Recommendation>,
}

impl EvaluationSummary {
    pub fn from_evaluations(candidate_id: &str, evaluations: &[Evaluation]) -> Self {
        let count = evaluations.len();
        let mut recommendations = RecommendationCounts::default();
        for evaluation in evaluations {
            recommendations.bump(evaluation.recommendation);
        }
        let average_rating = if count == 0 {
            0.0
        } else {
            let sum: u32 = evaluations.iter().map(|e| u32::from(e.rating)).sum();
            (f64::from(sum) / count as f64 * 100.0).round() / 100.0
        };
        let consensus = recommendations
            .pairs()
            .into_iter()
            .find(|(_, n)| *n * 2 > count)
            .map(|(r, _)| r);

        Self {
            candidate_id: candidate_id.to_string(),
            count,
            average_rating,
            recommendations,
            consensus,
        }
    }
}
