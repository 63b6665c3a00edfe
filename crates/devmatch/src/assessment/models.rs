//! Assessment data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of question, which decides how it is graded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    Mcq,
    Coding,
    Essay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

/// A question as stored, including the answer key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: QuestionType,
    pub prompt: String,
    pub points: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    /// Index into `options` for MCQ questions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub skills: Vec<String>,
    pub duration_minutes: u32,
    /// Minimum percentage required to pass.
    pub passing_score: u8,
    pub status: AssessmentStatus,
    pub questions: Vec<Question>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Assessment {
    pub fn max_score(&self) -> u32 {
        self.questions.iter().map(|q| q.points).sum()
    }
}

/// Question as supplied by the author; the id is optional.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewQuestion {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: QuestionType,
    pub prompt: String,
    pub points: u32,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub correct_answer: Option<usize>,
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAssessmentRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub duration_minutes: Option<u32>,
    #[serde(default)]
    pub passing_score: Option<u8>,
    pub questions: Vec<NewQuestion>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAssessmentRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub role: Option<String>,
    pub skills: Option<Vec<String>>,
    pub duration_minutes: Option<u32>,
    pub passing_score: Option<u8>,
    pub status: Option<AssessmentStatus>,
    /// Replacing questions is only allowed while the assessment is a draft.
    pub questions: Option<Vec<NewQuestion>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentListQuery {
    pub skill: Option<String>,
    pub status: Option<AssessmentStatus>,
}

impl AssessmentListQuery {
    pub fn matches(&self, assessment: &Assessment) -> bool {
        self.status.is_none_or(|s| assessment.status == s)
            && self.skill.as_deref().is_none_or(|skill| {
                assessment
                    .skills
                    .iter()
                    .any(|s| s.eq_ignore_ascii_case(skill))
            })
    }
}

/// A question with the answer key removed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateQuestion {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: QuestionType,
    pub prompt: String,
    pub points: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// What a candidate sees when taking an assessment.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateAssessment {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub duration_minutes: u32,
    pub total_points: u32,
    pub questions: Vec<CandidateQuestion>,
}

impl From<&Assessment> for CandidateAssessment {
    fn from(assessment: &Assessment) -> Self {
        Self {
            id: assessment.id.clone(),
            title: assessment.title.clone(),
            description: assessment.description.clone(),
            duration_minutes: assessment.duration_minutes,
            total_points: assessment.max_score(),
            questions: assessment
                .questions
                .iter()
                .map(|q| CandidateQuestion {
                    id: q.id.clone(),
                    kind: q.kind,
                    prompt: q.prompt.clone(),
                    points: q.points,
                    options: q.options.clone(),
                    language: q.language.clone(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub question_id: String,
    #[serde(default)]
    pub answer: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAssessmentRequest {
    pub candidate_id: String,
    #[serde(default)]
    pub answers: Vec<Answer>,
    #[serde(default)]
    pub time_taken_secs: Option<u64>,
}

/// Grading outcome for one question.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResult {
    pub question_id: String,
    pub question_type: QuestionType,
    /// Only MCQ answers are right or wrong.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_correct: Option<bool>,
    pub score: u32,
    pub max_score: u32,
    pub feedback: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceLevel {
    Junior,
    Mid,
    Senior,
}

impl ExperienceLevel {
    pub fn from_percentage(percentage: u8) -> Self {
        if percentage >= 85 {
            ExperienceLevel::Senior
        } else if percentage >= 65 {
            ExperienceLevel::Mid
        } else {
            ExperienceLevel::Junior
        }
    }
}

/// Simulated hiring predictions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiPredictions {
    pub job_success_probability: u8,
    pub retention_probability: u8,
    pub recommended_level: ExperienceLevel,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: String,
    pub assessment_id: String,
    pub candidate_id: String,
    pub results: Vec<QuestionResult>,
    pub total_score: u32,
    pub max_score: u32,
    pub percentage: u8,
    pub passed: bool,
    pub ai_predictions: AiPredictions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_taken_secs: Option<u64>,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentStats {
    pub assessment_id: String,
    pub submissions: usize,
    pub passed: usize,
    pub pass_rate: f64,
    pub average_percentage: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_percentage: Option<u8>,
}

impl AssessmentStats {
    pub fn from_submissions(assessment_id: &str, submissions: &[Submission]) -> Self {
        let count = submissions.len();
        let passed = submissions.iter().filter(|s| s.passed).count();
        let (pass_rate, average_percentage) = if count == 0 {
            (0.0, 0.0)
        } else {
            let sum: u32 = submissions.iter().map(|s| u32::from(s.percentage)).sum();
            (
                round2(passed as f64 * 100.0 / count as f64),
                round2(f64::from(sum) / count as f64),
            )
        };

        Self {
            assessment_id: assessment_id.to_string(),
            submissions: count,
            passed,
            pass_rate,
            average_percentage,
            best_percentage: submissions.iter().map(|s| s.percentage).max(),
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
