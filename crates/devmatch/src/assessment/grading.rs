//! Answer grading and simulated predictions.
//!
//! MCQ answers are checked against the stored key. Coding and essay answers
//! get a mock score inside a fixed band of the question's points, and the
//! hiring predictions are the percentage plus jitter. All randomness comes
//! from a [`ScoreSource`] so tests can pin it.

use std::collections::HashMap;
use std::sync::Arc;

use rand::Rng;
use serde_json::Value;

use super::models::{
    AiPredictions, Answer, Assessment, ExperienceLevel, Question, QuestionResult, QuestionType,
};

/// Mock score band for coding answers, as a fraction of the points.
pub const CODING_BAND: (f64, f64) = (0.6, 1.0);
/// Mock score band for essay answers, as a fraction of the points.
pub const ESSAY_BAND: (f64, f64) = (0.5, 0.9);
/// Upper bound of the job-success jitter, in percentage points.
pub const JOB_SUCCESS_JITTER: f64 = 10.0;
/// Upper bound of the retention jitter, in percentage points.
pub const RETENTION_JITTER: f64 = 15.0;

/// Source of values in a closed range.
pub trait ScoreSource: Send + Sync {
    /// Return a value in `[low, high]`.
    fn sample(&self, low: f64, high: f64) -> f64;
}

/// Uniformly random samples.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomScoreSource;

impl ScoreSource for RandomScoreSource {
    fn sample(&self, low: f64, high: f64) -> f64 {
        if high <= low {
            return low;
        }
        rand::rng().random_range(low..=high)
    }
}

/// Always samples the same relative position in the range (0.0 = low, 1.0 = high).
#[derive(Debug, Clone, Copy)]
pub struct FixedScoreSource(pub f64);

impl ScoreSource for FixedScoreSource {
    fn sample(&self, low: f64, high: f64) -> f64 {
        low + (high - low) * self.0.clamp(0.0, 1.0)
    }
}

/// Totals for a graded submission.
#[derive(Debug, Clone)]
pub struct GradeOutcome {
    pub results: Vec<QuestionResult>,
    pub total_score: u32,
    pub max_score: u32,
    pub percentage: u8,
    pub passed: bool,
}

#[derive(Clone)]
pub struct Grader {
    source: Arc<dyn ScoreSource>,
    max_prediction: u8,
}

impl Grader {
    pub fn new(source: Arc<dyn ScoreSource>, max_prediction: u8) -> Self {
        Self {
            source,
            max_prediction: max_prediction.min(100),
        }
    }

    /// Grade every question of the assessment. Unanswered questions score 0.
    pub fn grade(&self, assessment: &Assessment, answers: &[Answer]) -> GradeOutcome {
        let by_question: HashMap<&str, &Value> = answers
            .iter()
            .map(|a| (a.question_id.as_str(), &a.answer))
            .collect();

        let results: Vec<QuestionResult> = assessment
            .questions
            .iter()
            .map(|q| self.grade_question(q, by_question.get(q.id.as_str()).copied()))
            .collect();

        let total_score = results.iter().map(|r| r.score).sum();
        let max_score = assessment.max_score();
        let percentage = percentage(total_score, max_score);

        GradeOutcome {
            results,
            total_score,
            max_score,
            percentage,
            passed: percentage >= assessment.passing_score,
        }
    }

    pub fn grade_question(&self, question: &Question, answer: Option<&Value>) -> QuestionResult {
        let (is_correct, score, feedback) = match question.kind {
            QuestionType::Mcq => {
                let correct = matches!(
                    (answer.and_then(Value::as_u64), question.correct_answer),
                    (Some(given), Some(key)) if given == key as u64
                );
                let feedback = if answer.is_none_or(is_blank) {
                    "No answer provided"
                } else if correct {
                    "Correct"
                } else {
                    "Incorrect"
                };
                (
                    Some(correct),
                    if correct { question.points } else { 0 },
                    feedback,
                )
            }
            QuestionType::Coding => self.mock_score(
                question.points,
                answer,
                CODING_BAND,
                "Solution evaluated against hidden test cases",
            ),
            QuestionType::Essay => self.mock_score(
                question.points,
                answer,
                ESSAY_BAND,
                "Response evaluated for clarity and depth",
            ),
        };

        QuestionResult {
            question_id: question.id.clone(),
            question_type: question.kind,
            is_correct,
            score,
            max_score: question.points,
            feedback: feedback.to_string(),
        }
    }

    /// Simulated predictions, capped at `max_prediction`.
    pub fn predict(&self, percentage: u8) -> AiPredictions {
        let base = f64::from(percentage);
        let cap = f64::from(self.max_prediction);
        let job = (base + self.source.sample(0.0, JOB_SUCCESS_JITTER)).min(cap);
        let retention = (base + self.source.sample(0.0, RETENTION_JITTER)).min(cap);

        AiPredictions {
            job_success_probability: job.round().clamp(0.0, cap) as u8,
            retention_probability: retention.round().clamp(0.0, cap) as u8,
            recommended_level: ExperienceLevel::from_percentage(percentage),
        }
    }

    fn mock_score(
        &self,
        points: u32,
        answer: Option<&Value>,
        (low, high): (f64, f64),
        feedback: &'static str,
    ) -> (Option<bool>, u32, &'static str) {
        if answer.is_none_or(is_blank) {
            return (None, 0, "No answer provided");
        }
        let fraction = self.source.sample(low, high).clamp(0.0, 1.0);
        let score = (f64::from(points) * fraction).round() as u32;
        (None, score.min(points), feedback)
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Rounded integer percentage; 0 when nothing could be scored.
pub fn percentage(total: u32, max: u32) -> u8 {
    if max == 0 {
        return 0;
    }
    ((f64::from(total) * 100.0 / f64::from(max)).round() as u32).min(100) as u8
}
