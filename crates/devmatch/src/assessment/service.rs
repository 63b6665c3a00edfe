//! Assessment service - authoring, submission and grading.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument};
use uuid::Uuid;

use super::error::{AssessmentError, AssessmentResult};
use super::grading::{Grader, RandomScoreSource, ScoreSource};
use super::models::{
    Assessment, AssessmentListQuery, AssessmentStats, AssessmentStatus, CandidateAssessment,
    CreateAssessmentRequest, NewQuestion, Question, QuestionType, SubmitAssessmentRequest,
    Submission, UpdateAssessmentRequest,
};
use super::repository::AssessmentRepository;

/// Default minimum percentage to pass.
const DEFAULT_PASSING_SCORE: u8 = 70;

/// Default time limit when the author gives none.
const DEFAULT_DURATION_MINUTES: u32 = 60;

/// Upper bound on the points of a single question.
pub const MAX_QUESTION_POINTS: u32 = 10_000;

/// Upper bound on questions per assessment. Together with
/// `MAX_QUESTION_POINTS` this keeps score totals well inside `u32`.
pub const MAX_QUESTIONS: usize = 500;

#[derive(Debug, Clone)]
pub struct AssessmentServiceConfig {
    pub default_passing_score: u8,
    /// Ceiling for simulated prediction probabilities.
    pub max_prediction: u8,
}

impl Default for AssessmentServiceConfig {
    fn default() -> Self {
        Self {
            default_passing_score: DEFAULT_PASSING_SCORE,
            max_prediction: 95,
        }
    }
}

#[derive(Clone)]
pub struct AssessmentService {
    repo: AssessmentRepository,
    grader: Grader,
    config: AssessmentServiceConfig,
}

impl AssessmentService {
    /// Create a service that grades with random mock scores.
    pub fn new(repo: AssessmentRepository, config: AssessmentServiceConfig) -> Self {
        Self::with_score_source(repo, Arc::new(RandomScoreSource), config)
    }

    pub fn with_score_source(
        repo: AssessmentRepository,
        source: Arc<dyn ScoreSource>,
        config: AssessmentServiceConfig,
    ) -> Self {
        Self {
            repo,
            grader: Grader::new(source, config.max_prediction),
            config,
        }
    }

    #[instrument(skip(self, request), fields(title = %request.title))]
    pub fn create_assessment(
        &self,
        request: CreateAssessmentRequest,
    ) -> AssessmentResult<Assessment> {
        let title = non_empty_title(&request.title)?;
        let passing_score = request
            .passing_score
            .unwrap_or(self.config.default_passing_score);
        validate_passing_score(passing_score)?;
        let questions = build_questions(request.questions)?;

        let now = Utc::now();
        let assessment = Assessment {
            id: Uuid::new_v4().to_string(),
            title,
            description: request.description,
            role: request.role,
            skills: normalize_skills(request.skills),
            duration_minutes: request
                .duration_minutes
                .filter(|d| *d > 0)
                .unwrap_or(DEFAULT_DURATION_MINUTES),
            passing_score,
            status: AssessmentStatus::Draft,
            questions,
            created_at: now,
            updated_at: now,
        };
        self.repo.insert(assessment.clone());
        info!(assessment_id = %assessment.id, questions = assessment.questions.len(), "Created assessment");

        Ok(assessment)
    }

    pub fn list_assessments(&self, query: &AssessmentListQuery) -> Vec<Assessment> {
        self.repo.list(query)
    }

    pub fn get_assessment(&self, id: &str) -> AssessmentResult<Assessment> {
        self.repo
            .get(id)
            .ok_or_else(|| AssessmentError::NotFound(id.to_string()))
    }

    #[instrument(skip(self, request))]
    pub fn update_assessment(
        &self,
        id: &str,
        request: UpdateAssessmentRequest,
    ) -> AssessmentResult<Assessment> {
        let title = request.title.as_deref().map(non_empty_title).transpose()?;
        if let Some(score) = request.passing_score {
            validate_passing_score(score)?;
        }
        let questions = request.questions.map(build_questions).transpose()?;

        self.repo
            .update(id, |assessment| {
                if let Some(status) = request.status {
                    check_status_change(assessment.status, status)?;
                }
                if questions.is_some() && assessment.status != AssessmentStatus::Draft {
                    return Err(AssessmentError::Validation(
                        "questions can only be changed while the assessment is a draft"
                            .to_string(),
                    ));
                }
                if let Some(title) = title {
                    assessment.title = title;
                }
                if let Some(description) = request.description {
                    assessment.description = Some(description);
                }
                if let Some(role) = request.role {
                    assessment.role = Some(role);
                }
                if let Some(skills) = request.skills {
                    assessment.skills = normalize_skills(skills);
                }
                if let Some(duration) = request.duration_minutes.filter(|d| *d > 0) {
                    assessment.duration_minutes = duration;
                }
                if let Some(score) = request.passing_score {
                    assessment.passing_score = score;
                }
                if let Some(status) = request.status {
                    assessment.status = status;
                }
                if let Some(questions) = questions {
                    assessment.questions = questions;
                }
                assessment.updated_at = Utc::now();
                info!(assessment_id = %assessment.id, "Updated assessment");
                Ok(assessment.clone())
            })
            .unwrap_or_else(|| Err(AssessmentError::NotFound(id.to_string())))
    }

    #[instrument(skip(self))]
    pub fn delete_assessment(&self, id: &str) -> AssessmentResult<()> {
        self.repo
            .remove(id)
            .ok_or_else(|| AssessmentError::NotFound(id.to_string()))?;
        info!(assessment_id = %id, "Deleted assessment");
        Ok(())
    }

    #[instrument(skip(self))]
    pub fn publish_assessment(&self, id: &str) -> AssessmentResult<Assessment> {
        self.repo
            .update(id, |assessment| {
                if assessment.status != AssessmentStatus::Draft {
                    return Err(AssessmentError::Validation(format!(
                        "only draft assessments can be published (status is {:?})",
                        assessment.status
                    )));
                }
                assessment.status = AssessmentStatus::Published;
                assessment.updated_at = Utc::now();
                info!(assessment_id = %assessment.id, "Published assessment");
                Ok(assessment.clone())
            })
            .unwrap_or_else(|| Err(AssessmentError::NotFound(id.to_string())))
    }

    /// The assessment as shown to candidates, without answer keys.
    pub fn candidate_view(&self, id: &str) -> AssessmentResult<CandidateAssessment> {
        let assessment = self.get_assessment(id)?;
        if assessment.status != AssessmentStatus::Published {
            return Err(AssessmentError::NotPublished(id.to_string()));
        }
        Ok(CandidateAssessment::from(&assessment))
    }

    #[instrument(skip(self, request), fields(candidate_id = %request.candidate_id, answers = request.answers.len()))]
    pub fn submit(
        &self,
        id: &str,
        request: SubmitAssessmentRequest,
    ) -> AssessmentResult<Submission> {
        if request.candidate_id.trim().is_empty() {
            return Err(AssessmentError::Validation(
                "candidateId must not be empty".to_string(),
            ));
        }
        let assessment = self.get_assessment(id)?;
        if assessment.status != AssessmentStatus::Published {
            return Err(AssessmentError::NotPublished(id.to_string()));
        }

        let outcome = self.grader.grade(&assessment, &request.answers);
        let submission = Submission {
            id: Uuid::new_v4().to_string(),
            assessment_id: assessment.id.clone(),
            candidate_id: request.candidate_id,
            ai_predictions: self.grader.predict(outcome.percentage),
            results: outcome.results,
            total_score: outcome.total_score,
            max_score: outcome.max_score,
            percentage: outcome.percentage,
            passed: outcome.passed,
            time_taken_secs: request.time_taken_secs,
            submitted_at: Utc::now(),
        };
        self.repo.insert_submission(submission.clone());
        info!(
            submission_id = %submission.id,
            percentage = submission.percentage,
            passed = submission.passed,
            "Graded submission"
        );

        Ok(submission)
    }

    pub fn list_submissions(&self, assessment_id: &str) -> AssessmentResult<Vec<Submission>> {
        self.get_assessment(assessment_id)?;
        Ok(self.repo.submissions_for(assessment_id))
    }

    pub fn get_submission(
        &self,
        assessment_id: &str,
        submission_id: &str,
    ) -> AssessmentResult<Submission> {
        self.get_assessment(assessment_id)?;
        self.repo
            .get_submission(submission_id)
            .filter(|s| s.assessment_id == assessment_id)
            .ok_or_else(|| AssessmentError::SubmissionNotFound(submission_id.to_string()))
    }

    pub fn stats(&self, assessment_id: &str) -> AssessmentResult<AssessmentStats> {
        let submissions = self.list_submissions(assessment_id)?;
        Ok(AssessmentStats::from_submissions(assessment_id, &submissions))
    }
}

fn non_empty_title(title: &str) -> AssessmentResult<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(AssessmentError::Validation(
            "title must not be empty".to_string(),
        ));
    }
    Ok(title.to_string())
}

fn validate_passing_score(score: u8) -> AssessmentResult<()> {
    if score > 100 {
        return Err(AssessmentError::Validation(
            "passingScore must be between 0 and 100".to_string(),
        ));
    }
    Ok(())
}

fn normalize_skills(skills: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    skills
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty() && seen.insert(s.to_lowercase()))
        .collect()
}

/// Status changes allowed through an update. Publishing has its own
/// operation and nothing returns to draft.
fn check_status_change(from: AssessmentStatus, to: AssessmentStatus) -> AssessmentResult<()> {
    match (from, to) {
        (a, b) if a == b => Ok(()),
        (AssessmentStatus::Published, AssessmentStatus::Archived) => Ok(()),
        _ => Err(AssessmentError::Validation(format!(
            "cannot change assessment status from {from:?} to {to:?}"
        ))),
    }
}

/// Validate authored questions and assign missing ids.
fn build_questions(questions: Vec<NewQuestion>) -> AssessmentResult<Vec<Question>> {
    if questions.is_empty() {
        return Err(AssessmentError::Validation(
            "an assessment needs at least one question".to_string(),
        ));
    }
    if questions.len() > MAX_QUESTIONS {
        return Err(AssessmentError::Validation(format!(
            "an assessment can have at most {MAX_QUESTIONS} questions"
        )));
    }

    // Explicit ids are reserved first so generated ones never collide with them.
    let mut ids = HashSet::new();
    for q in &questions {
        if let Some(id) = q.id.as_deref().map(str::trim).filter(|id| !id.is_empty())
            && !ids.insert(id.to_string())
        {
            return Err(AssessmentError::Validation(format!(
                "duplicate question id {id}"
            )));
        }
    }

    let mut next_generated = 1usize;
    let mut built = Vec::with_capacity(questions.len());
    for (index, q) in questions.into_iter().enumerate() {
        let position = index + 1;
        if q.prompt.trim().is_empty() {
            return Err(AssessmentError::Validation(format!(
                "question {position} has an empty prompt"
            )));
        }
        if q.points == 0 || q.points > MAX_QUESTION_POINTS {
            return Err(AssessmentError::Validation(format!(
                "question {position} must be worth between 1 and {MAX_QUESTION_POINTS} points"
            )));
        }
        if q.kind == QuestionType::Mcq {
            if q.options.len() < 2 {
                return Err(AssessmentError::Validation(format!(
                    "question {position} needs at least two options"
                )));
            }
            match q.correct_answer {
                Some(i) if i < q.options.len() => {}
                _ => {
                    return Err(AssessmentError::Validation(format!(
                        "question {position} needs a correct answer index within its options"
                    )));
                }
            }
        }

        let id = match q.id.as_deref().map(str::trim).filter(|id| !id.is_empty()) {
            Some(id) => id.to_string(),
            None => loop {
                let candidate = format!("q{next_generated}");
                next_generated += 1;
                if ids.insert(candidate.clone()) {
                    break candidate;
                }
            },
        };

        built.push(Question {
            id,
            kind: q.kind,
            prompt: q.prompt,
            points: q.points,
            options: q.options,
            correct_answer: if q.kind == QuestionType::Mcq {
                q.correct_answer
            } else {
                None
            },
            language: q.language,
        });
    }
    Ok(built)
}
