//! In-memory assessment and submission store.

use std::sync::Arc;

use dashmap::DashMap;

use super::models::{Assessment, AssessmentListQuery, Submission};

#[derive(Debug, Clone, Default)]
pub struct AssessmentRepository {
    assessments: Arc<DashMap<String, Assessment>>,
    submissions: Arc<DashMap<String, Submission>>,
}

impl AssessmentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, assessment: Assessment) {
        self.assessments.insert(assessment.id.clone(), assessment);
    }

    pub fn get(&self, id: &str) -> Option<Assessment> {
        self.assessments.get(id).map(|entry| entry.value().clone())
    }

    pub fn list(&self, query: &AssessmentListQuery) -> Vec<Assessment> {
        let mut assessments: Vec<Assessment> = self
            .assessments
            .iter()
            .filter(|entry| query.matches(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        assessments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        assessments
    }

    pub fn update<T>(&self, id: &str, f: impl FnOnce(&mut Assessment) -> T) -> Option<T> {
        self.assessments
            .get_mut(id)
            .map(|mut entry| f(entry.value_mut()))
    }

    /// Remove an assessment together with its submissions.
    pub fn remove(&self, id: &str) -> Option<Assessment> {
        let removed = self.assessments.remove(id).map(|(_, a)| a)?;
        self.submissions.retain(|_, s| s.assessment_id != id);
        Some(removed)
    }

    pub fn insert_submission(&self, submission: Submission) {
        self.submissions.insert(submission.id.clone(), submission);
    }

    pub fn get_submission(&self, id: &str) -> Option<Submission> {
        self.submissions.get(id).map(|entry| entry.value().clone())
    }

    /// Submissions for one assessment, oldest first.
    pub fn submissions_for(&self, assessment_id: &str) -> Vec<Submission> {
        let mut submissions: Vec<Submission> = self
            .submissions
            .iter()
            .filter(|entry| entry.value().assessment_id == assessment_id)
            .map(|entry| entry.value().clone())
            .collect();
        submissions.sort_by(|a, b| a.submitted_at.cmp(&b.submitted_at).then(a.id.cmp(&b.id)));
        submissions
    }
}
