//! In-memory session repository.

use std::sync::Arc;

use dashmap::DashMap;

use super::models::{Session, SessionListQuery};

/// Process-local session store.
///
/// Each session lives under its own map entry; `update` runs the closure while
/// holding that entry's lock, so read-modify-write on a single session is atomic.
#[derive(Debug, Clone, Default)]
pub struct SessionRepository {
    sessions: Arc<DashMap<String, Session>>,
}

impl SessionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, session: Session) {
        self.sessions.insert(session.id.clone(), session);
    }

    pub fn get(&self, id: &str) -> Option<Session> {
        self.sessions.get(id).map(|entry| entry.value().clone())
    }

    /// List sessions matching the query, oldest first.
    pub fn list(&self, query: &SessionListQuery) -> Vec<Session> {
        let mut sessions: Vec<Session> = self
            .sessions
            .iter()
            .filter(|entry| query.matches(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        sessions.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        sessions
    }

    /// Mutate a session in place. Returns `None` when the id is unknown.
    pub fn update<T>(&self, id: &str, f: impl FnOnce(&mut Session) -> T) -> Option<T> {
        self.sessions.get_mut(id).map(|mut entry| f(entry.value_mut()))
    }
}
