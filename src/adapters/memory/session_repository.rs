//! In-memory consultation session repository.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ResearcherId, SessionId, UserId};
use crate::domain::session::{ConsultationSession, SessionStatus};
use crate::ports::SessionRepository;

#[derive(Default)]
pub struct InMemorySessionRepository {
    sessions: RwLock<HashMap<SessionId, ConsultationSession>>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    async fn collect_sorted<F>(&self, keep: F) -> Vec<ConsultationSession>
    where
        F: Fn(&ConsultationSession) -> bool,
    {
        let mut found: Vec<ConsultationSession> = self
            .sessions
            .read()
            .await
            .values()
            .filter(|s| keep(s))
            .cloned()
            .collect();
        found.sort_by_key(|s| s.start_time());
        found
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn save(&self, session: &ConsultationSession) -> Result<(), DomainError> {
        self.sessions
            .write()
            .await
            .insert(session.id(), session.clone());
        Ok(())
    }

    async fn update_if_status(
        &self,
        session: &ConsultationSession,
        expected: SessionStatus,
    ) -> Result<bool, DomainError> {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(&session.id()) {
            Some(stored) if stored.status() == expected => {
                *stored = session.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn find_by_id(&self, id: &SessionId) -> Result<Option<ConsultationSession>, DomainError> {
        Ok(self.sessions.read().await.get(id).cloned())
    }

    async fn find_by_user_id(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<ConsultationSession>, DomainError> {
        Ok(self.collect_sorted(|s| s.user_id() == *user_id).await)
    }

    async fn find_by_researcher_id(
        &self,
        researcher_id: &ResearcherId,
    ) -> Result<Vec<ConsultationSession>, DomainError> {
        Ok(self
            .collect_sorted(|s| s.researcher_id() == *researcher_id)
            .await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::Timestamp;

    fn booked() -> ConsultationSession {
        let start = Timestamp::now().add_hours(48);
        ConsultationSession::schedule(UserId::new(), ResearcherId::new(), None, start, start.add_hours(1))
            .unwrap()
    }

    #[tokio::test]
    async fn write_applies_when_status_matches() {
        let repo = InMemorySessionRepository::new();
        let mut session = booked();
        repo.save(&session).await.unwrap();

        session.set_meeting_link(Some("https://meet.local/j/1?pwd=local".to_string()));
        assert!(repo.update_if_status(&session, SessionStatus::Scheduled).await.unwrap());

        let stored = repo.find_by_id(&session.id()).await.unwrap().unwrap();
        assert!(stored.meeting_link().is_some());
    }

    #[tokio::test]
    async fn stale_write_is_refused() {
        let repo = InMemorySessionRepository::new();
        let session = booked();
        repo.save(&session).await.unwrap();

        let mut canceled = session.clone();
        canceled.cancel(Timestamp::now(), chrono::Duration::hours(24)).unwrap();
        assert!(repo.update_if_status(&canceled, SessionStatus::Scheduled).await.unwrap());

        // A writer still holding the scheduled copy loses.
        assert!(!repo.update_if_status(&session, SessionStatus::Scheduled).await.unwrap());
        let stored = repo.find_by_id(&session.id()).await.unwrap().unwrap();
        assert_eq!(stored.status(), SessionStatus::Canceled);
    }

    #[tokio::test]
    async fn missing_session_is_not_written() {
        let repo = InMemorySessionRepository::new();
        assert!(!repo.update_if_status(&booked(), SessionStatus::Scheduled).await.unwrap());
    }
}
