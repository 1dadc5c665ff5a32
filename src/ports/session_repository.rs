//! Consultation session repository port.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ResearcherId, SessionId, UserId};
use crate::domain::session::{ConsultationSession, SessionStatus};

/// Repository port for consultation sessions.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Save a new session.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on persistence failure
    async fn save(&self, session: &ConsultationSession) -> Result<(), DomainError>;

    /// Writes `session` only if the stored status is still `expected`.
    ///
    /// Returns false when the row is gone or another writer moved its
    /// status on; nothing is written in that case.
    async fn update_if_status(
        &self,
        session: &ConsultationSession,
        expected: SessionStatus,
    ) -> Result<bool, DomainError>;

    /// Find a session by its ID.
    async fn find_by_id(&self, id: &SessionId)
        -> Result<Option<ConsultationSession>, DomainError>;

    /// Sessions booked by a user, ordered by start time ascending.
    async fn find_by_user_id(&self, user_id: &UserId)
        -> Result<Vec<ConsultationSession>, DomainError>;

    /// Sessions assigned to a researcher, ordered by start time ascending.
    async fn find_by_researcher_id(
        &self,
        researcher_id: &ResearcherId,
    ) -> Result<Vec<ConsultationSession>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn SessionRepository) {}
    }
}
