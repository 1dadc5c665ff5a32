//! Shared authorization checks and guarded writes for session handlers.

use crate::domain::foundation::Actor;
use crate::domain::session::{ConsultationSession, SessionError, SessionStatus};
use crate::ports::{ResearcherRepository, SessionRepository};

/// True if `actor` is the account linked to the session's researcher.
pub(super) async fn is_assigned_researcher(
    researchers: &dyn ResearcherRepository,
    session: &ConsultationSession,
    actor: &Actor,
) -> Result<bool, SessionError> {
    let researcher = researchers.find_by_id(&session.researcher_id()).await?;
    Ok(researcher.is_some_and(|r| r.is_linked_to(&actor.user_id)))
}

/// Researcher (by linked account) or administrator.
pub(super) async fn ensure_researcher_or_admin(
    researchers: &dyn ResearcherRepository,
    session: &ConsultationSession,
    actor: &Actor,
) -> Result<(), SessionError> {
    if actor.is_admin() || is_assigned_researcher(researchers, session, actor).await? {
        Ok(())
    } else {
        Err(SessionError::forbidden())
    }
}

/// Writes a session that was `scheduled` when it was read.
///
/// If another writer moved the stored row out of `scheduled` first, nothing
/// is written and the caller gets `InvalidState`.
pub(super) async fn store_if_scheduled(
    sessions: &dyn SessionRepository,
    session: &ConsultationSession,
) -> Result<(), SessionError> {
    if sessions
        .update_if_status(session, SessionStatus::Scheduled)
        .await?
    {
        Ok(())
    } else {
        tracing::warn!(session_id = %session.id(), "Session changed concurrently; write refused");
        Err(SessionError::invalid_state(format!(
            "session {} is no longer scheduled",
            session.id()
        )))
    }
}
