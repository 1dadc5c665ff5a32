//! AcceptSessionHandler - Researcher acknowledgement of a booking.

use std::sync::Arc;

use crate::application::services::MeetingLifecycle;
use crate::domain::foundation::{Actor, SessionId};
use crate::domain::session::{ConsultationSession, SessionError};
use crate::ports::{ResearcherRepository, SessionRepository};

use super::access::{ensure_researcher_or_admin, store_if_scheduled};

#[derive(Debug, Clone)]
pub struct AcceptSessionCommand {
    pub session_id: SessionId,
    pub actor: Actor,
}

/// Acknowledges a scheduled session. The status stays `scheduled`.
pub struct AcceptSessionHandler {
    sessions: Arc<dyn SessionRepository>,
    researchers: Arc<dyn ResearcherRepository>,
    meetings: Arc<MeetingLifecycle>,
}

impl AcceptSessionHandler {
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        researchers: Arc<dyn ResearcherRepository>,
        meetings: Arc<MeetingLifecycle>,
    ) -> Self {
        Self {
            sessions,
            researchers,
            meetings,
        }
    }

    pub async fn handle(&self, cmd: AcceptSessionCommand) -> Result<ConsultationSession, SessionError> {
        let _guard = self.meetings.lock_session(cmd.session_id).await;
        let mut session = self
            .sessions
            .find_by_id(&cmd.session_id)
            .await?
            .ok_or_else(|| SessionError::not_found(cmd.session_id))?;

        ensure_researcher_or_admin(&*self.researchers, &session, &cmd.actor).await?;

        session.acknowledge()?;
        store_if_scheduled(&*self.sessions, &session).await?;
        tracing::info!(session_id = %session.id(), "Session accepted");

        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::test_support::Harness;
    use crate::domain::foundation::UserId;
    use crate::domain::session::SessionStatus;

    #[tokio::test]
    async fn linked_researcher_accepts() {
        let h = Harness::new();
        let session = h.booked_session(48).await;
        let account = h.link_researcher(&session).await;

        let accepted = h
            .accept_session()
            .handle(AcceptSessionCommand {
                session_id: session.id(),
                actor: Actor::user(account),
            })
            .await
            .unwrap();

        assert_eq!(accepted.status(), SessionStatus::Scheduled);
    }

    #[tokio::test]
    async fn accept_is_repeatable() {
        let h = Harness::new();
        let session = h.booked_session(48).await;
        let cmd = AcceptSessionCommand {
            session_id: session.id(),
            actor: Actor::admin(UserId::new()),
        };

        h.accept_session().handle(cmd.clone()).await.unwrap();
        let again = h.accept_session().handle(cmd).await.unwrap();

        assert_eq!(again.status(), SessionStatus::Scheduled);
    }

    #[tokio::test]
    async fn booking_user_cannot_accept() {
        let h = Harness::new();
        let session = h.booked_session(48).await;

        let err = h
            .accept_session()
            .handle(AcceptSessionCommand {
                session_id: session.id(),
                actor: Actor::user(session.user_id()),
            })
            .await
            .unwrap_err();

        assert_eq!(err, SessionError::Forbidden);
    }

    #[tokio::test]
    async fn canceled_session_cannot_be_accepted() {
        let h = Harness::new();
        let mut session = h.booked_session(48).await;
        session
            .cancel(crate::domain::foundation::Timestamp::now(), chrono::Duration::hours(24))
            .unwrap();
        h.sessions
            .update_if_status(&session, SessionStatus::Scheduled)
            .await
            .unwrap();

        let err = h
            .accept_session()
            .handle(AcceptSessionCommand {
                session_id: session.id(),
                actor: Actor::admin(UserId::new()),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, SessionError::InvalidState(_)));
    }
}
