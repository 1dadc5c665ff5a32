//! CancelSessionHandler - Cancels a scheduled session.

use std::sync::Arc;

use chrono::Duration;

use crate::application::services::{MeetingLifecycle, Notifier, SessionNotice};
use crate::domain::foundation::{Actor, SessionId, Timestamp};
use crate::domain::session::{ConsultationSession, SessionError};
use crate::ports::SessionRepository;

use super::access::store_if_scheduled;

/// Minimum notice for a cancellation.
pub const DEFAULT_CANCELLATION_NOTICE_HOURS: i64 = 24;

#[derive(Debug, Clone)]
pub struct CancelSessionCommand {
    pub session_id: SessionId,
    pub actor: Actor,
}

/// Handler for cancellations by the booking user or an administrator.
///
/// The meeting is deleted best-effort; the stored link is kept so the
/// canceled session still shows what was booked.
pub struct CancelSessionHandler {
    sessions: Arc<dyn SessionRepository>,
    meetings: Arc<MeetingLifecycle>,
    notifier: Notifier,
    notice: Duration,
}

impl CancelSessionHandler {
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        meetings: Arc<MeetingLifecycle>,
        notifier: Notifier,
        notice: Duration,
    ) -> Self {
        Self {
            sessions,
            meetings,
            notifier,
            notice,
        }
    }

    pub async fn handle(&self, cmd: CancelSessionCommand) -> Result<ConsultationSession, SessionError> {
        let session = self
            .sessions
            .find_by_id(&cmd.session_id)
            .await?
            .ok_or_else(|| SessionError::not_found(cmd.session_id))?;

        if !cmd.actor.is_or_admin(&session.user_id()) {
            return Err(SessionError::forbidden());
        }

        let session = {
            let _guard = self.meetings.lock_session(cmd.session_id).await;

            // Re-read under the lock: a booking may have attached a link meanwhile.
            let mut session = self
                .sessions
                .find_by_id(&cmd.session_id)
                .await?
                .ok_or_else(|| SessionError::not_found(cmd.session_id))?;
            session.cancel(Timestamp::now(), self.notice)?;
            store_if_scheduled(&*self.sessions, &session).await?;

            self.meetings.delete(session.meeting_link()).await;
            session
        };

        tracing::info!(session_id = %session.id(), actor = %cmd.actor.user_id, "Session canceled");
        self.notifier.session(&session, SessionNotice::Canceled);

        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MeetingCall;
    use crate::application::handlers::test_support::Harness;
    use crate::domain::foundation::UserId;
    use crate::domain::session::SessionStatus;

    #[tokio::test]
    async fn owner_cancels_and_meeting_is_deleted() {
        let h = Harness::new();
        let session = h.booked_session(48).await;

        let canceled = h
            .cancel_session()
            .handle(CancelSessionCommand {
                session_id: session.id(),
                actor: Actor::user(session.user_id()),
            })
            .await
            .unwrap();
        h.tasks.wait_idle().await;

        assert_eq!(canceled.status(), SessionStatus::Canceled);
        assert!(h.meetings.calls().iter().any(|c| matches!(c, MeetingCall::Delete(_))));
        assert_eq!(h.meetings.meeting_count(), 0);
        assert_eq!(h.meeting_lifecycle.locked_sessions(), 0);
    }

    #[tokio::test]
    async fn admin_may_cancel_any_session() {
        let h = Harness::new();
        let session = h.booked_session(48).await;

        let canceled = h
            .cancel_session()
            .handle(CancelSessionCommand {
                session_id: session.id(),
                actor: Actor::admin(UserId::new()),
            })
            .await
            .unwrap();

        assert_eq!(canceled.status(), SessionStatus::Canceled);
    }

    #[tokio::test]
    async fn stranger_is_forbidden() {
        let h = Harness::new();
        let session = h.booked_session(48).await;

        let err = h
            .cancel_session()
            .handle(CancelSessionCommand {
                session_id: session.id(),
                actor: Actor::user(UserId::new()),
            })
            .await
            .unwrap_err();

        assert_eq!(err, SessionError::Forbidden);
    }

    #[tokio::test]
    async fn short_notice_is_policy_violation() {
        let h = Harness::new();
        let session = h.booked_session(23).await;

        let err = h
            .cancel_session()
            .handle(CancelSessionCommand {
                session_id: session.id(),
                actor: Actor::user(session.user_id()),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, SessionError::PolicyViolation(_)));
        let stored = h.sessions.find_by_id(&session.id()).await.unwrap().unwrap();
        assert_eq!(stored.status(), SessionStatus::Scheduled);
    }

    #[tokio::test]
    async fn second_cancel_is_invalid_state() {
        let h = Harness::new();
        let session = h.booked_session(48).await;
        let cmd = CancelSessionCommand {
            session_id: session.id(),
            actor: Actor::user(session.user_id()),
        };

        h.cancel_session().handle(cmd.clone()).await.unwrap();
        let err = h.cancel_session().handle(cmd).await.unwrap_err();

        assert!(matches!(err, SessionError::InvalidState(_)));
    }

    #[tokio::test]
    async fn cancel_without_link_skips_provider() {
        let h = Harness::without_meetings();
        let session = h.booked_session(48).await;

        h.cancel_session()
            .handle(CancelSessionCommand {
                session_id: session.id(),
                actor: Actor::user(session.user_id()),
            })
            .await
            .unwrap();

        assert!(h.meetings.calls().is_empty());
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let h = Harness::new();
        let id = SessionId::new();
        let err = h
            .cancel_session()
            .handle(CancelSessionCommand {
                session_id: id,
                actor: Actor::admin(UserId::new()),
            })
            .await
            .unwrap_err();
        assert_eq!(err, SessionError::NotFound(id));
    }
}
