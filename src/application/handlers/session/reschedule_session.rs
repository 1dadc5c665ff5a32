//! RescheduleSessionHandler - Moves a scheduled session to a new window.

use std::sync::Arc;

use crate::application::services::{MeetingLifecycle, Notifier, SessionNotice};
use crate::domain::foundation::{Actor, SessionId, Timestamp};
use crate::domain::meeting::MeetingUpdate;
use crate::domain::session::{ConsultationSession, SessionError};
use crate::ports::{ResearcherRepository, SessionRepository};

use super::access::{is_assigned_researcher, store_if_scheduled};

#[derive(Debug, Clone)]
pub struct RescheduleSessionCommand {
    pub session_id: SessionId,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub actor: Actor,
}

/// Handler for reschedules by either participant or an administrator.
pub struct RescheduleSessionHandler {
    sessions: Arc<dyn SessionRepository>,
    researchers: Arc<dyn ResearcherRepository>,
    meetings: Arc<MeetingLifecycle>,
    notifier: Notifier,
}

impl RescheduleSessionHandler {
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        researchers: Arc<dyn ResearcherRepository>,
        meetings: Arc<MeetingLifecycle>,
        notifier: Notifier,
    ) -> Self {
        Self {
            sessions,
            researchers,
            meetings,
            notifier,
        }
    }

    pub async fn handle(
        &self,
        cmd: RescheduleSessionCommand,
    ) -> Result<ConsultationSession, SessionError> {
        let session = self
            .sessions
            .find_by_id(&cmd.session_id)
            .await?
            .ok_or_else(|| SessionError::not_found(cmd.session_id))?;

        let allowed = cmd.actor.is_or_admin(&session.user_id())
            || is_assigned_researcher(&*self.researchers, &session, &cmd.actor).await?;
        if !allowed {
            return Err(SessionError::forbidden());
        }

        let _guard = self.meetings.lock_session(cmd.session_id).await;
        let mut session = self
            .sessions
            .find_by_id(&cmd.session_id)
            .await?
            .ok_or_else(|| SessionError::not_found(cmd.session_id))?;

        session.reschedule(cmd.start_time, cmd.end_time, Timestamp::now())?;
        store_if_scheduled(&*self.sessions, &session).await?;

        let update = MeetingUpdate {
            start_time: Some(session.start_time()),
            duration_minutes: Some(session.duration_minutes()),
            ..MeetingUpdate::default()
        };
        self.meetings.update(session.meeting_link(), &update).await;

        tracing::info!(
            session_id = %session.id(),
            start_time = %session.start_time(),
            "Session rescheduled"
        );
        self.notifier.session(&session, SessionNotice::Rescheduled);

        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MeetingCall;
    use crate::application::handlers::test_support::Harness;
    use crate::domain::foundation::UserId;
    use crate::domain::meeting::MeetingRef;
    use crate::domain::session::SessionStatus;

    #[tokio::test]
    async fn reschedule_moves_window_and_meeting() {
        let h = Harness::new();
        let session = h.booked_session(48).await;
        let start = Timestamp::now().add_hours(72);

        let moved = h
            .reschedule_session()
            .handle(RescheduleSessionCommand {
                session_id: session.id(),
                start_time: start,
                end_time: start.add_hours(2),
                actor: Actor::user(session.user_id()),
            })
            .await
            .unwrap();
        h.tasks.wait_idle().await;

        assert_eq!(moved.start_time(), start);
        assert!(h.meetings.calls().iter().any(|c| matches!(c, MeetingCall::Update(_))));
        let meeting = MeetingRef::from_join_url(moved.meeting_link().unwrap()).unwrap();
        assert_eq!(h.meetings.meeting(&meeting).unwrap().duration_minutes, Some(120));
        // Booking notices plus the reschedule notices.
        assert_eq!(h.email.sent().len(), 4);
        assert_eq!(h.meeting_lifecycle.locked_sessions(), 0);
    }

    #[tokio::test]
    async fn linked_researcher_may_reschedule() {
        let h = Harness::new();
        let session = h.booked_session(48).await;
        let account = h.link_researcher(&session).await;
        let start = Timestamp::now().add_hours(96);

        let moved = h
            .reschedule_session()
            .handle(RescheduleSessionCommand {
                session_id: session.id(),
                start_time: start,
                end_time: start.add_hours(1),
                actor: Actor::user(account),
            })
            .await
            .unwrap();

        assert_eq!(moved.start_time(), start);
    }

    #[tokio::test]
    async fn stranger_is_forbidden() {
        let h = Harness::new();
        let session = h.booked_session(48).await;
        let start = Timestamp::now().add_hours(72);

        let err = h
            .reschedule_session()
            .handle(RescheduleSessionCommand {
                session_id: session.id(),
                start_time: start,
                end_time: start.add_hours(1),
                actor: Actor::user(UserId::new()),
            })
            .await
            .unwrap_err();

        assert_eq!(err, SessionError::Forbidden);
    }

    #[tokio::test]
    async fn past_window_is_rejected() {
        let h = Harness::new();
        let session = h.booked_session(48).await;

        let err = h
            .reschedule_session()
            .handle(RescheduleSessionCommand {
                session_id: session.id(),
                start_time: Timestamp::now().add_hours(-3),
                end_time: Timestamp::now().add_hours(-2),
                actor: Actor::user(session.user_id()),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, SessionError::ValidationFailed { .. }));
    }

    #[tokio::test]
    async fn canceled_session_cannot_be_rescheduled() {
        let h = Harness::new();
        let mut session = h.booked_session(48).await;
        session
            .cancel(Timestamp::now(), chrono::Duration::hours(24))
            .unwrap();
        h.sessions
            .update_if_status(&session, SessionStatus::Scheduled)
            .await
            .unwrap();
        let start = Timestamp::now().add_hours(72);

        let err = h
            .reschedule_session()
            .handle(RescheduleSessionCommand {
                session_id: session.id(),
                start_time: start,
                end_time: start.add_hours(1),
                actor: Actor::user(session.user_id()),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, SessionError::InvalidState(_)));
    }

    #[tokio::test]
    async fn bad_window_on_canceled_session_is_a_validation_error() {
        let h = Harness::new();
        let mut session = h.booked_session(48).await;
        session
            .cancel(Timestamp::now(), chrono::Duration::hours(24))
            .unwrap();
        h.sessions
            .update_if_status(&session, SessionStatus::Scheduled)
            .await
            .unwrap();
        let start = Timestamp::now().add_hours(72);

        let err = h
            .reschedule_session()
            .handle(RescheduleSessionCommand {
                session_id: session.id(),
                start_time: start,
                end_time: start,
                actor: Actor::user(session.user_id()),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, SessionError::ValidationFailed { .. }));
    }
}
