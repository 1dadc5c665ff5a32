//! ConfirmSessionPaymentHandler - Applies a successful payment to its session.
//!
//! Only the payment reconciler calls this, from a background task.

use std::sync::Arc;

use crate::application::services::MeetingLifecycle;
use crate::domain::foundation::SessionId;
use crate::domain::session::{ConsultationSession, SessionError};
use crate::ports::{SessionRepository, TaskError};

use super::access::store_if_scheduled;

#[derive(Debug, Clone, Copy)]
pub struct ConfirmSessionPaymentCommand {
    pub session_id: SessionId,
}

pub struct ConfirmSessionPaymentHandler {
    sessions: Arc<dyn SessionRepository>,
    meetings: Arc<MeetingLifecycle>,
}

impl ConfirmSessionPaymentHandler {
    pub fn new(sessions: Arc<dyn SessionRepository>, meetings: Arc<MeetingLifecycle>) -> Self {
        Self { sessions, meetings }
    }

    /// Re-asserts `scheduled`. A canceled or completed session is left
    /// alone and reported as `InvalidState`.
    pub async fn handle(
        &self,
        cmd: ConfirmSessionPaymentCommand,
    ) -> Result<ConsultationSession, SessionError> {
        let _guard = self.meetings.lock_session(cmd.session_id).await;
        let mut session = self
            .sessions
            .find_by_id(&cmd.session_id)
            .await?
            .ok_or_else(|| SessionError::not_found(cmd.session_id))?;

        session.confirm_payment()?;
        store_if_scheduled(&*self.sessions, &session).await?;
        tracing::info!(session_id = %session.id(), "Session payment confirmed");

        Ok(session)
    }

    /// Same as `handle`, with errors classified for the task runner.
    pub async fn run_task(&self, cmd: ConfirmSessionPaymentCommand) -> Result<(), TaskError> {
        match self.handle(cmd).await {
            Ok(_) => Ok(()),
            Err(SessionError::Infrastructure(msg)) => Err(TaskError::retryable(msg)),
            Err(e) => Err(TaskError::permanent(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::adapters::memory::InMemorySessionRepository;
    use crate::application::handlers::session::{CancelSessionCommand, CancelSessionHandler};
    use crate::application::handlers::test_support::Harness;
    use crate::domain::foundation::{Actor, DomainError, ResearcherId, Timestamp, UserId};
    use crate::domain::session::SessionStatus;

    /// Stalls every write that leaves a session `scheduled`.
    struct SlowScheduledWrites {
        inner: Arc<InMemorySessionRepository>,
    }

    #[async_trait]
    impl SessionRepository for SlowScheduledWrites {
        async fn save(&self, session: &ConsultationSession) -> Result<(), DomainError> {
            self.inner.save(session).await
        }

        async fn update_if_status(
            &self,
            session: &ConsultationSession,
            expected: SessionStatus,
        ) -> Result<bool, DomainError> {
            if session.status() == SessionStatus::Scheduled {
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
            self.inner.update_if_status(session, expected).await
        }

        async fn find_by_id(
            &self,
            id: &SessionId,
        ) -> Result<Option<ConsultationSession>, DomainError> {
            self.inner.find_by_id(id).await
        }

        async fn find_by_user_id(
            &self,
            user_id: &UserId,
        ) -> Result<Vec<ConsultationSession>, DomainError> {
            self.inner.find_by_user_id(user_id).await
        }

        async fn find_by_researcher_id(
            &self,
            researcher_id: &ResearcherId,
        ) -> Result<Vec<ConsultationSession>, DomainError> {
            self.inner.find_by_researcher_id(researcher_id).await
        }
    }

    #[tokio::test]
    async fn scheduled_session_stays_scheduled() {
        let h = Harness::new();
        let session = h.booked_session(48).await;

        let confirmed = h
            .confirm_session_payment()
            .handle(ConfirmSessionPaymentCommand {
                session_id: session.id(),
            })
            .await
            .unwrap();

        assert_eq!(confirmed.status(), SessionStatus::Scheduled);
    }

    #[tokio::test]
    async fn canceled_session_is_not_resurrected() {
        let h = Harness::new();
        let mut session = h.booked_session(48).await;
        session.cancel(Timestamp::now(), chrono::Duration::hours(24)).unwrap();
        h.sessions
            .update_if_status(&session, SessionStatus::Scheduled)
            .await
            .unwrap();

        let err = h
            .confirm_session_payment()
            .run_task(ConfirmSessionPaymentCommand {
                session_id: session.id(),
            })
            .await
            .unwrap_err();

        assert!(!err.retryable);
        let stored = h.sessions.find_by_id(&session.id()).await.unwrap().unwrap();
        assert_eq!(stored.status(), SessionStatus::Canceled);
    }

    #[tokio::test]
    async fn missing_session_is_permanent_task_failure() {
        let h = Harness::new();
        let err = h
            .confirm_session_payment()
            .run_task(ConfirmSessionPaymentCommand {
                session_id: SessionId::new(),
            })
            .await
            .unwrap_err();
        assert!(!err.retryable);
    }

    #[tokio::test]
    async fn confirmation_racing_a_cancel_leaves_it_canceled() {
        let h = Harness::new();
        let session = h.booked_session(48).await;
        let slow: Arc<dyn SessionRepository> = Arc::new(SlowScheduledWrites {
            inner: h.sessions.clone(),
        });
        let confirm = ConfirmSessionPaymentHandler::new(slow.clone(), h.meeting_lifecycle.clone());
        let cancel = CancelSessionHandler::new(
            slow,
            h.meeting_lifecycle.clone(),
            h.notifier.clone(),
            chrono::Duration::hours(24),
        );

        let session_id = session.id();
        let confirming = tokio::spawn(async move {
            confirm
                .handle(ConfirmSessionPaymentCommand { session_id })
                .await
        });
        tokio::time::sleep(Duration::from_millis(10)).await;
        let canceled = cancel
            .handle(CancelSessionCommand {
                session_id,
                actor: Actor::user(session.user_id()),
            })
            .await
            .unwrap();

        assert_eq!(canceled.status(), SessionStatus::Canceled);
        assert!(confirming.await.unwrap().is_ok());
        let stored = h.sessions.find_by_id(&session_id).await.unwrap().unwrap();
        assert_eq!(stored.status(), SessionStatus::Canceled);
    }
}
