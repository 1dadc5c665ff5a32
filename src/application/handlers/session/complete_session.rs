//! CompleteSessionHandler - Marks a finished session as completed.

use std::sync::Arc;

use crate::application::services::{MeetingLifecycle, Notifier, SessionNotice};
use crate::domain::foundation::{Actor, SessionId, Timestamp};
use crate::domain::session::{ConsultationSession, SessionError};
use crate::ports::{ResearcherRepository, SessionRepository};

use super::access::{ensure_researcher_or_admin, store_if_scheduled};

#[derive(Debug, Clone)]
pub struct CompleteSessionCommand {
    pub session_id: SessionId,
    pub actor: Actor,
}

pub struct CompleteSessionHandler {
    sessions: Arc<dyn SessionRepository>,
    researchers: Arc<dyn ResearcherRepository>,
    meetings: Arc<MeetingLifecycle>,
    notifier: Notifier,
}

impl CompleteSessionHandler {
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
        cmd: CompleteSessionCommand,
    ) -> Result<ConsultationSession, SessionError> {
        let guard = self.meetings.lock_session(cmd.session_id).await;
        let mut session = self
            .sessions
            .find_by_id(&cmd.session_id)
            .await?
            .ok_or_else(|| SessionError::not_found(cmd.session_id))?;

        ensure_researcher_or_admin(&*self.researchers, &session, &cmd.actor).await?;

        session.complete(Timestamp::now())?;
        store_if_scheduled(&*self.sessions, &session).await?;
        drop(guard);
        tracing::info!(session_id = %session.id(), "Session completed");

        self.notifier.session(&session, SessionNotice::Completed);
        Ok(session)
    }
}
