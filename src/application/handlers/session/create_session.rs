//! CreateSessionHandler - Books a consultation session.

use std::sync::Arc;

use crate::application::services::{MeetingLifecycle, Notifier, SessionNotice};
use crate::domain::foundation::{PaperId, ResearcherId, Timestamp, UserId};
use crate::domain::meeting::MeetingRequest;
use crate::domain::session::{validate_window, ConsultationSession, SessionError, SessionStatus};
use crate::ports::{PaperCatalog, ResearcherRepository, SessionRepository};

/// Command to book a session.
#[derive(Debug, Clone)]
pub struct CreateSessionCommand {
    pub user_id: UserId,
    pub researcher_id: ResearcherId,
    pub paper_id: Option<PaperId>,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
}

/// Handler for booking sessions.
///
/// The booking never fails because of the meeting provider: a session
/// without a link is still a valid session.
pub struct CreateSessionHandler {
    sessions: Arc<dyn SessionRepository>,
    researchers: Arc<dyn ResearcherRepository>,
    papers: Arc<dyn PaperCatalog>,
    meetings: Arc<MeetingLifecycle>,
    notifier: Notifier,
}

impl CreateSessionHandler {
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        researchers: Arc<dyn ResearcherRepository>,
        papers: Arc<dyn PaperCatalog>,
        meetings: Arc<MeetingLifecycle>,
        notifier: Notifier,
    ) -> Self {
        Self {
            sessions,
            researchers,
            papers,
            meetings,
            notifier,
        }
    }

    pub async fn handle(&self, cmd: CreateSessionCommand) -> Result<ConsultationSession, SessionError> {
        // 1. Validate input before touching storage
        validate_window(cmd.start_time, cmd.end_time, Timestamp::now())?;

        let researcher = self
            .researchers
            .find_by_id(&cmd.researcher_id)
            .await?
            .ok_or(SessionError::ResearcherNotFound(cmd.researcher_id))?;

        let paper_title = match cmd.paper_id {
            Some(paper_id) => Some(
                self.papers
                    .find_summary(&paper_id)
                    .await?
                    .ok_or(SessionError::PaperNotFound(paper_id))?
                    .title,
            ),
            None => None,
        };

        // 2. Persist the booking
        let mut session = ConsultationSession::schedule(
            cmd.user_id,
            cmd.researcher_id,
            cmd.paper_id,
            cmd.start_time,
            cmd.end_time,
        )?;
        self.sessions.save(&session).await?;
        tracing::info!(
            session_id = %session.id(),
            researcher_id = %session.researcher_id(),
            "Session scheduled"
        );

        // 3. Attach a meeting link if the provider gives us one
        if self.meetings.is_enabled() {
            let request = MeetingRequest {
                topic: format!("Consultation with {}", researcher.name),
                start_time: session.start_time(),
                duration_minutes: session.duration_minutes(),
                agenda: paper_title.map(|title| format!("Discussion of \"{}\"", title)),
            };
            session = self.attach_meeting(session, &request).await?;
        }

        // 4. Tell both participants
        self.notifier.session(&session, SessionNotice::Scheduled);

        Ok(session)
    }

    async fn attach_meeting(
        &self,
        session: ConsultationSession,
        request: &MeetingRequest,
    ) -> Result<ConsultationSession, SessionError> {
        let _guard = self.meetings.lock_session(session.id()).await;

        let Some(link) = self.meetings.create(request).await else {
            return Ok(session);
        };

        // A cancel may have won the lock while the provider call was out.
        let mut current = self
            .sessions
            .find_by_id(&session.id())
            .await?
            .unwrap_or(session);
        if current.status() != SessionStatus::Scheduled {
            self.meetings.delete(Some(&link)).await;
            return Ok(current);
        }

        current.set_meeting_link(Some(link.clone()));
        if !self
            .sessions
            .update_if_status(&current, SessionStatus::Scheduled)
            .await?
        {
            self.meetings.delete(Some(&link)).await;
            return self
                .sessions
                .find_by_id(&current.id())
                .await?
                .ok_or_else(|| SessionError::not_found(current.id()));
        }
        Ok(current)
    }
}
