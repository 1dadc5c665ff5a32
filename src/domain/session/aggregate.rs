//! Consultation session aggregate.
//!
//! A session is a booked time slot between a platform user and a
//! researcher. Authorization (who may cancel, accept, complete) depends on
//! the researcher's linked account and is checked by the handlers; the
//! aggregate owns time rules and status transitions.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    PaperId, ResearcherId, SessionId, StateMachine, Timestamp, UserId,
};

use super::{SessionError, SessionStatus};

/// Consultation session.
///
/// # Invariants
///
/// - `end_time > start_time`
/// - `start_time` was in the future when the window was last set
/// - terminal sessions are never modified
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsultationSession {
    id: SessionId,
    user_id: UserId,
    researcher_id: ResearcherId,
    paper_id: Option<PaperId>,
    start_time: Timestamp,
    end_time: Timestamp,
    status: SessionStatus,
    meeting_link: Option<String>,
    created_at: Timestamp,
    updated_at: Timestamp,
}

/// Rejects windows that end before they start or start in the past.
pub fn validate_window(
    start_time: Timestamp,
    end_time: Timestamp,
    now: Timestamp,
) -> Result<(), SessionError> {
    if !end_time.is_after(&start_time) {
        return Err(SessionError::validation(
            "end_time",
            "End time must be after start time",
        ));
    }
    if !start_time.is_after(&now) {
        return Err(SessionError::validation(
            "start_time",
            "Start time must be in the future",
        ));
    }
    Ok(())
}

impl ConsultationSession {
    /// Books a new session in `scheduled` status.
    pub fn schedule(
        user_id: UserId,
        researcher_id: ResearcherId,
        paper_id: Option<PaperId>,
        start_time: Timestamp,
        end_time: Timestamp,
    ) -> Result<Self, SessionError> {
        validate_window(start_time, end_time, Timestamp::now())?;

        let now = Timestamp::now();
        Ok(Self {
            id: SessionId::new(),
            user_id,
            researcher_id,
            paper_id,
            start_time,
            end_time,
            status: SessionStatus::Scheduled,
            meeting_link: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Reconstitute a session from persistence (no validation).
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: SessionId,
        user_id: UserId,
        researcher_id: ResearcherId,
        paper_id: Option<PaperId>,
        start_time: Timestamp,
        end_time: Timestamp,
        status: SessionStatus,
        meeting_link: Option<String>,
        created_at: Timestamp,
        updated_at: Timestamp,
    ) -> Self {
        Self {
            id,
            user_id,
            researcher_id,
            paper_id,
            start_time,
            end_time,
            status,
            meeting_link,
            created_at,
            updated_at,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn researcher_id(&self) -> ResearcherId {
        self.researcher_id
    }

    pub fn paper_id(&self) -> Option<PaperId> {
        self.paper_id
    }

    pub fn start_time(&self) -> Timestamp {
        self.start_time
    }

    pub fn end_time(&self) -> Timestamp {
        self.end_time
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn meeting_link(&self) -> Option<&str> {
        self.meeting_link.as_deref()
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    /// Length of the booked window in whole minutes.
    pub fn duration_minutes(&self) -> i64 {
        self.end_time.duration_since(&self.start_time).num_minutes()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Transitions
    // ─────────────────────────────────────────────────────────────────────────

    /// Attaches (or clears) the video meeting link.
    pub fn set_meeting_link(&mut self, link: Option<String>) {
        self.meeting_link = link;
        self.touch();
    }

    /// Cancels a scheduled session that starts at least `notice` from `now`.
    pub fn cancel(&mut self, now: Timestamp, notice: Duration) -> Result<(), SessionError> {
        self.ensure_scheduled("cancel")?;
        if self.start_time.duration_since(&now) < notice {
            return Err(SessionError::policy_violation(format!(
                "Sessions can only be canceled at least {} hours in advance",
                notice.num_hours()
            )));
        }
        self.transition(SessionStatus::Canceled)
    }

    /// Researcher acknowledgement. Leaves the session `scheduled`.
    pub fn acknowledge(&mut self) -> Result<(), SessionError> {
        self.ensure_scheduled("accept")?;
        self.touch();
        Ok(())
    }

    /// Payment confirmation. Re-asserts `scheduled`; terminal sessions are
    /// not resurrected.
    pub fn confirm_payment(&mut self) -> Result<(), SessionError> {
        self.ensure_scheduled("confirm payment for")?;
        self.touch();
        Ok(())
    }

    /// Moves the session to a new future window.
    pub fn reschedule(
        &mut self,
        start_time: Timestamp,
        end_time: Timestamp,
        now: Timestamp,
    ) -> Result<(), SessionError> {
        validate_window(start_time, end_time, now)?;
        self.ensure_scheduled("reschedule")?;
        self.start_time = start_time;
        self.end_time = end_time;
        self.touch();
        Ok(())
    }

    /// Marks a session whose window has ended as completed.
    pub fn complete(&mut self, now: Timestamp) -> Result<(), SessionError> {
        self.ensure_scheduled("complete")?;
        if self.end_time.is_after(&now) {
            return Err(SessionError::policy_violation(
                "Session cannot be completed before it ends",
            ));
        }
        self.transition(SessionStatus::Completed)
    }

    fn ensure_scheduled(&self, action: &str) -> Result<(), SessionError> {
        if self.status != SessionStatus::Scheduled {
            return Err(SessionError::invalid_state(format!(
                "cannot {} a {} session",
                action, self.status
            )));
        }
        Ok(())
    }

    fn transition(&mut self, target: SessionStatus) -> Result<(), SessionError> {
        self.status = self.status.transition_to(target)?;
        self.touch();
        Ok(())
    }

    fn touch(&mut self) {
        self.updated_at = Timestamp::now();
    }
}
