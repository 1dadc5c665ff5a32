//! Outreach request aggregate.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    DomainError, ErrorCode, OutreachRequestId, PaperId, StateMachine, Timestamp, UserId,
    ValidationError,
};
use crate::domain::researcher::normalize_email;

use super::OutreachStatus;

/// Researcher's answer to an invitation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutreachResponse {
    Accept,
    Decline,
}

impl OutreachResponse {
    /// Parses `"accept"` or `"decline"` (case-insensitive).
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "accept" => Some(OutreachResponse::Accept),
            "decline" => Some(OutreachResponse::Decline),
            _ => None,
        }
    }
}

/// An invitation sent to a researcher on behalf of a platform user.
///
/// # Invariants
///
/// - `researcher_email` is non-empty and normalized (trimmed, lowercase)
/// - `status` only changes through [`OutreachStatus`] transitions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutreachRequest {
    id: OutreachRequestId,
    user_id: UserId,
    researcher_email: String,
    paper_id: Option<PaperId>,
    status: OutreachStatus,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl OutreachRequest {
    /// Creates a request in `created` status.
    pub fn new(
        user_id: UserId,
        researcher_email: &str,
        paper_id: Option<PaperId>,
    ) -> Result<Self, ValidationError> {
        let email = normalize_email(researcher_email);
        if email.is_empty() {
            return Err(ValidationError::empty_field("researcher_email"));
        }
        if !email.contains('@') {
            return Err(ValidationError::invalid_format(
                "researcher_email",
                "missing @ symbol",
            ));
        }

        let now = Timestamp::now();
        Ok(Self {
            id: OutreachRequestId::new(),
            user_id,
            researcher_email: email,
            paper_id,
            status: OutreachStatus::Created,
            created_at: now,
            updated_at: now,
        })
    }

    /// Reconstitute from persistence (no validation).
    pub fn reconstitute(
        id: OutreachRequestId,
        user_id: UserId,
        researcher_email: String,
        paper_id: Option<PaperId>,
        status: OutreachStatus,
        created_at: Timestamp,
        updated_at: Timestamp,
    ) -> Self {
        Self {
            id,
            user_id,
            researcher_email,
            paper_id,
            status,
            created_at,
            updated_at,
        }
    }

    pub fn id(&self) -> OutreachRequestId {
        self.id
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn researcher_email(&self) -> &str {
        &self.researcher_email
    }

    pub fn paper_id(&self) -> Option<PaperId> {
        self.paper_id
    }

    pub fn status(&self) -> OutreachStatus {
        self.status
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Transitions
    // ─────────────────────────────────────────────────────────────────────────

    /// Records a delivered invitation: `email_sent` then `pending`.
    pub fn mark_invitation_delivered(&mut self) -> Result<(), DomainError> {
        self.transition(OutreachStatus::EmailSent)?;
        self.transition(OutreachStatus::Pending)
    }

    /// Records a failed delivery attempt.
    pub fn mark_invitation_failed(&mut self) -> Result<(), DomainError> {
        self.transition(OutreachStatus::EmailFailed)
    }

    /// Applies the researcher's answer from the invitation link.
    ///
    /// Returns `false` when accepting an already accepted request, so the
    /// caller can skip the notification.
    pub fn respond(&mut self, response: OutreachResponse) -> Result<bool, DomainError> {
        let target = match response {
            OutreachResponse::Accept => OutreachStatus::Accepted,
            OutreachResponse::Decline => OutreachStatus::Declined,
        };
        if target == OutreachStatus::Accepted && self.status == OutreachStatus::Accepted {
            return Ok(false);
        }
        if !self.status.awaits_response() {
            return Err(DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!("Outreach request in {:?} is not awaiting an answer", self.status),
            )
            .with_detail("from", format!("{:?}", self.status))
            .with_detail("to", format!("{:?}", target)));
        }
        self.transition(target).map(|_| true)
    }

    /// Accepts on behalf of a researcher who registered with a verified token.
    ///
    /// The token already proves the address, so this also works while the
    /// invitation is `created` or `email_failed`. Returns `false` when the
    /// request was already accepted.
    pub fn accept_by_registration(&mut self) -> Result<bool, DomainError> {
        if self.status == OutreachStatus::Accepted {
            return Ok(false);
        }
        self.transition(OutreachStatus::Accepted).map(|_| true)
    }

    fn transition(&mut self, target: OutreachStatus) -> Result<(), DomainError> {
        self.status = self.status.transition_to(target)?;
        self.updated_at = Timestamp::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> OutreachRequest {
        OutreachRequest::new(UserId::new(), " R@Example.com ", Some(PaperId::new())).unwrap()
    }

    #[test]
    fn new_request_is_created_with_normalized_email() {
        let r = request();
        assert_eq!(r.status(), OutreachStatus::Created);
        assert_eq!(r.researcher_email(), "r@example.com");
    }

    #[test]
    fn empty_email_is_rejected() {
        let err = OutreachRequest::new(UserId::new(), "  ", None).unwrap_err();
        assert_eq!(err, ValidationError::empty_field("researcher_email"));
    }

    #[test]
    fn delivery_moves_to_pending() {
        let mut r = request();
        r.mark_invitation_delivered().unwrap();
        assert_eq!(r.status(), OutreachStatus::Pending);
    }

    #[test]
    fn failed_delivery_can_be_redelivered() {
        let mut r = request();
        r.mark_invitation_failed().unwrap();
        assert_eq!(r.status(), OutreachStatus::EmailFailed);
        r.mark_invitation_delivered().unwrap();
        assert_eq!(r.status(), OutreachStatus::Pending);
    }

    #[test]
    fn accept_from_pending_reports_change() {
        let mut r = request();
        r.mark_invitation_delivered().unwrap();
        assert!(r.respond(OutreachResponse::Accept).unwrap());
        assert_eq!(r.status(), OutreachStatus::Accepted);
    }

    #[test]
    fn second_accept_is_a_quiet_no_op() {
        let mut r = request();
        r.mark_invitation_delivered().unwrap();
        r.respond(OutreachResponse::Accept).unwrap();
        assert!(!r.respond(OutreachResponse::Accept).unwrap());
    }

    #[test]
    fn decline_after_accept_fails() {
        let mut r = request();
        r.mark_invitation_delivered().unwrap();
        r.respond(OutreachResponse::Accept).unwrap();
        assert!(r.respond(OutreachResponse::Decline).is_err());
    }

    #[test]
    fn respond_before_delivery_fails() {
        let mut r = request();
        assert!(r.respond(OutreachResponse::Decline).is_err());
        assert_eq!(r.status(), OutreachStatus::Created);
    }

    #[test]
    fn registration_accepts_before_delivery() {
        let mut r = request();
        assert!(r.accept_by_registration().unwrap());
        assert_eq!(r.status(), OutreachStatus::Accepted);
        assert!(!r.accept_by_registration().unwrap());
    }

    #[test]
    fn registration_accepts_after_failed_delivery() {
        let mut r = request();
        r.mark_invitation_failed().unwrap();
        assert!(r.accept_by_registration().unwrap());
        assert_eq!(r.status(), OutreachStatus::Accepted);
    }

    #[test]
    fn registration_cannot_accept_a_declined_request() {
        let mut r = request();
        r.mark_invitation_delivered().unwrap();
        r.respond(OutreachResponse::Decline).unwrap();
        let err = r.accept_by_registration().unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidStateTransition);
        assert_eq!(r.status(), OutreachStatus::Declined);
    }

    #[test]
    fn link_accept_before_delivery_fails() {
        let mut r = request();
        let err = r.respond(OutreachResponse::Accept).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidStateTransition);
        assert_eq!(r.status(), OutreachStatus::Created);
    }

    #[test]
    fn response_parsing_is_case_insensitive() {
        assert_eq!(OutreachResponse::parse("Accept"), Some(OutreachResponse::Accept));
        assert_eq!(OutreachResponse::parse(" decline "), Some(OutreachResponse::Decline));
        assert_eq!(OutreachResponse::parse("maybe"), None);
    }
}
