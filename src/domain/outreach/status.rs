//! Outreach request status state machine.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::StateMachine;

/// Where an outreach invitation stands.
///
/// ```text
/// created ──► email_sent ──► pending ──► accepted
///    │            ▲  │          │
///    ▼            │  │          └──────► declined
/// email_failed ───┘  └──► accepted | declined
/// ```
///
/// `created` and `email_failed` may also move straight to `accepted` when
/// the researcher registers with a verified token; link answers still
/// require [`awaits_response`](Self::awaits_response).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutreachStatus {
    /// Persisted, invitation not yet delivered.
    Created,
    /// Invitation handed to the email provider.
    EmailSent,
    /// Delivery failed; may be retried.
    EmailFailed,
    /// Awaiting the researcher's answer.
    Pending,
    Accepted,
    Declined,
}

impl OutreachStatus {
    /// Wire/database representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            OutreachStatus::Created => "created",
            OutreachStatus::EmailSent => "email_sent",
            OutreachStatus::EmailFailed => "email_failed",
            OutreachStatus::Pending => "pending",
            OutreachStatus::Accepted => "accepted",
            OutreachStatus::Declined => "declined",
        }
    }

    /// Parses the database representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "created" => Some(OutreachStatus::Created),
            "email_sent" => Some(OutreachStatus::EmailSent),
            "email_failed" => Some(OutreachStatus::EmailFailed),
            "pending" => Some(OutreachStatus::Pending),
            "accepted" => Some(OutreachStatus::Accepted),
            "declined" => Some(OutreachStatus::Declined),
            _ => None,
        }
    }

    /// True while the researcher can still answer.
    pub fn awaits_response(&self) -> bool {
        matches!(self, OutreachStatus::EmailSent | OutreachStatus::Pending)
    }

    /// True if an invitation may be (re)dispatched from this state.
    pub fn can_dispatch(&self) -> bool {
        matches!(self, OutreachStatus::Created | OutreachStatus::EmailFailed)
    }
}

impl std::fmt::Display for OutreachStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl StateMachine for OutreachStatus {
    fn valid_transitions(&self) -> Vec<Self> {
        use OutreachStatus::*;
        match self {
            Created => vec![EmailSent, EmailFailed, Accepted],
            EmailFailed => vec![EmailSent, EmailFailed, Accepted],
            EmailSent => vec![Pending, Accepted, Declined],
            Pending => vec![Accepted, Declined],
            Accepted => vec![],
            Declined => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use OutreachStatus::*;

    #[test]
    fn happy_path_is_legal() {
        assert!(Created.can_transition_to(&EmailSent));
        assert!(EmailSent.can_transition_to(&Pending));
        assert!(Pending.can_transition_to(&Accepted));
    }

    #[test]
    fn failed_delivery_can_be_retried() {
        assert!(Created.can_transition_to(&EmailFailed));
        assert!(EmailFailed.can_transition_to(&EmailSent));
    }

    #[test]
    fn undelivered_states_can_be_accepted_but_not_declined() {
        assert!(Created.can_transition_to(&Accepted));
        assert!(EmailFailed.can_transition_to(&Accepted));
        assert!(Created.transition_to(Declined).is_err());
        assert!(EmailFailed.transition_to(Declined).is_err());
    }

    #[test]
    fn declined_cannot_be_accepted() {
        assert!(Declined.transition_to(Accepted).is_err());
    }

    #[test]
    fn answered_states_are_terminal() {
        assert!(Accepted.is_terminal());
        assert!(Declined.is_terminal());
        assert!(!EmailFailed.is_terminal());
    }

    #[test]
    fn parse_inverts_as_str() {
        for s in [Created, EmailSent, EmailFailed, Pending, Accepted, Declined] {
            assert_eq!(OutreachStatus::parse(s.as_str()), Some(s));
        }
        assert_eq!(OutreachStatus::parse("archived"), None);
    }

    #[test]
    fn serializes_snake_case() {
        assert_eq!(serde_json::to_string(&EmailSent).unwrap(), "\"email_sent\"");
    }
}
