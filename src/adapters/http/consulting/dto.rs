//! HTTP DTOs for consulting endpoints.
//!
//! Response types flatten the aggregates into plain JSON; timestamps are
//! RFC 3339 strings.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::application::handlers::{RegisterResearcherResult, SubscriptionAccess};
use crate::domain::foundation::{PaperId, ResearcherId, Timestamp};
use crate::domain::outreach::{OutreachRequest, OutreachStatus};
use crate::domain::researcher::Researcher;
use crate::domain::session::{ConsultationSession, SessionStatus};
use crate::domain::subscription::{Subscription, SubscriptionStatus};

// ════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Request to invite a researcher.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateOutreachRequest {
    pub researcher_email: String,
    #[serde(default)]
    pub paper_id: Option<PaperId>,
}

/// Researcher's answer to an invitation.
#[derive(Debug, Clone, Deserialize)]
pub struct OutreachAnswerRequest {
    pub response: String,
}

/// Query string of the registration link.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterQuery {
    pub token: String,
}

/// Request to book a session.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSessionRequest {
    pub researcher_id: ResearcherId,
    #[serde(default)]
    pub paper_id: Option<PaperId>,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
}

/// Request to move a session.
#[derive(Debug, Clone, Deserialize)]
pub struct RescheduleSessionRequest {
    pub start_time: Timestamp,
    pub end_time: Timestamp,
}

/// Query parameters for listing sessions.
///
/// Defaults to the caller's own bookings. Ids stay raw strings so a bad id
/// is reported as a 400 with the offending value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListSessionsParams {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub researcher_id: Option<String>,
}

/// Query parameters for the subscription check.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubscriptionParams {
    #[serde(default)]
    pub user_id: Option<String>,
}

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize)]
pub struct OutreachRequestResponse {
    pub id: String,
    pub user_id: String,
    pub researcher_email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paper_id: Option<String>,
    pub status: OutreachStatus,
    pub created_at: String,
    pub updated_at: String,
}

impl From<OutreachRequest> for OutreachRequestResponse {
    fn from(request: OutreachRequest) -> Self {
        Self {
            id: request.id().to_string(),
            user_id: request.user_id().to_string(),
            researcher_email: request.researcher_email().to_string(),
            paper_id: request.paper_id().map(|id| id.to_string()),
            status: request.status(),
            created_at: rfc3339(request.created_at()),
            updated_at: rfc3339(request.updated_at()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ResearcherResponse {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affiliation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hourly_rate_cents: Option<i64>,
    pub availability: BTreeMap<String, Vec<String>>,
    pub has_account: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Researcher> for ResearcherResponse {
    fn from(researcher: Researcher) -> Self {
        Self {
            id: researcher.id.to_string(),
            email: researcher.email,
            name: researcher.name,
            affiliation: researcher.affiliation,
            bio: researcher.bio,
            hourly_rate_cents: researcher.hourly_rate_cents,
            availability: researcher.availability,
            has_account: researcher.user_id.is_some(),
            created_at: rfc3339(researcher.created_at),
            updated_at: rfc3339(researcher.updated_at),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RegistrationResponse {
    pub researcher: ResearcherResponse,
    pub outreach_request: OutreachRequestResponse,
}

impl From<RegisterResearcherResult> for RegistrationResponse {
    fn from(result: RegisterResearcherResult) -> Self {
        Self {
            researcher: result.researcher.into(),
            outreach_request: result.outreach_request.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionResponse {
    pub id: String,
    pub user_id: String,
    pub researcher_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paper_id: Option<String>,
    pub start_time: String,
    pub end_time: String,
    pub duration_minutes: i64,
    pub status: SessionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meeting_link: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<ConsultationSession> for SessionResponse {
    fn from(session: ConsultationSession) -> Self {
        Self {
            id: session.id().to_string(),
            user_id: session.user_id().to_string(),
            researcher_id: session.researcher_id().to_string(),
            paper_id: session.paper_id().map(|id| id.to_string()),
            start_time: rfc3339(session.start_time()),
            end_time: rfc3339(session.end_time()),
            duration_minutes: session.duration_minutes(),
            status: session.status(),
            meeting_link: session.meeting_link().map(str::to_string),
            created_at: rfc3339(session.created_at()),
            updated_at: rfc3339(session.updated_at()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionListResponse {
    pub items: Vec<SessionResponse>,
    pub total: usize,
}

impl From<Vec<ConsultationSession>> for SessionListResponse {
    fn from(sessions: Vec<ConsultationSession>) -> Self {
        let items: Vec<SessionResponse> = sessions.into_iter().map(Into::into).collect();
        Self {
            total: items.len(),
            items,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionResponse {
    pub id: String,
    pub status: SubscriptionStatus,
    pub start_date: String,
    pub end_date: String,
    pub price_cents: i64,
}

impl From<Subscription> for SubscriptionResponse {
    fn from(subscription: Subscription) -> Self {
        Self {
            id: subscription.id.to_string(),
            status: subscription.status,
            start_date: rfc3339(subscription.start_date),
            end_date: rfc3339(subscription.end_date),
            price_cents: subscription.price_cents,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionAccessResponse {
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription: Option<SubscriptionResponse>,
}

impl From<SubscriptionAccess> for SubscriptionAccessResponse {
    fn from(access: SubscriptionAccess) -> Self {
        Self {
            active: access.active,
            subscription: access.subscription.map(Into::into),
        }
    }
}

fn rfc3339(ts: Timestamp) -> String {
    ts.as_datetime().to_rfc3339()
}
