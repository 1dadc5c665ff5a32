//! HTTP handlers for consulting endpoints.
//!
//! Thin layer: parse ids, build the command from the actor headers, delegate
//! to the application handler and shape the response.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::adapters::http::error::ApiError;
use crate::adapters::http::middleware::{OptionalActor, RequireActor};
use crate::application::handlers::{
    AcceptSessionCommand, AcceptSessionHandler, CancelSessionCommand, CancelSessionHandler,
    CheckSubscriptionHandler, CheckSubscriptionQuery, CompleteSessionCommand,
    CompleteSessionHandler, CreateSessionCommand, CreateSessionHandler, GetResearcherHandler,
    GetResearcherQuery, HandleResearcherResponseCommand, HandleResearcherResponseHandler,
    ListSessionsHandler, ListSessionsQuery, RegisterResearcherCommand, RegisterResearcherHandler,
    RequestOutreachCommand, RequestOutreachHandler, RescheduleSessionCommand,
    RescheduleSessionHandler, RetryInvitationCommand, RetryInvitationHandler, SessionOwner,
};
use crate::domain::foundation::{OutreachRequestId, ResearcherId, SessionId, UserId};
use crate::domain::researcher::ResearcherProfile;

use super::dto::{
    CreateOutreachRequest, CreateSessionRequest, ListSessionsParams, OutreachAnswerRequest,
    OutreachRequestResponse, RegisterQuery, RegistrationResponse, RescheduleSessionRequest,
    ResearcherResponse, SessionListResponse, SessionResponse, SubscriptionAccessResponse,
    SubscriptionParams,
};

// ════════════════════════════════════════════════════════════════════════════
// Handler State
// ════════════════════════════════════════════════════════════════════════════

/// Application handlers behind the consulting routes.
#[derive(Clone)]
pub struct ConsultingHandlers {
    pub request_outreach: Arc<RequestOutreachHandler>,
    pub handle_response: Arc<HandleResearcherResponseHandler>,
    pub retry_invitation: Arc<RetryInvitationHandler>,
    pub register_researcher: Arc<RegisterResearcherHandler>,
    pub get_researcher: Arc<GetResearcherHandler>,
    pub create_session: Arc<CreateSessionHandler>,
    pub list_sessions: Arc<ListSessionsHandler>,
    pub cancel_session: Arc<CancelSessionHandler>,
    pub accept_session: Arc<AcceptSessionHandler>,
    pub complete_session: Arc<CompleteSessionHandler>,
    pub reschedule_session: Arc<RescheduleSessionHandler>,
    pub check_subscription: Arc<CheckSubscriptionHandler>,
}

// ════════════════════════════════════════════════════════════════════════════
// Outreach
// ════════════════════════════════════════════════════════════════════════════

/// POST /api/consulting/outreach
///
/// Answers 202 as soon as the request is stored; the invitation email goes
/// out in the background.
pub async fn request_outreach(
    State(handlers): State<ConsultingHandlers>,
    RequireActor(actor): RequireActor,
    Json(body): Json<CreateOutreachRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let request = handlers
        .request_outreach
        .handle(RequestOutreachCommand {
            user_id: actor.user_id,
            researcher_email: body.researcher_email,
            paper_id: body.paper_id,
        })
        .await?;

    Ok((StatusCode::ACCEPTED, Json(OutreachRequestResponse::from(request))))
}

/// POST /api/consulting/outreach/:id/response
///
/// Reached from the invitation email, so no actor is required.
pub async fn respond_to_outreach(
    State(handlers): State<ConsultingHandlers>,
    Path(outreach_id): Path<String>,
    Json(body): Json<OutreachAnswerRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let outreach_id: OutreachRequestId = parse_id(&outreach_id, "outreach request")?;

    let request = handlers
        .handle_response
        .handle(HandleResearcherResponseCommand {
            outreach_id,
            response: body.response,
        })
        .await?;

    Ok(Json(OutreachRequestResponse::from(request)))
}

/// POST /api/consulting/outreach/:id/retry
pub async fn retry_invitation(
    State(handlers): State<ConsultingHandlers>,
    RequireActor(actor): RequireActor,
    Path(outreach_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let outreach_id: OutreachRequestId = parse_id(&outreach_id, "outreach request")?;

    let request = handlers
        .retry_invitation
        .handle(RetryInvitationCommand { outreach_id, actor })
        .await?;

    Ok((StatusCode::ACCEPTED, Json(OutreachRequestResponse::from(request))))
}

// ════════════════════════════════════════════════════════════════════════════
// Researchers
// ════════════════════════════════════════════════════════════════════════════

/// POST /api/consulting/researchers/register?token=...
///
/// A signed-in caller has their account linked to the profile.
pub async fn register_researcher(
    State(handlers): State<ConsultingHandlers>,
    OptionalActor(actor): OptionalActor,
    Query(query): Query<RegisterQuery>,
    Json(profile): Json<ResearcherProfile>,
) -> Result<impl IntoResponse, ApiError> {
    let result = handlers
        .register_researcher
        .handle(RegisterResearcherCommand {
            token: query.token,
            profile,
            user_id: actor.map(|a| a.user_id),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(RegistrationResponse::from(result))))
}

/// GET /api/consulting/researchers/:id
pub async fn get_researcher(
    State(handlers): State<ConsultingHandlers>,
    Path(researcher_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id: ResearcherId = parse_id(&researcher_id, "researcher")?;

    match handlers
        .get_researcher
        .handle(GetResearcherQuery { researcher_id: id })
        .await?
    {
        Some(researcher) => Ok(Json(ResearcherResponse::from(researcher))),
        None => Err(ApiError::not_found("Researcher", &researcher_id)),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Sessions
// ════════════════════════════════════════════════════════════════════════════

/// POST /api/consulting/sessions
pub async fn create_session(
    State(handlers): State<ConsultingHandlers>,
    RequireActor(actor): RequireActor,
    Json(body): Json<CreateSessionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let session = handlers
        .create_session
        .handle(CreateSessionCommand {
            user_id: actor.user_id,
            researcher_id: body.researcher_id,
            paper_id: body.paper_id,
            start_time: body.start_time,
            end_time: body.end_time,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(SessionResponse::from(session))))
}

/// GET /api/consulting/sessions
///
/// `?researcher_id=` lists a researcher's calendar, `?user_id=` another
/// user's bookings (admins only); otherwise the caller's own bookings.
pub async fn list_sessions(
    State(handlers): State<ConsultingHandlers>,
    RequireActor(actor): RequireActor,
    Query(params): Query<ListSessionsParams>,
) -> Result<impl IntoResponse, ApiError> {
    let owner = match (params.researcher_id, params.user_id) {
        (Some(_), Some(_)) => {
            return Err(ApiError::bad_request(
                "Specify at most one of researcher_id and user_id",
            ))
        }
        (Some(raw), None) => SessionOwner::Researcher(parse_id(&raw, "researcher")?),
        (None, Some(raw)) => SessionOwner::User(parse_id(&raw, "user")?),
        (None, None) => SessionOwner::User(actor.user_id),
    };

    let sessions = handlers
        .list_sessions
        .handle(ListSessionsQuery { owner, actor })
        .await?;

    Ok(Json(SessionListResponse::from(sessions)))
}

/// POST /api/consulting/sessions/:id/cancel
pub async fn cancel_session(
    State(handlers): State<ConsultingHandlers>,
    RequireActor(actor): RequireActor,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let session_id: SessionId = parse_id(&session_id, "session")?;

    let session = handlers
        .cancel_session
        .handle(CancelSessionCommand { session_id, actor })
        .await?;

    Ok(Json(SessionResponse::from(session)))
}

/// POST /api/consulting/sessions/:id/accept
pub async fn accept_session(
    State(handlers): State<ConsultingHandlers>,
    RequireActor(actor): RequireActor,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let session_id: SessionId = parse_id(&session_id, "session")?;

    let session = handlers
        .accept_session
        .handle(AcceptSessionCommand { session_id, actor })
        .await?;

    Ok(Json(SessionResponse::from(session)))
}

/// POST /api/consulting/sessions/:id/complete
pub async fn complete_session(
    State(handlers): State<ConsultingHandlers>,
    RequireActor(actor): RequireActor,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let session_id: SessionId = parse_id(&session_id, "session")?;

    let session = handlers
        .complete_session
        .handle(CompleteSessionCommand { session_id, actor })
        .await?;

    Ok(Json(SessionResponse::from(session)))
}

/// POST /api/consulting/sessions/:id/reschedule
pub async fn reschedule_session(
    State(handlers): State<ConsultingHandlers>,
    RequireActor(actor): RequireActor,
    Path(session_id): Path<String>,
    Json(body): Json<RescheduleSessionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let session_id: SessionId = parse_id(&session_id, "session")?;

    let session = handlers
        .reschedule_session
        .handle(RescheduleSessionCommand {
            session_id,
            start_time: body.start_time,
            end_time: body.end_time,
            actor,
        })
        .await?;

    Ok(Json(SessionResponse::from(session)))
}

// ════════════════════════════════════════════════════════════════════════════
// Subscription
// ════════════════════════════════════════════════════════════════════════════

/// GET /api/consulting/subscription
pub async fn check_subscription(
    State(handlers): State<ConsultingHandlers>,
    RequireActor(actor): RequireActor,
    Query(params): Query<SubscriptionParams>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id: UserId = match params.user_id {
        Some(raw) => parse_id(&raw, "user")?,
        None => actor.user_id,
    };

    let access = handlers
        .check_subscription
        .handle(CheckSubscriptionQuery { user_id, actor })
        .await?;

    Ok(Json(SubscriptionAccessResponse::from(access)))
}

// ════════════════════════════════════════════════════════════════════════════
// Helpers
// ════════════════════════════════════════════════════════════════════════════

fn parse_id<T: std::str::FromStr>(raw: &str, what: &str) -> Result<T, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::bad_request(format!("Invalid {} ID: {}", what, raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_id_accepts_uuid() {
        let id = SessionId::new();
        let parsed: SessionId = parse_id(&id.to_string(), "session").unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn parse_id_rejects_garbage_with_400() {
        let err = parse_id::<SessionId>("nope", "session").unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(err.body().message.contains("nope"));
    }
}
