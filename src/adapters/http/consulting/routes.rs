//! Axum router for consulting endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    accept_session, cancel_session, check_subscription, complete_session, create_session,
    get_researcher, list_sessions, register_researcher, request_outreach, reschedule_session,
    respond_to_outreach, retry_invitation, ConsultingHandlers,
};

/// Creates the consulting router.
///
/// # Routes
///
/// ## Outreach
/// - `POST /outreach` - Invite a researcher (202)
/// - `POST /outreach/:id/response` - Researcher accepts or declines
/// - `POST /outreach/:id/retry` - Re-send a failed or stuck invitation
///
/// ## Researchers
/// - `POST /researchers/register?token=` - Complete registration
/// - `GET /researchers/:id` - Researcher profile
///
/// ## Sessions
/// - `POST /sessions` - Book a session
/// - `GET /sessions` - List sessions
/// - `POST /sessions/:id/{cancel,accept,complete,reschedule}`
///
/// ## Subscription
/// - `GET /subscription` - Access check
pub fn consulting_routes(handlers: ConsultingHandlers) -> Router {
    Router::new()
        .route("/outreach", post(request_outreach))
        .route("/outreach/:id/response", post(respond_to_outreach))
        .route("/outreach/:id/retry", post(retry_invitation))
        .route("/researchers/register", post(register_researcher))
        .route("/researchers/:id", get(get_researcher))
        .route("/sessions", post(create_session).get(list_sessions))
        .route("/sessions/:id/cancel", post(cancel_session))
        .route("/sessions/:id/accept", post(accept_session))
        .route("/sessions/:id/complete", post(complete_session))
        .route("/sessions/:id/reschedule", post(reschedule_session))
        .route("/subscription", get(check_subscription))
        .with_state(handlers)
}
