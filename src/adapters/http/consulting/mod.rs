//! HTTP adapter for outreach, researchers, sessions and subscriptions.

mod dto;
mod handlers;
mod routes;

pub use dto::{
    CreateOutreachRequest, CreateSessionRequest, ListSessionsParams, OutreachAnswerRequest,
    OutreachRequestResponse, RegisterQuery, RegistrationResponse, RescheduleSessionRequest,
    ResearcherResponse, SessionListResponse, SessionResponse, SubscriptionAccessResponse,
    SubscriptionParams, SubscriptionResponse,
};
pub use handlers::ConsultingHandlers;
pub use routes::consulting_routes;
