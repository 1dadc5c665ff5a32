//! Outreach handlers: invitations, researcher answers and registration.

mod handle_researcher_response;
mod register_researcher;
mod request_outreach;
mod retry_invitation;
mod sweep_stale_outreach;

pub use handle_researcher_response::{
    HandleResearcherResponseCommand, HandleResearcherResponseHandler,
};
pub use register_researcher::{
    RegisterResearcherCommand, RegisterResearcherHandler, RegisterResearcherResult,
};
pub use request_outreach::{RequestOutreachCommand, RequestOutreachHandler};
pub use retry_invitation::{RetryInvitationCommand, RetryInvitationHandler};
pub use sweep_stale_outreach::{SweepStaleOutreachCommand, SweepStaleOutreachHandler};
