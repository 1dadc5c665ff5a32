//! Application handlers.
//!
//! One command or query handler per operation. Handlers hold their
//! collaborators as `Arc<dyn Port>` and are cheap to share across requests.

pub mod outreach;
pub mod payment;
pub mod researcher;
pub mod session;
pub mod subscription;

#[cfg(test)]
pub(crate) mod test_support;

pub use outreach::{
    HandleResearcherResponseCommand, HandleResearcherResponseHandler, RegisterResearcherCommand,
    RegisterResearcherHandler, RegisterResearcherResult, RequestOutreachCommand,
    RequestOutreachHandler, RetryInvitationCommand, RetryInvitationHandler,
    SweepStaleOutreachCommand, SweepStaleOutreachHandler,
};
pub use payment::{HandlePaymentWebhookCommand, HandlePaymentWebhookHandler, WebhookOutcome};
pub use researcher::{GetResearcherHandler, GetResearcherQuery};
pub use session::{
    AcceptSessionCommand, AcceptSessionHandler, CancelSessionCommand, CancelSessionHandler,
    CompleteSessionCommand, CompleteSessionHandler, ConfirmSessionPaymentCommand,
    ConfirmSessionPaymentHandler, CreateSessionCommand, CreateSessionHandler,
    ListSessionsHandler, ListSessionsQuery, RescheduleSessionCommand, RescheduleSessionHandler,
    SessionOwner, DEFAULT_CANCELLATION_NOTICE_HOURS,
};
pub use subscription::{
    CheckSubscriptionHandler, CheckSubscriptionQuery, CreateOrRenewSubscriptionCommand,
    CreateOrRenewSubscriptionHandler, CreateOrRenewSubscriptionResult, SubscriptionAccess,
    SubscriptionPlan,
};
