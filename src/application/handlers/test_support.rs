//! Wiring shared by handler tests: in-memory adapters, a zero-backoff task
//! runner and constructors for every handler.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;

use crate::adapters::memory::{
    InMemoryMeetingProvider, InMemoryOutreachRepository, InMemoryPaperCatalog,
    InMemoryPaymentRepository, InMemoryResearcherRepository, InMemorySessionRepository,
    InMemorySubscriptionRepository, InMemoryUserDirectory, RecordingEmailSender,
};
use crate::adapters::stripe::{sign_payload, StripeWebhookGateway};
use crate::adapters::tasks::{TaskRunnerConfig, TokioTaskRunner};
use crate::application::services::{InvitationDispatcher, MeetingLifecycle, Notifier};
use crate::domain::foundation::{SessionId, Timestamp, UserId};
use crate::domain::outreach::{OutreachRequest, RegistrationTokenCodec};
use crate::domain::researcher::{Researcher, ResearcherProfile};
use crate::domain::session::{ConsultationSession, SessionStatus};
use crate::ports::{OutreachRepository, ResearcherRepository, SessionRepository};

use super::outreach::{
    HandleResearcherResponseHandler, RegisterResearcherHandler, RequestOutreachHandler,
    RetryInvitationHandler, SweepStaleOutreachHandler,
};
use super::payment::HandlePaymentWebhookHandler;
use super::researcher::GetResearcherHandler;
use super::session::{
    AcceptSessionHandler, CancelSessionHandler, CompleteSessionHandler,
    ConfirmSessionPaymentHandler, CreateSessionCommand, CreateSessionHandler,
    ListSessionsHandler, RescheduleSessionHandler,
};
use super::subscription::{
    CheckSubscriptionHandler, CreateOrRenewSubscriptionHandler, SubscriptionPlan,
};

const TOKEN_SECRET: &[u8] = b"handler-test-token-secret";
const WEBHOOK_SECRET: &str = "whsec_handler_tests";

pub fn profile(email: &str, name: &str) -> ResearcherProfile {
    ResearcherProfile {
        email: email.to_string(),
        name: name.to_string(),
        affiliation: Some("Institute of Examples".to_string()),
        bio: None,
        hourly_rate_cents: Some(15_000),
        availability: BTreeMap::new(),
    }
}

pub struct Harness {
    pub users: Arc<InMemoryUserDirectory>,
    pub papers: Arc<InMemoryPaperCatalog>,
    pub researchers: Arc<InMemoryResearcherRepository>,
    pub outreach: Arc<InMemoryOutreachRepository>,
    pub sessions: Arc<InMemorySessionRepository>,
    pub payments: Arc<InMemoryPaymentRepository>,
    pub subscriptions: Arc<InMemorySubscriptionRepository>,
    pub email: Arc<RecordingEmailSender>,
    pub meetings: Arc<InMemoryMeetingProvider>,
    pub meeting_lifecycle: Arc<MeetingLifecycle>,
    pub tasks: Arc<TokioTaskRunner>,
    pub tokens: Arc<RegistrationTokenCodec>,
    pub dispatcher: Arc<InvitationDispatcher>,
    pub notifier: Notifier,
}

impl Harness {
    pub fn new() -> Self {
        let meetings = Arc::new(InMemoryMeetingProvider::new());
        Self::build(meetings.clone(), MeetingLifecycle::new(meetings))
    }

    /// No meeting provider configured.
    pub fn without_meetings() -> Self {
        Self::build(Arc::new(InMemoryMeetingProvider::new()), MeetingLifecycle::disabled())
    }

    /// Meeting provider that fails every call.
    pub fn with_failing_meetings() -> Self {
        let meetings = Arc::new(InMemoryMeetingProvider::failing());
        Self::build(meetings.clone(), MeetingLifecycle::new(meetings))
    }

    fn build(meetings: Arc<InMemoryMeetingProvider>, lifecycle: MeetingLifecycle) -> Self {
        let users = Arc::new(InMemoryUserDirectory::new());
        let papers = Arc::new(InMemoryPaperCatalog::new());
        let researchers = Arc::new(InMemoryResearcherRepository::new());
        let outreach = Arc::new(InMemoryOutreachRepository::new());
        let email = Arc::new(RecordingEmailSender::new());
        let tasks = Arc::new(TokioTaskRunner::new(
            TaskRunnerConfig::default().with_retry_backoff(Duration::ZERO),
        ));
        let tokens = Arc::new(RegistrationTokenCodec::with_default_ttl(TOKEN_SECRET));
        let dispatcher = Arc::new(InvitationDispatcher::new(
            outreach.clone(),
            users.clone(),
            papers.clone(),
            email.clone(),
            tokens.clone(),
            "https://app.example.com",
        ));
        let notifier = Notifier::new(users.clone(), researchers.clone(), email.clone(), tasks.clone());

        Self {
            users,
            papers,
            researchers,
            outreach,
            sessions: Arc::new(InMemorySessionRepository::new()),
            payments: Arc::new(InMemoryPaymentRepository::new()),
            subscriptions: Arc::new(InMemorySubscriptionRepository::new()),
            email,
            meetings,
            meeting_lifecycle: Arc::new(lifecycle),
            tasks,
            tokens,
            dispatcher,
            notifier,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Fixtures
    // ─────────────────────────────────────────────────────────────────────────

    /// A stored request whose invitation went out.
    pub async fn pending_request(&self, user_email: &str, researcher_email: &str) -> OutreachRequest {
        let user_id = self.users.add_user(user_email, None).await;
        let request = OutreachRequest::new(user_id, researcher_email, None).unwrap();
        self.outreach.save(&request).await.unwrap();
        self.dispatcher.dispatch(request.id()).await.unwrap();
        self.outreach.find_by_id(&request.id()).await.unwrap().unwrap()
    }

    pub async fn user_and_researcher(&self) -> (UserId, Researcher) {
        let user_id = self.users.add_user("booker@example.com", Some("Bea Booker")).await;
        let researcher = self
            .researchers
            .upsert_by_email(profile("r@example.com", "Dr. R"), None)
            .await
            .unwrap();
        (user_id, researcher)
    }

    /// A session booked through the handler, starting `hours_ahead` from now.
    pub async fn booked_session(&self, hours_ahead: i64) -> ConsultationSession {
        let (user_id, researcher) = self.user_and_researcher().await;
        let start = Timestamp::now().add_hours(hours_ahead);
        self.create_session()
            .handle(CreateSessionCommand {
                user_id,
                researcher_id: researcher.id,
                paper_id: None,
                start_time: start,
                end_time: start.add_hours(1),
            })
            .await
            .unwrap()
    }

    /// A scheduled session that ended an hour ago.
    pub async fn past_session(&self) -> ConsultationSession {
        let (user_id, researcher) = self.user_and_researcher().await;
        let end = Timestamp::now().add_hours(-1);
        let session = ConsultationSession::reconstitute(
            SessionId::new(),
            user_id,
            researcher.id,
            None,
            end.add_hours(-1),
            end,
            SessionStatus::Scheduled,
            None,
            end.add_days(-2),
            end.add_days(-2),
        );
        self.sessions.save(&session).await.unwrap();
        session
    }

    /// Links the session's researcher to a fresh platform account.
    pub async fn link_researcher(&self, session: &ConsultationSession) -> UserId {
        let researcher = self
            .researchers
            .find_by_id(&session.researcher_id())
            .await
            .unwrap()
            .unwrap();
        let account = UserId::new();
        self.researchers
            .upsert_by_email(profile(&researcher.email, &researcher.name), Some(account))
            .await
            .unwrap();
        account
    }

    /// Signature header for a webhook body, signed now.
    pub fn sign(&self, payload: &[u8]) -> String {
        sign_payload(WEBHOOK_SECRET.as_bytes(), chrono::Utc::now().timestamp(), payload)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Handlers
    // ─────────────────────────────────────────────────────────────────────────

    pub fn request_outreach(&self) -> RequestOutreachHandler {
        RequestOutreachHandler::new(self.outreach.clone(), self.dispatcher.clone(), self.tasks.clone())
    }

    pub fn handle_response(&self) -> HandleResearcherResponseHandler {
        HandleResearcherResponseHandler::new(self.outreach.clone(), self.notifier.clone())
    }

    pub fn register_researcher(&self) -> RegisterResearcherHandler {
        RegisterResearcherHandler::new(
            self.outreach.clone(),
            self.researchers.clone(),
            self.tokens.clone(),
            self.notifier.clone(),
        )
    }

    pub fn retry_invitation(&self) -> RetryInvitationHandler {
        RetryInvitationHandler::new(self.outreach.clone(), self.dispatcher.clone(), self.tasks.clone())
    }

    pub fn sweep_stale_outreach(&self) -> SweepStaleOutreachHandler {
        SweepStaleOutreachHandler::new(self.outreach.clone(), self.dispatcher.clone(), self.tasks.clone())
    }

    pub fn create_session(&self) -> CreateSessionHandler {
        CreateSessionHandler::new(
            self.sessions.clone(),
            self.researchers.clone(),
            self.papers.clone(),
            self.meeting_lifecycle.clone(),
            self.notifier.clone(),
        )
    }

    pub fn cancel_session(&self) -> CancelSessionHandler {
        CancelSessionHandler::new(
            self.sessions.clone(),
            self.meeting_lifecycle.clone(),
            self.notifier.clone(),
            chrono::Duration::hours(24),
        )
    }

    pub fn accept_session(&self) -> AcceptSessionHandler {
        AcceptSessionHandler::new(
            self.sessions.clone(),
            self.researchers.clone(),
            self.meeting_lifecycle.clone(),
        )
    }

    pub fn reschedule_session(&self) -> RescheduleSessionHandler {
        RescheduleSessionHandler::new(
            self.sessions.clone(),
            self.researchers.clone(),
            self.meeting_lifecycle.clone(),
            self.notifier.clone(),
        )
    }

    pub fn complete_session(&self) -> CompleteSessionHandler {
        CompleteSessionHandler::new(
            self.sessions.clone(),
            self.researchers.clone(),
            self.meeting_lifecycle.clone(),
            self.notifier.clone(),
        )
    }

    pub fn confirm_session_payment(&self) -> ConfirmSessionPaymentHandler {
        ConfirmSessionPaymentHandler::new(self.sessions.clone(), self.meeting_lifecycle.clone())
    }

    pub fn list_sessions(&self) -> ListSessionsHandler {
        ListSessionsHandler::new(self.sessions.clone(), self.researchers.clone())
    }

    pub fn create_or_renew_subscription(&self) -> CreateOrRenewSubscriptionHandler {
        CreateOrRenewSubscriptionHandler::new(
            self.subscriptions.clone(),
            self.payments.clone(),
            self.notifier.clone(),
            SubscriptionPlan::default(),
        )
    }

    pub fn check_subscription(&self) -> CheckSubscriptionHandler {
        CheckSubscriptionHandler::new(self.subscriptions.clone())
    }

    pub fn payment_webhook(&self) -> HandlePaymentWebhookHandler {
        HandlePaymentWebhookHandler::new(
            Arc::new(StripeWebhookGateway::new(SecretString::new(WEBHOOK_SECRET.to_string()))),
            self.payments.clone(),
            Arc::new(self.confirm_session_payment()),
            Arc::new(self.create_or_renew_subscription()),
            self.tasks.clone(),
        )
    }

    pub fn get_researcher(&self) -> GetResearcherHandler {
        GetResearcherHandler::new(self.researchers.clone())
    }
}
