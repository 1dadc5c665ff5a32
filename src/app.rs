//! Composition root.
//!
//! Wires ports to application handlers and handlers to the router. The
//! binary feeds it Postgres and provider adapters; integration tests feed it
//! the in-memory ones.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use secrecy::ExposeSecret;
use tokio::sync::watch;

use crate::adapters::http::{app_router, ConsultingHandlers, WebhookHandlers};
use crate::application::handlers::{
    AcceptSessionHandler, CancelSessionHandler, CheckSubscriptionHandler, CompleteSessionHandler,
    ConfirmSessionPaymentHandler, CreateOrRenewSubscriptionHandler, CreateSessionHandler,
    GetResearcherHandler, HandlePaymentWebhookHandler, HandleResearcherResponseHandler,
    ListSessionsHandler, RegisterResearcherHandler, RequestOutreachHandler,
    RescheduleSessionHandler, RetryInvitationHandler, SubscriptionPlan,
    SweepStaleOutreachCommand, SweepStaleOutreachHandler,
};
use crate::application::services::{InvitationDispatcher, MeetingLifecycle, Notifier};
use crate::config::{AppConfig, ServerConfig};
use crate::domain::outreach::RegistrationTokenCodec;
use crate::ports::{
    EmailSender, MeetingProvider, OutreachRepository, PaperCatalog, PaymentGateway,
    PaymentRepository, ResearcherRepository, SessionRepository, SubscriptionRepository,
    TaskRunner, UserDirectory,
};

/// Port implementations the application runs on.
#[derive(Clone)]
pub struct Collaborators {
    pub users: Arc<dyn UserDirectory>,
    pub papers: Arc<dyn PaperCatalog>,
    pub researchers: Arc<dyn ResearcherRepository>,
    pub outreach: Arc<dyn OutreachRepository>,
    pub sessions: Arc<dyn SessionRepository>,
    pub payments: Arc<dyn PaymentRepository>,
    pub subscriptions: Arc<dyn SubscriptionRepository>,
    pub email: Arc<dyn EmailSender>,
    /// `None` books sessions without video links.
    pub meetings: Option<Arc<dyn MeetingProvider>>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub tasks: Arc<dyn TaskRunner>,
}

/// Business settings the handlers are built with.
pub struct AppSettings {
    pub tokens: RegistrationTokenCodec,
    pub registration_base_url: String,
    pub cancellation_notice: chrono::Duration,
    pub plan: SubscriptionPlan,
}

impl AppSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            tokens: RegistrationTokenCodec::new(
                config.registration.token_secret.expose_secret().as_bytes(),
                config.registration.token_ttl(),
            ),
            registration_base_url: config.registration.frontend_base_url.clone(),
            cancellation_notice: config.consulting.cancellation_notice(),
            plan: SubscriptionPlan {
                price_cents: config.consulting.subscription_price_cents,
                validity_days: config.consulting.subscription_validity_days,
            },
        }
    }
}

/// Every handler, grouped by surface.
pub struct Application {
    pub consulting: ConsultingHandlers,
    pub webhooks: WebhookHandlers,
    pub sweep: Arc<SweepStaleOutreachHandler>,
}

impl Application {
    pub fn build(ports: Collaborators, settings: AppSettings) -> Self {
        let tokens = Arc::new(settings.tokens);
        let meetings = Arc::new(match ports.meetings.clone() {
            Some(provider) => MeetingLifecycle::new(provider),
            None => MeetingLifecycle::disabled(),
        });
        let dispatcher = Arc::new(InvitationDispatcher::new(
            ports.outreach.clone(),
            ports.users.clone(),
            ports.papers.clone(),
            ports.email.clone(),
            tokens.clone(),
            settings.registration_base_url,
        ));
        let notifier = Notifier::new(
            ports.users.clone(),
            ports.researchers.clone(),
            ports.email.clone(),
            ports.tasks.clone(),
        );

        let subscriptions = Arc::new(CreateOrRenewSubscriptionHandler::new(
            ports.subscriptions.clone(),
            ports.payments.clone(),
            notifier.clone(),
            settings.plan,
        ));
        let confirm_session = Arc::new(ConfirmSessionPaymentHandler::new(
            ports.sessions.clone(),
            meetings.clone(),
        ));

        let consulting = ConsultingHandlers {
            request_outreach: Arc::new(RequestOutreachHandler::new(
                ports.outreach.clone(),
                dispatcher.clone(),
                ports.tasks.clone(),
            )),
            handle_response: Arc::new(HandleResearcherResponseHandler::new(
                ports.outreach.clone(),
                notifier.clone(),
            )),
            retry_invitation: Arc::new(RetryInvitationHandler::new(
                ports.outreach.clone(),
                dispatcher.clone(),
                ports.tasks.clone(),
            )),
            register_researcher: Arc::new(RegisterResearcherHandler::new(
                ports.outreach.clone(),
                ports.researchers.clone(),
                tokens,
                notifier.clone(),
            )),
            get_researcher: Arc::new(GetResearcherHandler::new(ports.researchers.clone())),
            create_session: Arc::new(CreateSessionHandler::new(
                ports.sessions.clone(),
                ports.researchers.clone(),
                ports.papers.clone(),
                meetings.clone(),
                notifier.clone(),
            )),
            list_sessions: Arc::new(ListSessionsHandler::new(
                ports.sessions.clone(),
                ports.researchers.clone(),
            )),
            cancel_session: Arc::new(CancelSessionHandler::new(
                ports.sessions.clone(),
                meetings.clone(),
                notifier.clone(),
                settings.cancellation_notice,
            )),
            accept_session: Arc::new(AcceptSessionHandler::new(
                ports.sessions.clone(),
                ports.researchers.clone(),
                meetings.clone(),
            )),
            complete_session: Arc::new(CompleteSessionHandler::new(
                ports.sessions.clone(),
                ports.researchers.clone(),
                meetings.clone(),
                notifier.clone(),
            )),
            reschedule_session: Arc::new(RescheduleSessionHandler::new(
                ports.sessions.clone(),
                ports.researchers.clone(),
                meetings,
                notifier,
            )),
            check_subscription: Arc::new(CheckSubscriptionHandler::new(ports.subscriptions.clone())),
        };

        let webhooks = WebhookHandlers {
            payment_webhook: Arc::new(HandlePaymentWebhookHandler::new(
                ports.gateway.clone(),
                ports.payments.clone(),
                confirm_session,
                subscriptions,
                ports.tasks.clone(),
            )),
        };

        let sweep = Arc::new(SweepStaleOutreachHandler::new(
            ports.outreach,
            dispatcher,
            ports.tasks,
        ));

        Self {
            consulting,
            webhooks,
            sweep,
        }
    }

    pub fn router(&self, server: &ServerConfig) -> Router {
        app_router(self.consulting.clone(), self.webhooks.clone(), server)
    }
}

/// Re-dispatches stuck invitations every `interval` until `shutdown` flips.
pub async fn run_outreach_sweep(
    sweep: Arc<SweepStaleOutreachHandler>,
    interval: Duration,
    older_than: chrono::Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match sweep.handle(SweepStaleOutreachCommand { older_than }).await {
                    Ok(0) => {}
                    Ok(count) => tracing::info!(count, "Re-dispatched stale outreach requests"),
                    Err(e) => tracing::error!(error = %e, "Outreach sweep failed"),
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    tracing::debug!("Outreach sweep stopped");
                    return;
                }
            }
        }
    }
}
