//! Shared wiring for integration tests: the full application over in-memory
//! adapters, driven through the router with `oneshot`.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;

use paper_consult::adapters::memory::{
    InMemoryMeetingProvider, InMemoryOutreachRepository, InMemoryPaperCatalog,
    InMemoryPaymentRepository, InMemoryResearcherRepository, InMemorySessionRepository,
    InMemorySubscriptionRepository, InMemoryUserDirectory, RecordingEmailSender,
};
use paper_consult::adapters::stripe::{sign_payload, StripeWebhookGateway};
use paper_consult::adapters::tasks::{TaskRunnerConfig, TokioTaskRunner};
use paper_consult::app::{AppSettings, Application, Collaborators};
use paper_consult::application::handlers::SubscriptionPlan;
use paper_consult::config::ServerConfig;
use paper_consult::domain::foundation::UserId;
use paper_consult::domain::outreach::RegistrationTokenCodec;
use paper_consult::domain::researcher::{Researcher, ResearcherProfile};
use paper_consult::ports::ResearcherRepository;

pub const WEBHOOK_SECRET: &str = "whsec_integration_tests";
pub const TOKEN_SECRET: &[u8] = b"integration-token-secret-0123456789";
pub const FRONTEND: &str = "https://app.example.com";

pub struct TestApp {
    pub router: Router,
    pub application: Application,
    pub users: Arc<InMemoryUserDirectory>,
    pub papers: Arc<InMemoryPaperCatalog>,
    pub researchers: Arc<InMemoryResearcherRepository>,
    pub outreach: Arc<InMemoryOutreachRepository>,
    pub sessions: Arc<InMemorySessionRepository>,
    pub payments: Arc<InMemoryPaymentRepository>,
    pub subscriptions: Arc<InMemorySubscriptionRepository>,
    pub email: Arc<RecordingEmailSender>,
    pub meetings: Arc<InMemoryMeetingProvider>,
    pub tasks: Arc<TokioTaskRunner>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_meetings(Arc::new(InMemoryMeetingProvider::new()))
    }

    pub fn with_meetings(meetings: Arc<InMemoryMeetingProvider>) -> Self {
        let users = Arc::new(InMemoryUserDirectory::new());
        let papers = Arc::new(InMemoryPaperCatalog::new());
        let researchers = Arc::new(InMemoryResearcherRepository::new());
        let outreach = Arc::new(InMemoryOutreachRepository::new());
        let sessions = Arc::new(InMemorySessionRepository::new());
        let payments = Arc::new(InMemoryPaymentRepository::new());
        let subscriptions = Arc::new(InMemorySubscriptionRepository::new());
        let email = Arc::new(RecordingEmailSender::new());
        let tasks = Arc::new(TokioTaskRunner::new(
            TaskRunnerConfig::default().with_retry_backoff(Duration::ZERO),
        ));

        let ports = Collaborators {
            users: users.clone(),
            papers: papers.clone(),
            researchers: researchers.clone(),
            outreach: outreach.clone(),
            sessions: sessions.clone(),
            payments: payments.clone(),
            subscriptions: subscriptions.clone(),
            email: email.clone(),
            meetings: Some(meetings.clone()),
            gateway: Arc::new(StripeWebhookGateway::new(SecretString::new(
                WEBHOOK_SECRET.to_string(),
            ))),
            tasks: tasks.clone(),
        };
        let settings = AppSettings {
            tokens: RegistrationTokenCodec::with_default_ttl(TOKEN_SECRET),
            registration_base_url: FRONTEND.to_string(),
            cancellation_notice: chrono::Duration::hours(24),
            plan: SubscriptionPlan::default(),
        };

        let application = Application::build(ports, settings);
        let router = application.router(&ServerConfig::default());

        Self {
            router,
            application,
            users,
            papers,
            researchers,
            outreach,
            sessions,
            payments,
            subscriptions,
            email,
            meetings,
            tasks,
        }
    }

    /// Issues a registration token the way the invitation email does.
    pub fn codec(&self) -> RegistrationTokenCodec {
        RegistrationTokenCodec::with_default_ttl(TOKEN_SECRET)
    }

    pub async fn user(&self, email: &str) -> UserId {
        self.users.add_user(email, Some("Test User")).await
    }

    pub async fn researcher(&self, email: &str, account: Option<UserId>) -> Researcher {
        self.researchers
            .upsert_by_email(profile(email, "Dr. Example"), account)
            .await
            .unwrap()
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        actor: Option<&UserId>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user_id) = actor {
            builder = builder.header("X-User-Id", user_id.to_string());
        }
        let body = match body {
            Some(json) => {
                builder = builder.header("Content-Type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        self.send(builder.body(body).unwrap()).await
    }

    pub async fn admin_request(&self, method: Method, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("X-User-Id", UserId::new().to_string())
            .header("X-User-Role", "admin")
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    /// Posts a webhook body signed with the configured secret.
    pub async fn deliver(&self, payload: &Value) -> (StatusCode, Value) {
        let body = payload.to_string();
        let signature = sign_payload(
            WEBHOOK_SECRET.as_bytes(),
            chrono::Utc::now().timestamp(),
            body.as_bytes(),
        );
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/webhooks/payments")
            .header("Stripe-Signature", signature)
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }
}

pub fn profile(email: &str, name: &str) -> ResearcherProfile {
    ResearcherProfile {
        email: email.to_string(),
        name: name.to_string(),
        affiliation: Some("University of Testing".to_string()),
        bio: None,
        hourly_rate_cents: Some(12_000),
        availability: BTreeMap::new(),
    }
}

/// A `payment_intent.*` event in the gateway's wire format.
pub fn payment_event(kind: &str, transaction_id: &str, metadata: Value) -> Value {
    serde_json::json!({
        "id": format!("evt_{}_{}", kind, transaction_id),
        "type": format!("payment_intent.{}", kind),
        "data": {
            "object": {
                "id": transaction_id,
                "amount": 4900,
                "currency": "usd",
                "metadata": metadata,
            }
        }
    })
}

/// Pulls the registration token out of an invitation email.
pub fn token_from_invitation(html: &str) -> String {
    let marker = "register?token=";
    let start = html.find(marker).expect("invitation carries a link") + marker.len();
    html[start..]
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        .collect()
}
