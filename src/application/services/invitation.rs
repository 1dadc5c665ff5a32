//! Invitation delivery for outreach requests.
//!
//! `dispatch` is safe to repeat: a request that is no longer `created` or
//! `email_failed` is left alone, and the outcome is written only if the
//! status is still the one read, so a sweep racing a retry or a
//! registration sends at most one extra email and never rewinds status.

use std::sync::Arc;

use crate::domain::foundation::OutreachRequestId;
use crate::domain::outreach::{OutreachRequest, OutreachStatus, RegistrationTokenCodec};
use crate::ports::{
    BackgroundTask, EmailMessage, EmailSender, OutreachRepository, PaperCatalog, TaskError,
    TaskRunner, UserDirectory,
};

use super::templates;

pub struct InvitationDispatcher {
    outreach: Arc<dyn OutreachRepository>,
    users: Arc<dyn UserDirectory>,
    papers: Arc<dyn PaperCatalog>,
    email: Arc<dyn EmailSender>,
    tokens: Arc<RegistrationTokenCodec>,
    registration_base_url: String,
}

impl InvitationDispatcher {
    pub fn new(
        outreach: Arc<dyn OutreachRepository>,
        users: Arc<dyn UserDirectory>,
        papers: Arc<dyn PaperCatalog>,
        email: Arc<dyn EmailSender>,
        tokens: Arc<RegistrationTokenCodec>,
        registration_base_url: impl Into<String>,
    ) -> Self {
        Self {
            outreach,
            users,
            papers,
            email,
            tokens,
            registration_base_url: registration_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Registration link carried by the invitation email.
    pub fn registration_url(&self, token: &str) -> String {
        format!("{}/researcher/register?token={}", self.registration_base_url, token)
    }

    /// Queues delivery of the invitation for `id`.
    pub fn submit(self: &Arc<Self>, tasks: &dyn TaskRunner, id: OutreachRequestId) {
        let dispatcher = Arc::clone(self);
        tasks.submit(BackgroundTask::new(format!("send_invitation:{}", id), move || {
            let dispatcher = Arc::clone(&dispatcher);
            async move { dispatcher.dispatch(id).await }
        }));
    }

    /// Sends the invitation email and records the delivery outcome.
    pub async fn dispatch(&self, id: OutreachRequestId) -> Result<(), TaskError> {
        let mut request = self
            .outreach
            .find_by_id(&id)
            .await
            .map_err(|e| TaskError::retryable(e.to_string()))?
            .ok_or_else(|| TaskError::permanent(format!("outreach request {} not found", id)))?;

        if !request.status().can_dispatch() {
            tracing::debug!(outreach_id = %id, status = %request.status(), "Invitation already handled");
            return Ok(());
        }

        let read_status = request.status();
        let message = self.compose(&request).await?;

        match self.email.send(message).await {
            Ok(()) => {
                request
                    .mark_invitation_delivered()
                    .map_err(|e| TaskError::permanent(e.to_string()))?;
                if self.persist(&request, read_status).await? {
                    tracing::info!(outreach_id = %id, "Invitation delivered");
                }
                Ok(())
            }
            Err(e) => {
                request
                    .mark_invitation_failed()
                    .map_err(|err| TaskError::permanent(err.to_string()))?;
                if !self.persist(&request, read_status).await? {
                    return Ok(());
                }
                tracing::warn!(outreach_id = %id, error = %e, "Invitation delivery failed");
                Err(TaskError::retryable(e.to_string()))
            }
        }
    }

    async fn compose(&self, request: &OutreachRequest) -> Result<EmailMessage, TaskError> {
        let requester = self
            .users
            .find_contact(&request.user_id())
            .await
            .map_err(|e| TaskError::retryable(e.to_string()))?
            .map(|c| c.display_name().to_string())
            .unwrap_or_else(|| "A researcher on our platform".to_string());

        let paper_title = match request.paper_id() {
            Some(paper_id) => self
                .papers
                .find_summary(&paper_id)
                .await
                .map_err(|e| TaskError::retryable(e.to_string()))?
                .map(|p| p.title),
            None => None,
        };

        let token = self
            .tokens
            .issue(request.researcher_email(), request.id())
            .map_err(|e| TaskError::permanent(e.to_string()))?;
        let url = self.registration_url(&token);

        let (subject, html) = templates::invitation(&requester, paper_title.as_deref(), &url);
        Ok(EmailMessage::new(request.researcher_email(), subject, html))
    }

    /// Records the delivery outcome; false if another writer got there first.
    async fn persist(
        &self,
        request: &OutreachRequest,
        read_status: OutreachStatus,
    ) -> Result<bool, TaskError> {
        let written = self
            .outreach
            .update_if_status(request, read_status)
            .await
            .map_err(|e| TaskError::retryable(e.to_string()))?;
        if !written {
            tracing::debug!(
                outreach_id = %request.id(),
                "Outreach status changed during delivery; keeping the newer status"
            );
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{
        InMemoryOutreachRepository, InMemoryPaperCatalog, InMemoryUserDirectory,
        RecordingEmailSender,
    };
    use crate::adapters::tasks::{TaskRunnerConfig, TokioTaskRunner};
    use std::time::Duration;

    const SECRET: &[u8] = b"invitation-test-secret";

    struct Fixture {
        outreach: Arc<InMemoryOutreachRepository>,
        users: Arc<InMemoryUserDirectory>,
        papers: Arc<InMemoryPaperCatalog>,
        email: Arc<RecordingEmailSender>,
        tokens: Arc<RegistrationTokenCodec>,
        dispatcher: Arc<InvitationDispatcher>,
    }

    fn fixture() -> Fixture {
        let outreach = Arc::new(InMemoryOutreachRepository::new());
        let users = Arc::new(InMemoryUserDirectory::new());
        let papers = Arc::new(InMemoryPaperCatalog::new());
        let email = Arc::new(RecordingEmailSender::new());
        let tokens = Arc::new(RegistrationTokenCodec::with_default_ttl(SECRET));
        let dispatcher = Arc::new(InvitationDispatcher::new(
            outreach.clone(),
            users.clone(),
            papers.clone(),
            email.clone(),
            tokens.clone(),
            "https://app.example.com/",
        ));
        Fixture {
            outreach,
            users,
            papers,
            email,
            tokens,
            dispatcher,
        }
    }

    async fn stored_request(f: &Fixture) -> OutreachRequest {
        let user_id = f.users.add_user("asker@example.com", Some("Ada Asker")).await;
        let paper_id = f.papers.add_paper("On Sparse Attention").await;
        let request = OutreachRequest::new(user_id, "Expert@Example.com", Some(paper_id)).unwrap();
        f.outreach.save(&request).await.unwrap();
        request
    }

    #[tokio::test]
    async fn delivered_invitation_moves_request_to_pending() {
        let f = fixture();
        let request = stored_request(&f).await;

        f.dispatcher.dispatch(request.id()).await.unwrap();

        let stored = f.outreach.find_by_id(&request.id()).await.unwrap().unwrap();
        assert_eq!(stored.status(), OutreachStatus::Pending);

        let sent = f.email.sent_to("expert@example.com");
        assert_eq!(sent.len(), 1);
        assert!(sent[0].html.contains("On Sparse Attention"));
        assert!(sent[0].html.contains("Ada Asker"));
    }

    #[tokio::test]
    async fn invitation_link_carries_verifiable_token() {
        let f = fixture();
        let request = stored_request(&f).await;

        f.dispatcher.dispatch(request.id()).await.unwrap();

        let html = &f.email.sent()[0].html;
        let marker = "https://app.example.com/researcher/register?token=";
        let start = html.find(marker).unwrap() + marker.len();
        let token: String = html[start..]
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            .collect();
        let claims = f.tokens.verify(&token).unwrap();
        assert_eq!(claims.email, "expert@example.com");
        assert_eq!(claims.outreach_id, request.id());
    }

    #[tokio::test]
    async fn failed_delivery_marks_request_and_retries() {
        let f = fixture();
        f.email.set_failing(true);
        let request = stored_request(&f).await;

        let err = f.dispatcher.dispatch(request.id()).await.unwrap_err();

        assert!(err.retryable);
        let stored = f.outreach.find_by_id(&request.id()).await.unwrap().unwrap();
        assert_eq!(stored.status(), OutreachStatus::EmailFailed);
    }

    #[tokio::test]
    async fn dispatch_skips_requests_already_delivered() {
        let f = fixture();
        let request = stored_request(&f).await;

        f.dispatcher.dispatch(request.id()).await.unwrap();
        f.dispatcher.dispatch(request.id()).await.unwrap();

        assert_eq!(f.email.sent().len(), 1);
    }

    #[tokio::test]
    async fn missing_request_is_permanent() {
        let f = fixture();
        let err = f.dispatcher.dispatch(OutreachRequestId::new()).await.unwrap_err();
        assert!(!err.retryable);
    }

    #[tokio::test]
    async fn exhausted_dispatch_can_be_resubmitted() {
        let f = fixture();
        let request = stored_request(&f).await;
        let runner = TokioTaskRunner::new(
            TaskRunnerConfig::default()
                .with_retry_backoff(Duration::ZERO)
                .with_max_attempts(3),
        );

        f.email.set_failing(true);
        f.dispatcher.submit(&runner, request.id());
        runner.wait_idle().await;
        assert_eq!(runner.failures()[0].attempts, 3);

        f.email.set_failing(false);
        f.dispatcher.submit(&runner, request.id());
        runner.wait_idle().await;

        let stored = f.outreach.find_by_id(&request.id()).await.unwrap().unwrap();
        assert_eq!(stored.status(), OutreachStatus::Pending);
        assert_eq!(f.email.sent().len(), 1);
    }

    /// Accepts the request through registration while the email is in flight.
    struct RegistersDuringSend {
        outreach: Arc<InMemoryOutreachRepository>,
        id: OutreachRequestId,
    }

    #[async_trait::async_trait]
    impl EmailSender for RegistersDuringSend {
        async fn send(&self, _message: EmailMessage) -> Result<(), crate::ports::EmailError> {
            let mut request = self.outreach.find_by_id(&self.id).await.unwrap().unwrap();
            let expected = request.status();
            request.accept_by_registration().unwrap();
            assert!(self.outreach.update_if_status(&request, expected).await.unwrap());
            Ok(())
        }
    }

    #[tokio::test]
    async fn delivery_outcome_does_not_overwrite_a_registration() {
        let f = fixture();
        let request = stored_request(&f).await;
        let dispatcher = InvitationDispatcher::new(
            f.outreach.clone(),
            f.users.clone(),
            f.papers.clone(),
            Arc::new(RegistersDuringSend {
                outreach: f.outreach.clone(),
                id: request.id(),
            }),
            f.tokens.clone(),
            "https://app.example.com",
        );

        dispatcher.dispatch(request.id()).await.unwrap();

        let stored = f.outreach.find_by_id(&request.id()).await.unwrap().unwrap();
        assert_eq!(stored.status(), OutreachStatus::Accepted);
    }
}
