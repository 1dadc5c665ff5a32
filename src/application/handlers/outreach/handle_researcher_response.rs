//! HandleResearcherResponseHandler - Command handler for accept/decline answers.

use std::sync::Arc;

use crate::application::services::Notifier;
use crate::domain::foundation::OutreachRequestId;
use crate::domain::outreach::{OutreachError, OutreachRequest, OutreachResponse};
use crate::ports::OutreachRepository;

/// Command carrying the researcher's raw answer.
#[derive(Debug, Clone)]
pub struct HandleResearcherResponseCommand {
    pub outreach_id: OutreachRequestId,
    pub response: String,
}

/// Handler for researcher answers to an invitation.
pub struct HandleResearcherResponseHandler {
    repository: Arc<dyn OutreachRepository>,
    notifier: Notifier,
}

impl HandleResearcherResponseHandler {
    pub fn new(repository: Arc<dyn OutreachRepository>, notifier: Notifier) -> Self {
        Self {
            repository,
            notifier,
        }
    }

    pub async fn handle(
        &self,
        cmd: HandleResearcherResponseCommand,
    ) -> Result<OutreachRequest, OutreachError> {
        let mut request = self
            .repository
            .find_by_id(&cmd.outreach_id)
            .await?
            .ok_or_else(|| OutreachError::not_found(cmd.outreach_id))?;

        let response = OutreachResponse::parse(&cmd.response)
            .ok_or_else(|| OutreachError::invalid_response(cmd.response.clone()))?;

        let read_status = request.status();
        let changed = request.respond(response)?;
        if !changed {
            return Ok(request);
        }

        if !self.repository.update_if_status(&request, read_status).await? {
            tracing::warn!(outreach_id = %request.id(), "Outreach answered concurrently");
            return Err(OutreachError::invalid_state(
                read_status.as_str(),
                request.status().as_str(),
            ));
        }
        tracing::info!(
            outreach_id = %request.id(),
            status = %request.status(),
            "Researcher responded to outreach"
        );

        if response == OutreachResponse::Accept {
            self.notifier.outreach_accepted(&request);
        }

        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::test_support::Harness;
    use crate::domain::outreach::OutreachStatus;

    fn cmd(id: OutreachRequestId, response: &str) -> HandleResearcherResponseCommand {
        HandleResearcherResponseCommand {
            outreach_id: id,
            response: response.into(),
        }
    }

    #[tokio::test]
    async fn accept_notifies_requesting_user() {
        let h = Harness::new();
        let request = h.pending_request("asker@example.com", "r@example.com").await;

        let updated = h
            .handle_response()
            .handle(cmd(request.id(), "accept"))
            .await
            .unwrap();
        h.tasks.wait_idle().await;

        assert_eq!(updated.status(), OutreachStatus::Accepted);
        assert_eq!(h.email.sent_to("asker@example.com").len(), 1);
    }

    #[tokio::test]
    async fn decline_sends_nothing() {
        let h = Harness::new();
        let request = h.pending_request("asker@example.com", "r@example.com").await;

        let updated = h
            .handle_response()
            .handle(cmd(request.id(), "DECLINE"))
            .await
            .unwrap();
        h.tasks.wait_idle().await;

        assert_eq!(updated.status(), OutreachStatus::Declined);
        assert!(h.email.sent_to("asker@example.com").is_empty());
    }

    #[tokio::test]
    async fn repeated_accept_notifies_once() {
        let h = Harness::new();
        let request = h.pending_request("asker@example.com", "r@example.com").await;
        let handler = h.handle_response();

        handler.handle(cmd(request.id(), "accept")).await.unwrap();
        handler.handle(cmd(request.id(), "accept")).await.unwrap();
        h.tasks.wait_idle().await;

        assert_eq!(h.email.sent_to("asker@example.com").len(), 1);
    }

    #[tokio::test]
    async fn unknown_request_is_not_found() {
        let h = Harness::new();
        let id = OutreachRequestId::new();
        let err = h.handle_response().handle(cmd(id, "accept")).await.unwrap_err();
        assert_eq!(err, OutreachError::NotFound(id));
    }

    #[tokio::test]
    async fn unknown_answer_is_rejected() {
        let h = Harness::new();
        let request = h.pending_request("asker@example.com", "r@example.com").await;

        let err = h
            .handle_response()
            .handle(cmd(request.id(), "maybe"))
            .await
            .unwrap_err();

        assert_eq!(err, OutreachError::InvalidResponse("maybe".into()));
    }

    #[tokio::test]
    async fn answer_before_delivery_is_invalid_state() {
        let h = Harness::new();
        let user_id = h.users.add_user("asker@example.com", None).await;
        let request = OutreachRequest::new(user_id, "r@example.com", None).unwrap();
        h.outreach.save(&request).await.unwrap();

        let err = h
            .handle_response()
            .handle(cmd(request.id(), "accept"))
            .await
            .unwrap_err();

        assert!(matches!(err, OutreachError::InvalidState { .. }));
    }

    #[tokio::test]
    async fn answer_racing_another_answer_is_refused() {
        let h = Harness::new();
        let request = h.pending_request("asker@example.com", "r@example.com").await;

        let mut declined = request.clone();
        declined.respond(OutreachResponse::Decline).unwrap();
        assert!(h
            .outreach
            .update_if_status(&declined, OutreachStatus::Pending)
            .await
            .unwrap());

        // The accept below was read before the decline landed.
        let mut stale = request.clone();
        stale.respond(OutreachResponse::Accept).unwrap();
        assert!(!h
            .outreach
            .update_if_status(&stale, OutreachStatus::Pending)
            .await
            .unwrap());

        let err = h
            .handle_response()
            .handle(cmd(request.id(), "accept"))
            .await
            .unwrap_err();
        h.tasks.wait_idle().await;

        assert!(matches!(err, OutreachError::InvalidState { .. }));
        let stored = h.outreach.find_by_id(&request.id()).await.unwrap().unwrap();
        assert_eq!(stored.status(), OutreachStatus::Declined);
        assert!(h.email.sent_to("asker@example.com").is_empty());
    }
}
