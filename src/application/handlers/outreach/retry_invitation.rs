//! RetryInvitationHandler - Re-sends an invitation that never went out.

use std::sync::Arc;

use crate::application::services::InvitationDispatcher;
use crate::domain::foundation::{Actor, OutreachRequestId};
use crate::domain::outreach::{OutreachError, OutreachRequest, OutreachStatus};
use crate::ports::{OutreachRepository, TaskRunner};

#[derive(Debug, Clone)]
pub struct RetryInvitationCommand {
    pub outreach_id: OutreachRequestId,
    pub actor: Actor,
}

pub struct RetryInvitationHandler {
    repository: Arc<dyn OutreachRepository>,
    dispatcher: Arc<InvitationDispatcher>,
    tasks: Arc<dyn TaskRunner>,
}

impl RetryInvitationHandler {
    pub fn new(
        repository: Arc<dyn OutreachRepository>,
        dispatcher: Arc<InvitationDispatcher>,
        tasks: Arc<dyn TaskRunner>,
    ) -> Self {
        Self {
            repository,
            dispatcher,
            tasks,
        }
    }

    /// Queues another delivery for a request in `created` or `email_failed`.
    pub async fn handle(&self, cmd: RetryInvitationCommand) -> Result<OutreachRequest, OutreachError> {
        let request = self
            .repository
            .find_by_id(&cmd.outreach_id)
            .await?
            .ok_or_else(|| OutreachError::not_found(cmd.outreach_id))?;

        if !cmd.actor.is_or_admin(&request.user_id()) {
            return Err(OutreachError::forbidden());
        }
        if !request.status().can_dispatch() {
            return Err(OutreachError::invalid_state(
                request.status().as_str(),
                OutreachStatus::EmailSent.as_str(),
            ));
        }

        tracing::info!(outreach_id = %request.id(), status = %request.status(), "Retrying invitation");
        self.dispatcher.submit(&*self.tasks, request.id());
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::test_support::Harness;

    #[tokio::test]
    async fn failed_invitation_is_delivered_on_retry() {
        let h = Harness::new();
        let user_id = h.users.add_user("asker@example.com", None).await;
        let request = OutreachRequest::new(user_id, "r@example.com", None).unwrap();
        h.outreach.save(&request).await.unwrap();
        h.email.set_failing(true);
        let _ = h.dispatcher.dispatch(request.id()).await;
        h.email.set_failing(false);

        h.retry_invitation()
            .handle(RetryInvitationCommand {
                outreach_id: request.id(),
                actor: Actor::user(user_id),
            })
            .await
            .unwrap();
        h.tasks.wait_idle().await;

        let stored = h.outreach.find_by_id(&request.id()).await.unwrap().unwrap();
        assert_eq!(stored.status(), OutreachStatus::Pending);
    }

    #[tokio::test]
    async fn other_users_cannot_retry() {
        let h = Harness::new();
        let user_id = h.users.add_user("asker@example.com", None).await;
        let request = OutreachRequest::new(user_id, "r@example.com", None).unwrap();
        h.outreach.save(&request).await.unwrap();

        let err = h
            .retry_invitation()
            .handle(RetryInvitationCommand {
                outreach_id: request.id(),
                actor: Actor::user(crate::domain::foundation::UserId::new()),
            })
            .await
            .unwrap_err();

        assert_eq!(err, OutreachError::Forbidden);
    }

    #[tokio::test]
    async fn delivered_invitation_cannot_be_retried() {
        let h = Harness::new();
        let request = h.pending_request("asker@example.com", "r@example.com").await;

        let err = h
            .retry_invitation()
            .handle(RetryInvitationCommand {
                outreach_id: request.id(),
                actor: Actor::admin(crate::domain::foundation::UserId::new()),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, OutreachError::InvalidState { .. }));
    }
}
