//! RequestOutreachHandler - Command handler for inviting a researcher.

use std::sync::Arc;

use crate::application::services::InvitationDispatcher;
use crate::domain::foundation::{PaperId, UserId};
use crate::domain::outreach::{OutreachError, OutreachRequest};
use crate::ports::{OutreachRepository, TaskRunner};

/// Command to invite a researcher on behalf of a user.
#[derive(Debug, Clone)]
pub struct RequestOutreachCommand {
    pub user_id: UserId,
    pub researcher_email: String,
    pub paper_id: Option<PaperId>,
}

/// Handler for new outreach requests.
///
/// The request is persisted in `created` status and returned right away;
/// the invitation email goes out on the task runner.
pub struct RequestOutreachHandler {
    repository: Arc<dyn OutreachRepository>,
    dispatcher: Arc<InvitationDispatcher>,
    tasks: Arc<dyn TaskRunner>,
}

impl RequestOutreachHandler {
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

    pub async fn handle(&self, cmd: RequestOutreachCommand) -> Result<OutreachRequest, OutreachError> {
        let request = OutreachRequest::new(cmd.user_id, &cmd.researcher_email, cmd.paper_id)
            .map_err(|e| OutreachError::validation(e.field(), e.to_string()))?;

        self.repository.save(&request).await?;
        tracing::info!(
            outreach_id = %request.id(),
            user_id = %request.user_id(),
            "Outreach request created"
        );

        self.dispatcher.submit(&*self.tasks, request.id());

        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::test_support::Harness;
    use crate::domain::outreach::OutreachStatus;

    #[tokio::test]
    async fn returns_created_request_before_delivery() {
        let h = Harness::new();
        let user_id = h.users.add_user("asker@example.com", None).await;

        let request = h
            .request_outreach()
            .handle(RequestOutreachCommand {
                user_id,
                researcher_email: "r@example.com".into(),
                paper_id: None,
            })
            .await
            .unwrap();

        assert_eq!(request.status(), OutreachStatus::Created);
        assert!(h.outreach.find_by_id(&request.id()).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn invitation_progresses_request_to_pending() {
        let h = Harness::new();
        let user_id = h.users.add_user("asker@example.com", None).await;
        let paper_id = h.papers.add_paper("Graph Kernels").await;

        let request = h
            .request_outreach()
            .handle(RequestOutreachCommand {
                user_id,
                researcher_email: "r@example.com".into(),
                paper_id: Some(paper_id),
            })
            .await
            .unwrap();
        h.tasks.wait_idle().await;

        let stored = h.outreach.find_by_id(&request.id()).await.unwrap().unwrap();
        assert_eq!(stored.status(), OutreachStatus::Pending);
        assert_eq!(h.email.sent_to("r@example.com").len(), 1);
    }

    #[tokio::test]
    async fn failed_delivery_leaves_request_email_failed() {
        let h = Harness::new();
        h.email.set_failing(true);
        let user_id = h.users.add_user("asker@example.com", None).await;

        let request = h
            .request_outreach()
            .handle(RequestOutreachCommand {
                user_id,
                researcher_email: "r@example.com".into(),
                paper_id: None,
            })
            .await
            .unwrap();
        h.tasks.wait_idle().await;

        let stored = h.outreach.find_by_id(&request.id()).await.unwrap().unwrap();
        assert_eq!(stored.status(), OutreachStatus::EmailFailed);
        assert_eq!(h.tasks.failures().len(), 1);
    }

    #[tokio::test]
    async fn rejects_malformed_email() {
        let h = Harness::new();
        let err = h
            .request_outreach()
            .handle(RequestOutreachCommand {
                user_id: UserId::new(),
                researcher_email: "not-an-email".into(),
                paper_id: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, OutreachError::ValidationFailed { .. }));
    }
}
