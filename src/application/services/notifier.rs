//! Best-effort notifications.
//!
//! Every message is its own background task so a failed delivery retries
//! alone and never touches the state change that triggered it.

use std::sync::Arc;

use crate::domain::foundation::UserId;
use crate::domain::outreach::OutreachRequest;
use crate::domain::session::ConsultationSession;
use crate::domain::subscription::Subscription;
use crate::ports::{
    BackgroundTask, EmailMessage, EmailSender, ResearcherRepository, TaskError, TaskRunner,
    UserDirectory,
};

use super::templates::{self, SessionNotice};

#[derive(Clone)]
pub struct Notifier {
    users: Arc<dyn UserDirectory>,
    researchers: Arc<dyn ResearcherRepository>,
    email: Arc<dyn EmailSender>,
    tasks: Arc<dyn TaskRunner>,
}

impl Notifier {
    pub fn new(
        users: Arc<dyn UserDirectory>,
        researchers: Arc<dyn ResearcherRepository>,
        email: Arc<dyn EmailSender>,
        tasks: Arc<dyn TaskRunner>,
    ) -> Self {
        Self {
            users,
            researchers,
            email,
            tasks,
        }
    }

    /// Tells the requesting user that the researcher accepted.
    pub fn outreach_accepted(&self, request: &OutreachRequest) {
        let (subject, html) = templates::outreach_accepted(request.researcher_email());
        self.submit(
            "notify_outreach_accepted",
            request.user_id(),
            move || (subject.clone(), html.clone()),
        );
    }

    /// Tells both participants about a session change.
    pub fn session(&self, session: &ConsultationSession, notice: SessionNotice) {
        let start = session.start_time();
        let link = session.meeting_link().map(str::to_string);
        let user_id = session.user_id();
        let researcher_id = session.researcher_id();

        let researchers = self.researchers.clone();
        let users = self.users.clone();

        // The user hears about the researcher and vice versa.
        let to_user = {
            let link = link.clone();
            let task_name = format!("notify_session_{}_user", notice.as_str());
            let email = self.email.clone();
            BackgroundTask::new(task_name, move || {
                let (users, researchers, email, link) =
                    (users.clone(), researchers.clone(), email.clone(), link.clone());
                async move {
                    let contact = find_user(&*users, user_id).await?;
                    let counterpart = researchers
                        .find_by_id(&researcher_id)
                        .await
                        .map_err(|e| TaskError::retryable(e.to_string()))?
                        .map(|r| r.name)
                        .unwrap_or_else(|| "your researcher".to_string());
                    let (subject, html) = templates::session_notice(
                        notice,
                        contact.display_name(),
                        &counterpart,
                        start,
                        link.as_deref(),
                    );
                    deliver(&*email, EmailMessage::new(contact.email.clone(), subject, html)).await
                }
            })
        };

        let to_researcher = {
            let users = self.users.clone();
            let researchers = self.researchers.clone();
            let email = self.email.clone();
            let task_name = format!("notify_session_{}_researcher", notice.as_str());
            BackgroundTask::new(task_name, move || {
                let (users, researchers, email, link) =
                    (users.clone(), researchers.clone(), email.clone(), link.clone());
                async move {
                    let researcher = researchers
                        .find_by_id(&researcher_id)
                        .await
                        .map_err(|e| TaskError::retryable(e.to_string()))?
                        .ok_or_else(|| {
                            TaskError::permanent(format!("researcher {} not found", researcher_id))
                        })?;
                    let counterpart = users
                        .find_contact(&user_id)
                        .await
                        .map_err(|e| TaskError::retryable(e.to_string()))?
                        .map(|c| c.display_name().to_string())
                        .unwrap_or_else(|| "a platform user".to_string());
                    let (subject, html) = templates::session_notice(
                        notice,
                        &researcher.name,
                        &counterpart,
                        start,
                        link.as_deref(),
                    );
                    deliver(&*email, EmailMessage::new(researcher.email.clone(), subject, html)).await
                }
            })
        };

        self.tasks.submit(to_user);
        self.tasks.submit(to_researcher);
    }

    /// Confirms a new subscription to its owner.
    pub fn subscription_confirmed(&self, subscription: &Subscription) {
        let (subject, html) =
            templates::subscription_confirmed(subscription.end_date, subscription.price_cents);
        self.submit(
            "notify_subscription_confirmed",
            subscription.user_id,
            move || (subject.clone(), html.clone()),
        );
    }

    fn submit<F>(&self, task_name: &str, user_id: UserId, render: F)
    where
        F: Fn() -> (String, String) + Send + Sync + 'static,
    {
        let users = self.users.clone();
        let email = self.email.clone();
        let render = Arc::new(render);

        self.tasks.submit(BackgroundTask::new(task_name, move || {
            let (users, email, render) = (users.clone(), email.clone(), render.clone());
            async move {
                let contact = find_user(&*users, user_id).await?;
                let (subject, html) = render();
                deliver(&*email, EmailMessage::new(contact.email, subject, html)).await
            }
        }));
    }
}

async fn find_user(
    users: &dyn UserDirectory,
    user_id: UserId,
) -> Result<crate::ports::UserContact, TaskError> {
    users
        .find_contact(&user_id)
        .await
        .map_err(|e| TaskError::retryable(e.to_string()))?
        .ok_or_else(|| TaskError::permanent(format!("user {} not found", user_id)))
}

async fn deliver(email: &dyn EmailSender, message: EmailMessage) -> Result<(), TaskError> {
    let to = message.to.clone();
    email.send(message).await.map_err(|e| {
        tracing::warn!(to = %to, error = %e, "Notification delivery failed");
        TaskError::retryable(e.to_string())
    })
}
