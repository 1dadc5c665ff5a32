//! RegisterResearcherHandler - Researcher self-registration through an invitation token.
//!
//! The token is the only proof that the caller controls the invited
//! address, so it is verified before anything is read or written.

use std::sync::Arc;

use crate::application::services::Notifier;
use crate::domain::foundation::{StateMachine, UserId};
use crate::domain::outreach::{OutreachError, OutreachRequest, OutreachStatus, RegistrationTokenCodec};
use crate::domain::researcher::{Researcher, ResearcherProfile};
use crate::ports::{OutreachRepository, ResearcherRepository};

/// Command to register (or update) a researcher from an invitation.
#[derive(Debug, Clone)]
pub struct RegisterResearcherCommand {
    pub token: String,
    pub profile: ResearcherProfile,
    /// Platform account to link, when the researcher is signed in.
    pub user_id: Option<UserId>,
}

/// Result of a successful registration.
#[derive(Debug, Clone)]
pub struct RegisterResearcherResult {
    pub researcher: Researcher,
    pub outreach_request: OutreachRequest,
}

pub struct RegisterResearcherHandler {
    outreach: Arc<dyn OutreachRepository>,
    researchers: Arc<dyn ResearcherRepository>,
    tokens: Arc<RegistrationTokenCodec>,
    notifier: Notifier,
}

impl RegisterResearcherHandler {
    pub fn new(
        outreach: Arc<dyn OutreachRepository>,
        researchers: Arc<dyn ResearcherRepository>,
        tokens: Arc<RegistrationTokenCodec>,
        notifier: Notifier,
    ) -> Self {
        Self {
            outreach,
            researchers,
            tokens,
            notifier,
        }
    }

    pub async fn handle(
        &self,
        cmd: RegisterResearcherCommand,
    ) -> Result<RegisterResearcherResult, OutreachError> {
        let claims = self.tokens.verify(&cmd.token)?;

        cmd.profile
            .validate()
            .map_err(|e| OutreachError::validation(e.field(), e.to_string()))?;
        if !cmd.profile.email_matches(&claims.email) {
            tracing::warn!(outreach_id = %claims.outreach_id, "Registration email does not match invitation");
            return Err(OutreachError::EmailMismatch);
        }

        let mut request = self
            .outreach
            .find_by_id(&claims.outreach_id)
            .await?
            .ok_or_else(|| OutreachError::not_found(claims.outreach_id))?;

        let read_status = request.status();
        if read_status != OutreachStatus::Accepted
            && !read_status.can_transition_to(&OutreachStatus::Accepted)
        {
            return Err(OutreachError::invalid_state(
                read_status.as_str(),
                OutreachStatus::Accepted.as_str(),
            ));
        }

        let researcher = self
            .researchers
            .upsert_by_email(cmd.profile, cmd.user_id)
            .await?;

        if request.accept_by_registration()? {
            if self.outreach.update_if_status(&request, read_status).await? {
                self.notifier.outreach_accepted(&request);
            } else {
                request = self.settle_concurrent_write(&request).await?;
            }
        }

        tracing::info!(
            researcher_id = %researcher.id,
            outreach_id = %request.id(),
            "Researcher registered from invitation"
        );

        Ok(RegisterResearcherResult {
            researcher,
            outreach_request: request,
        })
    }

    /// Another writer changed the request between our read and write.
    ///
    /// Someone else accepting is fine; anything else is retried once, and a
    /// declined request stays declined.
    async fn settle_concurrent_write(
        &self,
        request: &OutreachRequest,
    ) -> Result<OutreachRequest, OutreachError> {
        let mut current = self
            .outreach
            .find_by_id(&request.id())
            .await?
            .ok_or_else(|| OutreachError::not_found(request.id()))?;
        let read_status = current.status();
        if !current.accept_by_registration()? {
            return Ok(current);
        }
        if !self.outreach.update_if_status(&current, read_status).await? {
            tracing::warn!(outreach_id = %current.id(), "Outreach kept changing during registration");
            return Err(OutreachError::invalid_state(
                read_status.as_str(),
                OutreachStatus::Accepted.as_str(),
            ));
        }
        self.notifier.outreach_accepted(&current);
        Ok(current)
    }
}
