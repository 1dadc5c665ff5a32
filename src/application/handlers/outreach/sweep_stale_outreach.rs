//! SweepStaleOutreachHandler - Recovers requests stuck in `created`.
//!
//! A request is created before its invitation is queued, so a crash in
//! between leaves it in `created` forever. The sweep re-dispatches those
//! older than a threshold; dispatch is idempotent, so overlapping with a
//! late original delivery is harmless.

use std::sync::Arc;

use chrono::Duration;

use crate::application::services::InvitationDispatcher;
use crate::domain::foundation::Timestamp;
use crate::domain::outreach::{OutreachError, OutreachStatus};
use crate::ports::{OutreachRepository, TaskRunner};

#[derive(Debug, Clone, Copy)]
pub struct SweepStaleOutreachCommand {
    pub older_than: Duration,
}

pub struct SweepStaleOutreachHandler {
    repository: Arc<dyn OutreachRepository>,
    dispatcher: Arc<InvitationDispatcher>,
    tasks: Arc<dyn TaskRunner>,
}

impl SweepStaleOutreachHandler {
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

    /// Returns how many requests were re-dispatched.
    pub async fn handle(&self, cmd: SweepStaleOutreachCommand) -> Result<usize, OutreachError> {
        let cutoff = Timestamp::now().add(-cmd.older_than);
        let stale = self
            .repository
            .find_by_status_created_before(OutreachStatus::Created, cutoff)
            .await?;

        for request in &stale {
            self.dispatcher.submit(&*self.tasks, request.id());
        }

        if !stale.is_empty() {
            tracing::info!(count = stale.len(), "Re-dispatched stale outreach requests");
        }
        Ok(stale.len())
    }
}
