//! ListSessionsHandler - Sessions of a user or of a researcher.

use std::sync::Arc;

use crate::domain::foundation::{Actor, ResearcherId, UserId};
use crate::domain::session::{ConsultationSession, SessionError};
use crate::ports::{ResearcherRepository, SessionRepository};

/// Whose sessions to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOwner {
    User(UserId),
    Researcher(ResearcherId),
}

#[derive(Debug, Clone)]
pub struct ListSessionsQuery {
    pub owner: SessionOwner,
    pub actor: Actor,
}

pub struct ListSessionsHandler {
    sessions: Arc<dyn SessionRepository>,
    researchers: Arc<dyn ResearcherRepository>,
}

impl ListSessionsHandler {
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        researchers: Arc<dyn ResearcherRepository>,
    ) -> Self {
        Self {
            sessions,
            researchers,
        }
    }

    /// Sessions ordered by start time.
    pub async fn handle(&self, query: ListSessionsQuery) -> Result<Vec<ConsultationSession>, SessionError> {
        match query.owner {
            SessionOwner::User(user_id) => {
                if !query.actor.is_or_admin(&user_id) {
                    return Err(SessionError::forbidden());
                }
                Ok(self.sessions.find_by_user_id(&user_id).await?)
            }
            SessionOwner::Researcher(researcher_id) => {
                if !query.actor.is_admin() {
                    let researcher = self
                        .researchers
                        .find_by_id(&researcher_id)
                        .await?
                        .ok_or(SessionError::ResearcherNotFound(researcher_id))?;
                    if !researcher.is_linked_to(&query.actor.user_id) {
                        return Err(SessionError::forbidden());
                    }
                }
                Ok(self.sessions.find_by_researcher_id(&researcher_id).await?)
            }
        }
    }
}
