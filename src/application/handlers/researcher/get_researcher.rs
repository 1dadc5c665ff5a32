//! GetResearcherHandler - Query handler for a researcher profile.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, ResearcherId};
use crate::domain::researcher::Researcher;
use crate::ports::ResearcherRepository;

#[derive(Debug, Clone, Copy)]
pub struct GetResearcherQuery {
    pub researcher_id: ResearcherId,
}

pub struct GetResearcherHandler {
    researchers: Arc<dyn ResearcherRepository>,
}

impl GetResearcherHandler {
    pub fn new(researchers: Arc<dyn ResearcherRepository>) -> Self {
        Self { researchers }
    }

    pub async fn handle(&self, query: GetResearcherQuery) -> Result<Option<Researcher>, DomainError> {
        self.researchers.find_by_id(&query.researcher_id).await
    }
}
