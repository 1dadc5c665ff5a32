//! Read-only access to ingested papers.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DomainError, PaperId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperSummary {
    pub id: PaperId,
    pub title: String,
}

#[async_trait]
pub trait PaperCatalog: Send + Sync {
    async fn find_summary(&self, paper_id: &PaperId) -> Result<Option<PaperSummary>, DomainError>;
}
