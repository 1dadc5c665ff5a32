//! In-memory researcher repository.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ResearcherId, UserId};
use crate::domain::researcher::{normalize_email, Researcher, ResearcherProfile};
use crate::ports::ResearcherRepository;

/// Researchers keyed by id; email uniqueness is enforced under the write lock.
#[derive(Default)]
pub struct InMemoryResearcherRepository {
    researchers: RwLock<HashMap<ResearcherId, Researcher>>,
}

impl InMemoryResearcherRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a researcher as-is.
    pub async fn insert(&self, researcher: Researcher) {
        self.researchers
            .write()
            .await
            .insert(researcher.id, researcher);
    }

    pub async fn count(&self) -> usize {
        self.researchers.read().await.len()
    }
}

#[async_trait]
impl ResearcherRepository for InMemoryResearcherRepository {
    async fn find_by_id(&self, id: &ResearcherId) -> Result<Option<Researcher>, DomainError> {
        Ok(self.researchers.read().await.get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Researcher>, DomainError> {
        let email = normalize_email(email);
        Ok(self
            .researchers
            .read()
            .await
            .values()
            .find(|r| r.email == email)
            .cloned())
    }

    async fn upsert_by_email(
        &self,
        profile: ResearcherProfile,
        user_id: Option<UserId>,
    ) -> Result<Researcher, DomainError> {
        let email = normalize_email(&profile.email);
        let mut researchers = self.researchers.write().await;

        if let Some(existing) = researchers.values_mut().find(|r| r.email == email) {
            existing.apply_profile(profile, user_id);
            return Ok(existing.clone());
        }

        let researcher = Researcher::from_profile(profile, user_id);
        researchers.insert(researcher.id, researcher.clone());
        Ok(researcher)
    }
}
