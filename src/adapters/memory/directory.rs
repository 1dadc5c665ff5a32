//! In-memory user directory and paper catalog.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, PaperId, UserId};
use crate::ports::{PaperCatalog, PaperSummary, UserContact, UserDirectory};

#[derive(Default)]
pub struct InMemoryUserDirectory {
    users: RwLock<HashMap<UserId, UserContact>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a user and returns its id.
    pub async fn add_user(&self, email: &str, full_name: Option<&str>) -> UserId {
        let contact = UserContact {
            id: UserId::new(),
            email: email.to_string(),
            full_name: full_name.map(str::to_string),
        };
        let id = contact.id;
        self.users.write().await.insert(id, contact);
        id
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_contact(&self, user_id: &UserId) -> Result<Option<UserContact>, DomainError> {
        Ok(self.users.read().await.get(user_id).cloned())
    }
}

#[derive(Default)]
pub struct InMemoryPaperCatalog {
    papers: RwLock<HashMap<PaperId, PaperSummary>>,
}

impl InMemoryPaperCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_paper(&self, title: &str) -> PaperId {
        let id = PaperId::new();
        self.papers.write().await.insert(
            id,
            PaperSummary {
                id,
                title: title.to_string(),
            },
        );
        id
    }
}

#[async_trait]
impl PaperCatalog for InMemoryPaperCatalog {
    async fn find_summary(&self, paper_id: &PaperId) -> Result<Option<PaperSummary>, DomainError> {
        Ok(self.papers.read().await.get(paper_id).cloned())
    }
}
