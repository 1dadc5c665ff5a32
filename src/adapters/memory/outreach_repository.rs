//! In-memory outreach repository.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, OutreachRequestId, Timestamp};
use crate::domain::outreach::{OutreachRequest, OutreachStatus};
use crate::ports::OutreachRepository;

#[derive(Default)]
pub struct InMemoryOutreachRepository {
    requests: RwLock<HashMap<OutreachRequestId, OutreachRequest>>,
}

impl InMemoryOutreachRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OutreachRepository for InMemoryOutreachRepository {
    async fn save(&self, request: &OutreachRequest) -> Result<(), DomainError> {
        self.requests
            .write()
            .await
            .insert(request.id(), request.clone());
        Ok(())
    }

    async fn update_if_status(
        &self,
        request: &OutreachRequest,
        expected: OutreachStatus,
    ) -> Result<bool, DomainError> {
        let mut requests = self.requests.write().await;
        match requests.get_mut(&request.id()) {
            Some(stored) if stored.status() == expected => {
                *stored = request.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn find_by_id(
        &self,
        id: &OutreachRequestId,
    ) -> Result<Option<OutreachRequest>, DomainError> {
        Ok(self.requests.read().await.get(id).cloned())
    }

    async fn find_by_status_created_before(
        &self,
        status: OutreachStatus,
        created_before: Timestamp,
    ) -> Result<Vec<OutreachRequest>, DomainError> {
        let mut found: Vec<OutreachRequest> = self
            .requests
            .read()
            .await
            .values()
            .filter(|r| r.status() == status && r.created_at().is_before(&created_before))
            .cloned()
            .collect();
        found.sort_by_key(|r| r.created_at());
        Ok(found)
    }
}
