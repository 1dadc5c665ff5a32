//! In-memory subscription repository.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::subscription::Subscription;
use crate::ports::SubscriptionRepository;

#[derive(Default)]
pub struct InMemorySubscriptionRepository {
    rows: RwLock<Vec<Subscription>>,
}

impl InMemorySubscriptionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn count_for_user(&self, user_id: &UserId) -> usize {
        self.rows
            .read()
            .await
            .iter()
            .filter(|s| s.user_id == *user_id)
            .count()
    }
}

#[async_trait]
impl SubscriptionRepository for InMemorySubscriptionRepository {
    async fn save(&self, subscription: &Subscription) -> Result<(), DomainError> {
        self.rows.write().await.push(subscription.clone());
        Ok(())
    }

    async fn find_latest_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<Subscription>, DomainError> {
        Ok(self
            .rows
            .read()
            .await
            .iter()
            .filter(|s| s.user_id == *user_id)
            .max_by_key(|s| (s.start_date, s.created_at))
            .cloned())
    }
}
