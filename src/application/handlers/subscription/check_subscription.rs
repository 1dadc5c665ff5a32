//! CheckSubscriptionHandler - Does a user currently have access?

use std::sync::Arc;

use serde::Serialize;

use crate::domain::foundation::{Actor, Timestamp, UserId};
use crate::domain::subscription::{Subscription, SubscriptionError};
use crate::ports::SubscriptionRepository;

#[derive(Debug, Clone)]
pub struct CheckSubscriptionQuery {
    pub user_id: UserId,
    pub actor: Actor,
}

/// Access decision plus the subscription it was based on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubscriptionAccess {
    pub active: bool,
    pub subscription: Option<Subscription>,
}

pub struct CheckSubscriptionHandler {
    subscriptions: Arc<dyn SubscriptionRepository>,
}

impl CheckSubscriptionHandler {
    pub fn new(subscriptions: Arc<dyn SubscriptionRepository>) -> Self {
        Self { subscriptions }
    }

    /// The latest subscription decides; older rows are ignored.
    pub async fn handle(
        &self,
        query: CheckSubscriptionQuery,
    ) -> Result<SubscriptionAccess, SubscriptionError> {
        if !query.actor.is_or_admin(&query.user_id) {
            return Err(SubscriptionError::Forbidden);
        }

        let latest = self.subscriptions.find_latest_for_user(&query.user_id).await?;
        let now = Timestamp::now();
        Ok(SubscriptionAccess {
            active: latest.as_ref().is_some_and(|s| s.grants_access_at(now)),
            subscription: latest,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::test_support::Harness;
    use crate::domain::foundation::SubscriptionId;
    use crate::domain::subscription::SubscriptionStatus;

    fn subscription(user_id: UserId, start_days_ago: i64, status: SubscriptionStatus) -> Subscription {
        let start = Timestamp::now().add_days(-start_days_ago);
        Subscription {
            id: SubscriptionId::new(),
            user_id,
            status,
            start_date: start,
            end_date: start.add_days(30),
            price_cents: 4_900,
            created_at: start,
        }
    }

    #[tokio::test]
    async fn no_subscription_means_no_access() {
        let h = Harness::new();
        let user_id = UserId::new();

        let access = h
            .check_subscription()
            .handle(CheckSubscriptionQuery {
                user_id,
                actor: Actor::user(user_id),
            })
            .await
            .unwrap();

        assert!(!access.active);
        assert!(access.subscription.is_none());
    }

    #[tokio::test]
    async fn current_subscription_grants_access() {
        let h = Harness::new();
        let user_id = UserId::new();
        h.subscriptions
            .save(&subscription(user_id, 3, SubscriptionStatus::Active))
            .await
            .unwrap();

        let access = h
            .check_subscription()
            .handle(CheckSubscriptionQuery {
                user_id,
                actor: Actor::user(user_id),
            })
            .await
            .unwrap();

        assert!(access.active);
    }

    #[tokio::test]
    async fn latest_row_wins_over_older_active_one() {
        let h = Harness::new();
        let user_id = UserId::new();
        h.subscriptions
            .save(&subscription(user_id, 10, SubscriptionStatus::Active))
            .await
            .unwrap();
        h.subscriptions
            .save(&subscription(user_id, 1, SubscriptionStatus::Canceled))
            .await
            .unwrap();

        let access = h
            .check_subscription()
            .handle(CheckSubscriptionQuery {
                user_id,
                actor: Actor::user(user_id),
            })
            .await
            .unwrap();

        assert!(!access.active);
        assert_eq!(
            access.subscription.map(|s| s.status),
            Some(SubscriptionStatus::Canceled)
        );
    }

    #[tokio::test]
    async fn expired_window_denies_access() {
        let h = Harness::new();
        let user_id = UserId::new();
        h.subscriptions
            .save(&subscription(user_id, 45, SubscriptionStatus::Active))
            .await
            .unwrap();

        let access = h
            .check_subscription()
            .handle(CheckSubscriptionQuery {
                user_id,
                actor: Actor::admin(UserId::new()),
            })
            .await
            .unwrap();

        assert!(!access.active);
    }

    #[tokio::test]
    async fn other_users_are_forbidden() {
        let h = Harness::new();
        let err = h
            .check_subscription()
            .handle(CheckSubscriptionQuery {
                user_id: UserId::new(),
                actor: Actor::user(UserId::new()),
            })
            .await
            .unwrap_err();
        assert_eq!(err, SubscriptionError::Forbidden);
    }
}
