//! In-memory payment repository.
//!
//! Payments are keyed by transaction id, so a duplicate insert is detected
//! under the same write lock that performs it.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, PaymentId, SubscriptionId, Timestamp};
use crate::domain::payment::{Payment, PaymentStatus};
use crate::ports::{PaymentRepository, SaveResult};

#[derive(Default)]
pub struct InMemoryPaymentRepository {
    by_transaction: RwLock<HashMap<String, Payment>>,
}

impl InMemoryPaymentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every stored payment (for assertions).
    pub async fn all(&self) -> Vec<Payment> {
        self.by_transaction.read().await.values().cloned().collect()
    }
}

#[async_trait]
impl PaymentRepository for InMemoryPaymentRepository {
    async fn find_by_transaction_id(
        &self,
        transaction_id: &str,
    ) -> Result<Option<Payment>, DomainError> {
        Ok(self.by_transaction.read().await.get(transaction_id).cloned())
    }

    async fn insert(&self, payment: &Payment) -> Result<SaveResult, DomainError> {
        let mut payments = self.by_transaction.write().await;
        if payments.contains_key(&payment.transaction_id) {
            return Ok(SaveResult::AlreadyExists);
        }
        payments.insert(payment.transaction_id.clone(), payment.clone());
        Ok(SaveResult::Inserted)
    }

    async fn transition_status(
        &self,
        transaction_id: &str,
        from: PaymentStatus,
        to: PaymentStatus,
    ) -> Result<bool, DomainError> {
        let mut payments = self.by_transaction.write().await;
        match payments.get_mut(transaction_id) {
            Some(p) if p.status == from => {
                p.status = to;
                p.updated_at = Timestamp::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn link_subscription(
        &self,
        payment_id: &PaymentId,
        subscription_id: &SubscriptionId,
    ) -> Result<(), DomainError> {
        let mut payments = self.by_transaction.write().await;
        let payment = payments
            .values_mut()
            .find(|p| p.id == *payment_id)
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::PaymentNotFound,
                    format!("Payment not found: {}", payment_id),
                )
            })?;
        payment.subscription_id = Some(*subscription_id);
        payment.updated_at = Timestamp::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::UserId;

    #[tokio::test]
    async fn second_insert_of_same_transaction_is_reported() {
        let repo = InMemoryPaymentRepository::new();
        let p = Payment::new(UserId::new(), None, 100, PaymentStatus::Completed, "pi_1");
        let dup = Payment::new(UserId::new(), None, 100, PaymentStatus::Completed, "pi_1");

        assert_eq!(repo.insert(&p).await.unwrap(), SaveResult::Inserted);
        assert_eq!(repo.insert(&dup).await.unwrap(), SaveResult::AlreadyExists);
        assert_eq!(repo.all().await.len(), 1);
    }

    #[tokio::test]
    async fn transition_is_conditional_on_current_status() {
        let repo = InMemoryPaymentRepository::new();
        let p = Payment::new(UserId::new(), None, 100, PaymentStatus::Completed, "pi_2");
        repo.insert(&p).await.unwrap();

        let changed = repo
            .transition_status("pi_2", PaymentStatus::Failed, PaymentStatus::Completed)
            .await
            .unwrap();
        assert!(!changed);
    }
}
