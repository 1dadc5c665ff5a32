//! Payment repository port.
//!
//! `transaction_id` is unique. Implementations must enforce that with a
//! database constraint, not a check-then-insert, because the gateway may
//! deliver the same event to several workers at once.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, PaymentId, SubscriptionId};
use crate::domain::payment::{Payment, PaymentStatus};

/// Result of attempting to insert a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveResult {
    /// Row was inserted (first time seeing this transaction).
    Inserted,
    /// A row with the same transaction id already exists.
    AlreadyExists,
}

/// Repository port for payments.
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Find a payment by gateway transaction id.
    async fn find_by_transaction_id(
        &self,
        transaction_id: &str,
    ) -> Result<Option<Payment>, DomainError>;

    /// Insert a payment.
    ///
    /// Uses `ON CONFLICT (transaction_id) DO NOTHING` semantics.
    async fn insert(&self, payment: &Payment) -> Result<SaveResult, DomainError>;

    /// Sets `to` only if the stored status is currently `from`.
    ///
    /// Returns true if a row changed.
    async fn transition_status(
        &self,
        transaction_id: &str,
        from: PaymentStatus,
        to: PaymentStatus,
    ) -> Result<bool, DomainError>;

    /// Records the subscription a payment bought.
    ///
    /// # Errors
    ///
    /// - `PaymentNotFound` if the payment doesn't exist
    async fn link_subscription(
        &self,
        payment_id: &PaymentId,
        subscription_id: &SubscriptionId,
    ) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn PaymentRepository) {}
    }
}
