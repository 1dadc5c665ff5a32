//! Payment record.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{PaymentId, SessionId, SubscriptionId, Timestamp, UserId};

use super::PaymentStatus;

/// A payment as recorded from gateway notifications.
///
/// `transaction_id` is the gateway's identifier and is unique across all
/// payments; it is the idempotency key for webhook reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub user_id: UserId,
    pub session_id: Option<SessionId>,
    /// Amount in the smallest currency unit.
    pub amount_cents: i64,
    pub status: PaymentStatus,
    pub transaction_id: String,
    pub subscription_id: Option<SubscriptionId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Payment {
    pub fn new(
        user_id: UserId,
        session_id: Option<SessionId>,
        amount_cents: i64,
        status: PaymentStatus,
        transaction_id: impl Into<String>,
    ) -> Self {
        let now = Timestamp::now();
        Self {
            id: PaymentId::new(),
            user_id,
            session_id,
            amount_cents,
            status,
            transaction_id: transaction_id.into(),
            subscription_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Amount in major units, e.g. dollars.
    pub fn amount(&self) -> f64 {
        self.amount_cents as f64 / 100.0
    }
}
