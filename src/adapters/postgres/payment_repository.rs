//! PostgreSQL implementation of PaymentRepository.
//!
//! The `payments_transaction_id_key` constraint makes concurrent deliveries
//! of one gateway event collapse onto a single row.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{
    DomainError, ErrorCode, PaymentId, SessionId, SubscriptionId, Timestamp, UserId,
};
use crate::domain::payment::{Payment, PaymentStatus};
use crate::ports::{PaymentRepository, SaveResult};

use super::{corrupt_column, db_error};

#[derive(Clone)]
pub struct PostgresPaymentRepository {
    pool: PgPool,
}

impl PostgresPaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PaymentRow {
    id: Uuid,
    user_id: Uuid,
    session_id: Option<Uuid>,
    amount_cents: i64,
    status: String,
    transaction_id: String,
    subscription_id: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PaymentRow> for Payment {
    type Error = DomainError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        let status = PaymentStatus::parse(&row.status)
            .ok_or_else(|| corrupt_column("payments.status", &row.status))?;
        Ok(Payment {
            id: PaymentId::from_uuid(row.id),
            user_id: UserId::from_uuid(row.user_id),
            session_id: row.session_id.map(SessionId::from_uuid),
            amount_cents: row.amount_cents,
            status,
            transaction_id: row.transaction_id,
            subscription_id: row.subscription_id.map(SubscriptionId::from_uuid),
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

#[async_trait]
impl PaymentRepository for PostgresPaymentRepository {
    async fn find_by_transaction_id(
        &self,
        transaction_id: &str,
    ) -> Result<Option<Payment>, DomainError> {
        let row: Option<PaymentRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, session_id, amount_cents, status, transaction_id,
                   subscription_id, created_at, updated_at
            FROM payments
            WHERE transaction_id = $1
            "#,
        )
        .bind(transaction_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to fetch payment"))?;

        row.map(Payment::try_from).transpose()
    }

    async fn insert(&self, payment: &Payment) -> Result<SaveResult, DomainError> {
        let result = sqlx::query(
            r#"
            INSERT INTO payments (
                id, user_id, session_id, amount_cents, status, transaction_id,
                subscription_id, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (transaction_id) DO NOTHING
            "#,
        )
        .bind(payment.id.as_uuid())
        .bind(payment.user_id.as_uuid())
        .bind(payment.session_id.map(|s| *s.as_uuid()))
        .bind(payment.amount_cents)
        .bind(payment.status.as_str())
        .bind(&payment.transaction_id)
        .bind(payment.subscription_id.map(|s| *s.as_uuid()))
        .bind(payment.created_at.as_datetime())
        .bind(payment.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to insert payment"))?;

        Ok(if result.rows_affected() == 0 {
            SaveResult::AlreadyExists
        } else {
            SaveResult::Inserted
        })
    }

    async fn transition_status(
        &self,
        transaction_id: &str,
        from: PaymentStatus,
        to: PaymentStatus,
    ) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE payments SET status = $3, updated_at = NOW()
            WHERE transaction_id = $1 AND status = $2
            "#,
        )
        .bind(transaction_id)
        .bind(from.as_str())
        .bind(to.as_str())
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to update payment status"))?;

        Ok(result.rows_affected() == 1)
    }

    async fn link_subscription(
        &self,
        payment_id: &PaymentId,
        subscription_id: &SubscriptionId,
    ) -> Result<(), DomainError> {
        let result = sqlx::query(
            "UPDATE payments SET subscription_id = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(payment_id.as_uuid())
        .bind(subscription_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to link subscription"))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::PaymentNotFound,
                format!("Payment not found: {}", payment_id),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_keeps_subscription_link() {
        let subscription = Uuid::new_v4();
        let now = Utc::now();
        let row = PaymentRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            session_id: None,
            amount_cents: 4900,
            status: "completed".to_string(),
            transaction_id: "pi_123".to_string(),
            subscription_id: Some(subscription),
            created_at: now,
            updated_at: now,
        };

        let payment = Payment::try_from(row).unwrap();

        assert_eq!(payment.status, PaymentStatus::Completed);
        assert_eq!(payment.subscription_id, Some(SubscriptionId::from_uuid(subscription)));
        assert_eq!(payment.amount(), 49.0);
    }
}
