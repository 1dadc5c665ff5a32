//! Consulting subscription records.
//!
//! Every purchase inserts a new row; the most recent row decides access.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DomainError, ErrorCode, SubscriptionId, Timestamp, UserId};

/// Subscription status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    Canceled,
    Expired,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Canceled => "canceled",
            SubscriptionStatus::Expired => "expired",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(SubscriptionStatus::Active),
            "canceled" => Some(SubscriptionStatus::Canceled),
            "expired" => Some(SubscriptionStatus::Expired),
            _ => None,
        }
    }
}

/// A consulting subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub user_id: UserId,
    pub status: SubscriptionStatus,
    pub start_date: Timestamp,
    pub end_date: Timestamp,
    pub price_cents: i64,
    pub created_at: Timestamp,
}

impl Subscription {
    /// New active subscription starting now and lasting `validity_days`.
    pub fn activate(user_id: UserId, price_cents: i64, validity_days: i64) -> Self {
        let now = Timestamp::now();
        Self {
            id: SubscriptionId::new(),
            user_id,
            status: SubscriptionStatus::Active,
            start_date: now,
            end_date: now.add_days(validity_days),
            price_cents,
            created_at: now,
        }
    }

    /// Active and not yet past `end_date`.
    pub fn grants_access_at(&self, at: Timestamp) -> bool {
        self.status == SubscriptionStatus::Active && self.end_date.is_after(&at)
    }
}

/// Subscription errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// Caller may not see this user's subscription.
    Forbidden,
    /// Infrastructure error.
    Infrastructure(String),
}

impl SubscriptionError {
    pub fn code(&self) -> ErrorCode {
        match self {
            SubscriptionError::Forbidden => ErrorCode::Forbidden,
            SubscriptionError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    pub fn message(&self) -> String {
        match self {
            SubscriptionError::Forbidden => "Permission denied".to_string(),
            SubscriptionError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }
}

impl std::fmt::Display for SubscriptionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for SubscriptionError {}

impl From<DomainError> for SubscriptionError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::Forbidden => SubscriptionError::Forbidden,
            _ => SubscriptionError::Infrastructure(err.to_string()),
        }
    }
}
