//! Payment gateway webhook events.
//!
//! The gateway posts `{type, data: {object: {...}}}`. For payment events the
//! object carries `{id, amount, metadata}`; everything else is ignored.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{SessionId, UserId};

use super::WebhookError;

/// Webhook envelope.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GatewayEvent {
    /// Gateway event identifier, when the gateway sends one.
    #[serde(default)]
    pub id: Option<String>,

    /// Event type, e.g. `payment_intent.succeeded`.
    #[serde(rename = "type")]
    pub event_type: String,

    pub data: GatewayEventData,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GatewayEventData {
    /// Polymorphic on `type`.
    pub object: serde_json::Value,
}

impl GatewayEvent {
    /// Parse the event type into a known kind.
    pub fn kind(&self) -> GatewayEventKind {
        GatewayEventKind::parse(&self.event_type)
    }

    /// Deserializes `data.object` as a payment intent.
    pub fn payment_intent(&self) -> Result<PaymentIntentObject, WebhookError> {
        serde_json::from_value(self.data.object.clone())
            .map_err(|e| WebhookError::ParseError(e.to_string()))
    }
}

/// Event kinds the reconciler distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayEventKind {
    PaymentSucceeded,
    PaymentFailed,
    SubscriptionCreated,
    SubscriptionUpdated,
    SubscriptionDeleted,
    Unknown,
}

impl GatewayEventKind {
    pub fn parse(s: &str) -> Self {
        match s {
            "payment_intent.succeeded" => Self::PaymentSucceeded,
            "payment_intent.payment_failed" => Self::PaymentFailed,
            "customer.subscription.created" => Self::SubscriptionCreated,
            "customer.subscription.updated" => Self::SubscriptionUpdated,
            "customer.subscription.deleted" => Self::SubscriptionDeleted,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PaymentSucceeded => "payment_intent.succeeded",
            Self::PaymentFailed => "payment_intent.payment_failed",
            Self::SubscriptionCreated => "customer.subscription.created",
            Self::SubscriptionUpdated => "customer.subscription.updated",
            Self::SubscriptionDeleted => "customer.subscription.deleted",
            Self::Unknown => "unknown",
        }
    }
}

/// `data.object` of a payment event.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PaymentIntentObject {
    /// Gateway transaction id, the idempotency key.
    pub id: String,
    /// Amount in the smallest currency unit.
    #[serde(default)]
    pub amount: i64,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// What a payment paid for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentPurpose {
    Session,
    Subscription,
    /// Recorded, but triggers no side effect.
    Other(String),
}

impl PaymentPurpose {
    fn parse(raw: &str) -> Self {
        match raw {
            "session" => PaymentPurpose::Session,
            "subscription" => PaymentPurpose::Subscription,
            other => PaymentPurpose::Other(other.to_string()),
        }
    }
}

/// Metadata the checkout attaches to every payment intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentMetadata {
    pub purpose: PaymentPurpose,
    pub user_id: UserId,
    pub session_id: Option<SessionId>,
}

impl PaymentMetadata {
    /// Extracts typed metadata.
    ///
    /// `type` and `user_id` are required. A malformed `session_id` is
    /// treated as absent.
    pub fn from_map(metadata: &HashMap<String, String>) -> Result<Self, WebhookError> {
        let purpose = metadata
            .get("type")
            .filter(|v| !v.trim().is_empty())
            .map(|v| PaymentPurpose::parse(v.trim()))
            .ok_or(WebhookError::MissingMetadata("type"))?;

        let raw_user = metadata
            .get("user_id")
            .filter(|v| !v.trim().is_empty())
            .ok_or(WebhookError::MissingMetadata("user_id"))?;
        let user_id = raw_user
            .trim()
            .parse::<UserId>()
            .map_err(|_| WebhookError::InvalidMetadata {
                field: "user_id",
                value: raw_user.clone(),
            })?;

        let session_id = metadata
            .get("session_id")
            .and_then(|v| v.trim().parse::<SessionId>().ok());

        Ok(Self {
            purpose,
            user_id,
            session_id,
        })
    }
}

/// Builder for creating test gateway events.
#[cfg(test)]
pub struct GatewayEventBuilder {
    event_type: String,
    transaction_id: String,
    amount: i64,
    metadata: HashMap<String, String>,
}

#[cfg(test)]
impl GatewayEventBuilder {
    pub fn succeeded(transaction_id: &str) -> Self {
        Self {
            event_type: GatewayEventKind::PaymentSucceeded.as_str().to_string(),
            transaction_id: transaction_id.to_string(),
            amount: 5_000,
            metadata: HashMap::new(),
        }
    }

    pub fn failed(transaction_id: &str) -> Self {
        Self {
            event_type: GatewayEventKind::PaymentFailed.as_str().to_string(),
            ..Self::succeeded(transaction_id)
        }
    }

    pub fn meta(mut self, key: &str, value: impl ToString) -> Self {
        self.metadata.insert(key.to_string(), value.to_string());
        self
    }

    pub fn amount(mut self, amount: i64) -> Self {
        self.amount = amount;
        self
    }

    pub fn build(self) -> GatewayEvent {
        GatewayEvent {
            id: Some(format!("evt_{}", self.transaction_id)),
            event_type: self.event_type,
            data: GatewayEventData {
                object: serde_json::json!({
                    "id": self.transaction_id,
                    "amount": self.amount,
                    "metadata": self.metadata,
                }),
            },
        }
    }
}
