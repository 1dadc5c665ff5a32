//! Stripe webhook gateway.
//!
//! Implements `PaymentGateway` by verifying the `Stripe-Signature` header
//! before the body is parsed.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::domain::payment::{GatewayEvent, WebhookError};
use crate::ports::PaymentGateway;

use super::signature::{verify_with_tolerance, SignatureHeader, TIMESTAMP_TOLERANCE_SECS};

pub struct StripeWebhookGateway {
    webhook_secret: SecretString,
    tolerance_secs: i64,
}

impl StripeWebhookGateway {
    pub fn new(webhook_secret: SecretString) -> Self {
        Self {
            webhook_secret,
            tolerance_secs: TIMESTAMP_TOLERANCE_SECS,
        }
    }

    /// Overrides the maximum accepted signature age.
    pub fn with_tolerance_secs(mut self, tolerance_secs: i64) -> Self {
        self.tolerance_secs = tolerance_secs;
        self
    }

    fn verify_at(
        &self,
        payload: &[u8],
        signature: Option<&str>,
        now: i64,
    ) -> Result<GatewayEvent, WebhookError> {
        let raw = signature.ok_or(WebhookError::InvalidSignature)?;
        let header = SignatureHeader::parse(raw).map_err(|e| {
            tracing::warn!(error = %e, "Malformed Stripe-Signature header");
            WebhookError::InvalidSignature
        })?;

        verify_with_tolerance(
            self.webhook_secret.expose_secret().as_bytes(),
            payload,
            &header,
            now,
            self.tolerance_secs,
        )?;

        serde_json::from_slice(payload).map_err(|e| WebhookError::ParseError(e.to_string()))
    }
}

#[async_trait]
impl PaymentGateway for StripeWebhookGateway {
    async fn verify_webhook(
        &self,
        payload: &[u8],
        signature: Option<&str>,
    ) -> Result<GatewayEvent, WebhookError> {
        let event = self.verify_at(payload, signature, chrono::Utc::now().timestamp())?;
        tracing::debug!(event_id = ?event.id, event_type = %event.event_type, "Webhook signature verified");
        Ok(event)
    }
}
