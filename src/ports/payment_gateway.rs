//! Payment gateway port.
//!
//! This system never initiates payments; it only consumes the gateway's
//! signed webhook deliveries.

use async_trait::async_trait;

use crate::domain::payment::{GatewayEvent, WebhookError};

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Verifies the signature header against the raw body and parses the event.
    ///
    /// # Errors
    ///
    /// - `InvalidSignature` when the header is missing or does not match
    /// - `TimestampOutOfRange` / `InvalidTimestamp` for stale or future deliveries
    /// - `ParseError` when the body is not an event
    async fn verify_webhook(
        &self,
        payload: &[u8],
        signature: Option<&str>,
    ) -> Result<GatewayEvent, WebhookError>;
}
