//! HTTP adapter for payment gateway webhooks.
//!
//! No actor headers: deliveries are authenticated by their signature.

mod handlers;

pub use handlers::{handle_payment_webhook, webhook_routes, WebhookHandlers, SIGNATURE_HEADER};
