//! Payment domain module.
//!
//! Payments are recorded from gateway webhooks, keyed on the gateway's
//! transaction id. Deliveries are at-least-once and unordered.

mod errors;
mod event;
mod record;
mod status;

pub use errors::WebhookError;
#[cfg(test)]
pub use event::GatewayEventBuilder;
pub use event::{
    GatewayEvent, GatewayEventData, GatewayEventKind, PaymentIntentObject, PaymentMetadata,
    PaymentPurpose,
};
pub use record::Payment;
pub use status::PaymentStatus;
