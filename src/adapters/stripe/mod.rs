//! Stripe webhook adapter.
//!
//! Implements the `PaymentGateway` port: signature verification and event
//! parsing for payment intent and subscription deliveries.
//!
//! # Security
//!
//! - HMAC-SHA256 signatures compared in constant time
//! - Signing time must be within 5 minutes (60 s of future skew allowed)
//! - The signing secret is held as a `secrecy::SecretString`

mod gateway;
mod signature;

pub use gateway::StripeWebhookGateway;
pub use signature::{
    sign_payload, verify, verify_with_tolerance, SignatureHeader, SignatureParseError,
    FUTURE_SKEW_SECS, TIMESTAMP_TOLERANCE_SECS,
};
