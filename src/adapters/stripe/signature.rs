//! `Stripe-Signature` header handling.
//!
//! The header carries the signing time and one or more HMAC-SHA256
//! digests of `"{t}.{raw body}"`:
//!
//! ```text
//! t=1704067200,v1=5257a869e7ecebeda32affa62cdca3fa51cad7e77a0e56ff536d0ce8e108d8bd
//! ```

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

use crate::domain::payment::WebhookError;

type HmacSha256 = Hmac<Sha256>;

/// Oldest accepted signing time, in seconds.
pub const TIMESTAMP_TOLERANCE_SECS: i64 = 300;

/// How far a signing time may sit in the future, in seconds.
pub const FUTURE_SKEW_SECS: i64 = 60;

/// Errors from parsing the header.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureParseError {
    #[error("Missing signature header")]
    MissingHeader,

    #[error("Missing timestamp in signature header")]
    MissingTimestamp,

    #[error("Invalid timestamp in signature header")]
    InvalidTimestamp,

    #[error("Missing v1 signature")]
    MissingV1Signature,

    #[error("Signature is not valid hex")]
    InvalidSignatureFormat,
}

/// Parsed `Stripe-Signature` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader {
    pub timestamp: i64,
    /// Every `v1` digest present; the gateway sends several while a secret rotates.
    pub v1_signatures: Vec<Vec<u8>>,
}

impl SignatureHeader {
    pub fn parse(header: &str) -> Result<Self, SignatureParseError> {
        if header.trim().is_empty() {
            return Err(SignatureParseError::MissingHeader);
        }

        let mut timestamp = None;
        let mut v1_signatures = Vec::new();

        for part in header.split(',') {
            let Some((key, value)) = part.split_once('=') else {
                continue;
            };
            match key.trim() {
                "t" => {
                    timestamp = Some(
                        value
                            .trim()
                            .parse::<i64>()
                            .map_err(|_| SignatureParseError::InvalidTimestamp)?,
                    );
                }
                "v1" => v1_signatures.push(
                    hex::decode(value.trim())
                        .map_err(|_| SignatureParseError::InvalidSignatureFormat)?,
                ),
                // v0 and unknown schemes are ignored
                _ => {}
            }
        }

        let timestamp = timestamp.ok_or(SignatureParseError::MissingTimestamp)?;
        if v1_signatures.is_empty() {
            return Err(SignatureParseError::MissingV1Signature);
        }
        Ok(Self {
            timestamp,
            v1_signatures,
        })
    }
}

/// Checks the header against `payload` at time `now` (unix seconds).
pub fn verify(secret: &[u8], payload: &[u8], header: &SignatureHeader, now: i64) -> Result<(), WebhookError> {
    verify_with_tolerance(secret, payload, header, now, TIMESTAMP_TOLERANCE_SECS)
}

/// [`verify`] with a custom maximum signature age.
pub fn verify_with_tolerance(
    secret: &[u8],
    payload: &[u8],
    header: &SignatureHeader,
    now: i64,
    tolerance_secs: i64,
) -> Result<(), WebhookError> {
    let Some(age) = now.checked_sub(header.timestamp) else {
        tracing::warn!(timestamp = header.timestamp, "Webhook signature timestamp out of range");
        return Err(WebhookError::InvalidTimestamp);
    };
    if age > tolerance_secs {
        tracing::warn!(age_secs = age, "Webhook signature too old");
        return Err(WebhookError::TimestampOutOfRange);
    }
    if age < -FUTURE_SKEW_SECS {
        tracing::warn!(age_secs = age, "Webhook signature from the future");
        return Err(WebhookError::InvalidTimestamp);
    }

    let expected = digest(secret, header.timestamp, payload)?;
    let matched = header
        .v1_signatures
        .iter()
        .any(|candidate| expected.as_slice().ct_eq(candidate.as_slice()).into());
    if !matched {
        return Err(WebhookError::InvalidSignature);
    }
    Ok(())
}

/// Builds a header value for `payload`, as the gateway would.
pub fn sign_payload(secret: &[u8], timestamp: i64, payload: &[u8]) -> String {
    // Hmac accepts keys of any length, so this never falls back.
    let signature = digest(secret, timestamp, payload).unwrap_or_default();
    format!("t={},v1={}", timestamp, hex::encode(signature))
}

fn digest(secret: &[u8], timestamp: i64, payload: &[u8]) -> Result<Vec<u8>, WebhookError> {
    let mut mac =
        HmacSha256::new_from_slice(secret).map_err(|_| WebhookError::InvalidSignature)?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(mac.finalize().into_bytes().to_vec())
}
