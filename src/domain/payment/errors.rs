//! Webhook error types for payment gateway notifications.
//!
//! Only transport-level failures (signature, timestamp, unparseable body)
//! reject a delivery. Everything found while handling a verified event is
//! logged and acknowledged so the gateway does not retry forever.

use axum::http::StatusCode;
use thiserror::Error;

/// Errors that occur during webhook processing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WebhookError {
    /// Signature header missing or does not match the payload.
    #[error("Invalid signature")]
    InvalidSignature,

    /// Signed timestamp is older than the tolerance window.
    #[error("Timestamp out of range")]
    TimestampOutOfRange,

    /// Signed timestamp is in the future beyond clock skew tolerance.
    #[error("Invalid timestamp")]
    InvalidTimestamp,

    /// Failed to parse the payload or the signature header.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Required metadata field missing from a payment event.
    #[error("Missing metadata: {0}")]
    MissingMetadata(&'static str),

    /// Metadata field present but unusable.
    #[error("Invalid metadata {field}: {value}")]
    InvalidMetadata { field: &'static str, value: String },
}

impl WebhookError {
    /// True if the delivery itself is rejected.
    pub fn rejects_delivery(&self) -> bool {
        matches!(
            self,
            WebhookError::InvalidSignature
                | WebhookError::TimestampOutOfRange
                | WebhookError::InvalidTimestamp
                | WebhookError::ParseError(_)
        )
    }

    /// Maps the error to the status returned to the gateway.
    ///
    /// - 400: unverifiable delivery
    /// - 200: verified delivery, whatever happened while handling it
    pub fn status_code(&self) -> StatusCode {
        if self.rejects_delivery() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::OK
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ══════════════════════════════════════════════════════════════
    // Status Mapping
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn signature_problems_are_bad_request() {
        assert_eq!(WebhookError::InvalidSignature.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(WebhookError::TimestampOutOfRange.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            WebhookError::ParseError("eof".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn business_failures_are_acknowledged() {
        assert_eq!(WebhookError::MissingMetadata("type").status_code(), StatusCode::OK);
        assert_eq!(
            WebhookError::InvalidMetadata { field: "user_id", value: "x".into() }.status_code(),
            StatusCode::OK
        );
    }

    // ══════════════════════════════════════════════════════════════
    // Display
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn missing_metadata_displays_field_name() {
        let err = WebhookError::MissingMetadata("user_id");
        assert_eq!(format!("{}", err), "Missing metadata: user_id");
    }
}
