//! Outreach-specific error types.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | NotFound | 404 |
//! | InvalidResponse | 400 |
//! | InvalidToken | 400 |
//! | TokenExpired | 400 |
//! | EmailMismatch | 400 |
//! | Forbidden | 403 |
//! | InvalidState | 409 |
//! | ValidationFailed | 400 |
//! | Infrastructure | 500 |

use crate::domain::foundation::{DomainError, ErrorCode, OutreachRequestId};

use super::TokenError;

/// Outreach-specific errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutreachError {
    /// Outreach request was not found.
    NotFound(OutreachRequestId),

    /// Response was neither `accept` nor `decline`.
    InvalidResponse(String),

    /// Registration token failed verification.
    InvalidToken,

    /// Registration token is past its expiry.
    TokenExpired,

    /// Submitted profile email differs from the token's email.
    EmailMismatch,

    /// Caller may not act on this request.
    Forbidden,

    /// Request is not in a state that allows the operation.
    InvalidState { current: String, attempted: String },

    /// Validation failed.
    ValidationFailed { field: String, message: String },

    /// Infrastructure error.
    Infrastructure(String),
}

impl OutreachError {
    pub fn not_found(id: OutreachRequestId) -> Self {
        OutreachError::NotFound(id)
    }

    pub fn invalid_response(response: impl Into<String>) -> Self {
        OutreachError::InvalidResponse(response.into())
    }

    pub fn forbidden() -> Self {
        OutreachError::Forbidden
    }

    pub fn invalid_state(current: impl Into<String>, attempted: impl Into<String>) -> Self {
        OutreachError::InvalidState {
            current: current.into(),
            attempted: attempted.into(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        OutreachError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        OutreachError::Infrastructure(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            OutreachError::NotFound(_) => ErrorCode::OutreachNotFound,
            OutreachError::InvalidResponse(_) => ErrorCode::InvalidResponse,
            OutreachError::InvalidToken => ErrorCode::InvalidToken,
            OutreachError::TokenExpired => ErrorCode::TokenExpired,
            OutreachError::EmailMismatch => ErrorCode::EmailMismatch,
            OutreachError::Forbidden => ErrorCode::Forbidden,
            OutreachError::InvalidState { .. } => ErrorCode::InvalidStateTransition,
            OutreachError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            OutreachError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    /// Returns a user-facing message.
    pub fn message(&self) -> String {
        match self {
            OutreachError::NotFound(id) => format!("Outreach request not found: {}", id),
            OutreachError::InvalidResponse(r) => {
                format!("Invalid response '{}': expected 'accept' or 'decline'", r)
            }
            OutreachError::InvalidToken => "Invalid registration token".to_string(),
            OutreachError::TokenExpired => {
                "Registration token has expired; ask for a new invitation".to_string()
            }
            OutreachError::EmailMismatch => {
                "Profile email does not match the invited email".to_string()
            }
            OutreachError::Forbidden => "Permission denied".to_string(),
            OutreachError::InvalidState { current, attempted } => {
                format!("Outreach request cannot move from {} to {}", current, attempted)
            }
            OutreachError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            OutreachError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }
}

impl std::fmt::Display for OutreachError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for OutreachError {}

impl From<TokenError> for OutreachError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => OutreachError::TokenExpired,
            TokenError::Invalid(_) => OutreachError::InvalidToken,
        }
    }
}

impl From<DomainError> for OutreachError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::Forbidden => OutreachError::Forbidden,
            ErrorCode::InvalidStateTransition => OutreachError::InvalidState {
                current: err.details.get("from").cloned().unwrap_or_default(),
                attempted: err.details.get("to").cloned().unwrap_or_default(),
            },
            ErrorCode::ValidationFailed => OutreachError::ValidationFailed {
                field: err.details.get("field").cloned().unwrap_or_default(),
                message: err.message,
            },
            _ => OutreachError::Infrastructure(err.to_string()),
        }
    }
}
