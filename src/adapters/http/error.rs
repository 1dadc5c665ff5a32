//! Error responses for the HTTP surface.
//!
//! # Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | Validation, invalid response, token, email mismatch | 400 |
//! | Forbidden | 403 |
//! | Not found | 404 |
//! | Invalid state, policy violation | 409 |
//! | Infrastructure | 500 |

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::outreach::OutreachError;
use crate::domain::session::SessionError;
use crate::domain::subscription::SubscriptionError;

/// JSON error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("BAD_REQUEST", message)
    }

    pub fn not_found(resource_type: &str, id: &str) -> Self {
        Self::new("NOT_FOUND", format!("{} not found: {}", resource_type, id))
    }
}

/// Error returned by every consulting endpoint.
#[derive(Debug, Clone)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorResponse,
}

impl ApiError {
    pub fn new(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorResponse::new(code, message),
        }
    }

    /// Malformed path or query input.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: ErrorResponse::bad_request(message),
        }
    }

    pub fn not_found(resource_type: &str, id: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            body: ErrorResponse::not_found(resource_type, id),
        }
    }

    fn from_code(code: ErrorCode, message: String) -> Self {
        let status = status_for(code);
        if status.is_server_error() {
            tracing::error!(code = %code, error = %message, "request failed");
            // Internal details stay in the log.
            return Self::new(status, code.to_string(), "Internal server error");
        }
        Self::new(status, code.to_string(), message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn body(&self) -> &ErrorResponse {
        &self.body
    }
}

/// Maps an error code to its HTTP status.
pub fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::ValidationFailed
        | ErrorCode::EmptyField
        | ErrorCode::OutOfRange
        | ErrorCode::InvalidFormat
        | ErrorCode::InvalidResponse
        | ErrorCode::InvalidToken
        | ErrorCode::TokenExpired
        | ErrorCode::EmailMismatch
        | ErrorCode::SignatureInvalid => StatusCode::BAD_REQUEST,

        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,

        ErrorCode::NotFound
        | ErrorCode::UserNotFound
        | ErrorCode::ResearcherNotFound
        | ErrorCode::PaperNotFound
        | ErrorCode::OutreachNotFound
        | ErrorCode::SessionNotFound
        | ErrorCode::PaymentNotFound => StatusCode::NOT_FOUND,

        ErrorCode::InvalidStateTransition | ErrorCode::PolicyViolation => StatusCode::CONFLICT,

        ErrorCode::ExternalProviderError | ErrorCode::DatabaseError | ErrorCode::InternalError => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<OutreachError> for ApiError {
    fn from(err: OutreachError) -> Self {
        Self::from_code(err.code(), err.message())
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        Self::from_code(err.code(), err.message())
    }
}

impl From<SubscriptionError> for ApiError {
    fn from(err: SubscriptionError) -> Self {
        Self::from_code(err.code(), err.message())
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self::from_code(err.code, err.message)
    }
}
