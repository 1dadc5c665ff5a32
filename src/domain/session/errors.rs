//! Session-specific error types.

use crate::domain::foundation::{DomainError, ErrorCode, PaperId, ResearcherId, SessionId};

/// Session-specific errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Session was not found.
    NotFound(SessionId),
    /// Referenced researcher does not exist.
    ResearcherNotFound(ResearcherId),
    /// Referenced paper does not exist.
    PaperNotFound(PaperId),
    /// Caller is not allowed to act on this session.
    Forbidden,
    /// Business rule denial, e.g. late cancellation.
    PolicyViolation(String),
    /// Invalid state for operation.
    InvalidState(String),
    /// Validation failed.
    ValidationFailed { field: String, message: String },
    /// Infrastructure error.
    Infrastructure(String),
}

impl SessionError {
    pub fn not_found(id: SessionId) -> Self {
        SessionError::NotFound(id)
    }
    pub fn forbidden() -> Self {
        SessionError::Forbidden
    }
    pub fn policy_violation(message: impl Into<String>) -> Self {
        SessionError::PolicyViolation(message.into())
    }
    pub fn invalid_state(message: impl Into<String>) -> Self {
        SessionError::InvalidState(message.into())
    }
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        SessionError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }
    pub fn infrastructure(message: impl Into<String>) -> Self {
        SessionError::Infrastructure(message.into())
    }
    pub fn code(&self) -> ErrorCode {
        match self {
            SessionError::NotFound(_) => ErrorCode::SessionNotFound,
            SessionError::ResearcherNotFound(_) => ErrorCode::ResearcherNotFound,
            SessionError::PaperNotFound(_) => ErrorCode::PaperNotFound,
            SessionError::Forbidden => ErrorCode::Forbidden,
            SessionError::PolicyViolation(_) => ErrorCode::PolicyViolation,
            SessionError::InvalidState(_) => ErrorCode::InvalidStateTransition,
            SessionError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            SessionError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }
    pub fn message(&self) -> String {
        match self {
            SessionError::NotFound(id) => format!("Session not found: {}", id),
            SessionError::ResearcherNotFound(id) => format!("Researcher not found: {}", id),
            SessionError::PaperNotFound(id) => format!("Paper not found: {}", id),
            SessionError::Forbidden => "Permission denied".to_string(),
            SessionError::PolicyViolation(msg) => msg.clone(),
            SessionError::InvalidState(msg) => format!("Invalid state: {}", msg),
            SessionError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            SessionError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for SessionError {}

impl From<DomainError> for SessionError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::Forbidden => SessionError::Forbidden,
            ErrorCode::PolicyViolation => SessionError::PolicyViolation(err.message),
            ErrorCode::InvalidStateTransition => SessionError::InvalidState(err.message),
            ErrorCode::ValidationFailed => SessionError::ValidationFailed {
                field: err.details.get("field").cloned().unwrap_or_default(),
                message: err.message,
            },
            _ => SessionError::Infrastructure(err.to_string()),
        }
    }
}
