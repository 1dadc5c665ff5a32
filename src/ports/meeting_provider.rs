//! Video conferencing provider port.
//!
//! Raw provider contract. Callers go through the meeting lifecycle service,
//! which turns every failure here into a logged, non-fatal outcome.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::meeting::{MeetingDetails, MeetingRef, MeetingRequest, MeetingUpdate};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MeetingProviderError {
    #[error("meeting {0} not found")]
    NotFound(String),

    #[error("provider authentication failed")]
    Unauthorized,

    #[error("provider returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("provider unreachable: {0}")]
    Transport(String),
}

#[async_trait]
pub trait MeetingProvider: Send + Sync {
    /// Creates a meeting and returns its join details.
    async fn create(&self, request: &MeetingRequest) -> Result<MeetingDetails, MeetingProviderError>;

    /// Fetches a meeting.
    async fn get(&self, meeting: &MeetingRef) -> Result<MeetingDetails, MeetingProviderError>;

    /// Applies a partial update.
    async fn update(
        &self,
        meeting: &MeetingRef,
        update: &MeetingUpdate,
    ) -> Result<(), MeetingProviderError>;

    /// Deletes a meeting.
    async fn delete(&self, meeting: &MeetingRef) -> Result<(), MeetingProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meeting_provider_is_object_safe() {
        fn _accepts_dyn(_provider: &dyn MeetingProvider) {}
    }
}
