//! Outreach request repository port.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, OutreachRequestId, Timestamp};
use crate::domain::outreach::{OutreachRequest, OutreachStatus};

/// Repository port for outreach requests.
#[async_trait]
pub trait OutreachRepository: Send + Sync {
    /// Save a new request.
    async fn save(&self, request: &OutreachRequest) -> Result<(), DomainError>;

    /// Writes `request` only if the stored status is still `expected`.
    ///
    /// Returns false when the row is gone or another writer already moved
    /// its status; nothing is written in that case.
    async fn update_if_status(
        &self,
        request: &OutreachRequest,
        expected: OutreachStatus,
    ) -> Result<bool, DomainError>;

    /// Find a request by id.
    async fn find_by_id(&self, id: &OutreachRequestId)
        -> Result<Option<OutreachRequest>, DomainError>;

    /// Requests in `status` created before `created_before`, oldest first.
    async fn find_by_status_created_before(
        &self,
        status: OutreachStatus,
        created_before: Timestamp,
    ) -> Result<Vec<OutreachRequest>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outreach_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn OutreachRepository) {}
    }
}
