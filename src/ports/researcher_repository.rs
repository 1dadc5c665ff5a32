//! Researcher repository port.
//!
//! Researchers are keyed by id and, uniquely, by normalized email. Profiles
//! are upserted by email so repeated registration or pipeline imports never
//! create duplicates.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ResearcherId, UserId};
use crate::domain::researcher::{Researcher, ResearcherProfile};

/// Repository port for researcher profiles.
#[async_trait]
pub trait ResearcherRepository: Send + Sync {
    /// Find a researcher by id.
    async fn find_by_id(&self, id: &ResearcherId) -> Result<Option<Researcher>, DomainError>;

    /// Find a researcher by email (case-insensitive).
    async fn find_by_email(&self, email: &str) -> Result<Option<Researcher>, DomainError>;

    /// Create the researcher or update the one with the same email.
    ///
    /// Must be atomic with respect to concurrent upserts of the same email
    /// (`ON CONFLICT (email)` in SQL). Returns the stored researcher.
    async fn upsert_by_email(
        &self,
        profile: ResearcherProfile,
        user_id: Option<UserId>,
    ) -> Result<Researcher, DomainError>;
}
