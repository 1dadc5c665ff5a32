//! Read-only access to platform user accounts.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DomainError, UserId};

/// What notifications need to know about a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserContact {
    pub id: UserId,
    pub email: String,
    pub full_name: Option<String>,
}

impl UserContact {
    /// Name for greetings, falling back to the email address.
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.email)
    }
}

#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_contact(&self, user_id: &UserId) -> Result<Option<UserContact>, DomainError>;
}
