//! The caller on whose behalf a command runs.
//!
//! This is a domain type with no auth-provider dependencies; the HTTP layer
//! populates it from whatever identity mechanism fronts the service.

use serde::{Deserialize, Serialize};

use super::UserId;

/// Coarse role of the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

/// Authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub user_id: UserId,
    pub role: Role,
}

impl Actor {
    /// A regular platform user.
    pub fn user(user_id: UserId) -> Self {
        Self {
            user_id,
            role: Role::User,
        }
    }

    /// An administrator.
    pub fn admin(user_id: UserId) -> Self {
        Self {
            user_id,
            role: Role::Admin,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// True if the actor is `user_id` or an administrator.
    pub fn is_or_admin(&self, user_id: &UserId) -> bool {
        self.is_admin() || &self.user_id == user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_passes_ownership_check_for_any_user() {
        let admin = Actor::admin(UserId::new());
        assert!(admin.is_or_admin(&UserId::new()));
    }

    #[test]
    fn user_passes_only_for_self() {
        let id = UserId::new();
        let actor = Actor::user(id);
        assert!(actor.is_or_admin(&id));
        assert!(!actor.is_or_admin(&UserId::new()));
    }
}
