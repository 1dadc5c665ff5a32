//! Researcher entity and the profile payload used to create or update it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ResearcherId, Timestamp, UserId, ValidationError};

/// Maximum hourly rate accepted, in cents.
const MAX_HOURLY_RATE_CENTS: i64 = 10_000_00;

/// Lowercases and trims an email address for comparison and lookup.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Profile data submitted by a researcher (or collected for one).
///
/// `availability` maps a weekday name to free-form time windows,
/// e.g. `"monday" -> ["09:00-12:00"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearcherProfile {
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub affiliation: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub hourly_rate_cents: Option<i64>,
    #[serde(default)]
    pub availability: BTreeMap<String, Vec<String>>,
}

impl ResearcherProfile {
    /// Checks required fields and ranges.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let email = self.email.trim();
        if email.is_empty() {
            return Err(ValidationError::empty_field("email"));
        }
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && domain.contains('.') => {}
            _ => return Err(ValidationError::invalid_format("email", "not an email address")),
        }
        if self.name.trim().is_empty() {
            return Err(ValidationError::empty_field("name"));
        }
        if let Some(rate) = self.hourly_rate_cents {
            if !(0..=MAX_HOURLY_RATE_CENTS).contains(&rate) {
                return Err(ValidationError::out_of_range(
                    "hourly_rate_cents",
                    0,
                    MAX_HOURLY_RATE_CENTS,
                    rate,
                ));
            }
        }
        Ok(())
    }

    /// True if the profile's email matches `other` ignoring case and padding.
    pub fn email_matches(&self, other: &str) -> bool {
        normalize_email(&self.email) == normalize_email(other)
    }
}

/// Researcher as persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Researcher {
    pub id: ResearcherId,
    pub email: String,
    pub name: String,
    pub affiliation: Option<String>,
    pub bio: Option<String>,
    pub hourly_rate_cents: Option<i64>,
    pub availability: BTreeMap<String, Vec<String>>,
    /// Platform account linked to this researcher, if any.
    pub user_id: Option<UserId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Researcher {
    /// Builds a new researcher from a profile.
    pub fn from_profile(profile: ResearcherProfile, user_id: Option<UserId>) -> Self {
        let now = Timestamp::now();
        Self {
            id: ResearcherId::new(),
            email: normalize_email(&profile.email),
            name: profile.name.trim().to_string(),
            affiliation: profile.affiliation,
            bio: profile.bio,
            hourly_rate_cents: profile.hourly_rate_cents,
            availability: profile.availability,
            user_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrites mutable fields from a profile, keeping id, email and
    /// creation time. An existing account link survives a profile without one.
    pub fn apply_profile(&mut self, profile: ResearcherProfile, user_id: Option<UserId>) {
        self.name = profile.name.trim().to_string();
        self.affiliation = profile.affiliation;
        self.bio = profile.bio;
        self.hourly_rate_cents = profile.hourly_rate_cents;
        self.availability = profile.availability;
        if user_id.is_some() {
            self.user_id = user_id;
        }
        self.updated_at = Timestamp::now();
    }

    /// True if `user_id` is this researcher's linked account.
    pub fn is_linked_to(&self, user_id: &UserId) -> bool {
        self.user_id.as_ref() == Some(user_id)
    }
}
