//! Meeting reference parsed from a join URL.

use serde::{Deserialize, Serialize};

/// Provider-assigned meeting identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MeetingRef(String);

impl MeetingRef {
    /// Wraps a raw identifier. Returns `None` for empty or non-alphanumeric ids.
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric()) {
            return None;
        }
        Some(Self(id))
    }

    /// Extracts the identifier from a join URL such as
    /// `https://zoom.us/j/84512345678?pwd=abc`.
    ///
    /// Any other shape yields `None`; callers then skip the provider call.
    pub fn from_join_url(link: &str) -> Option<Self> {
        let (_, rest) = link.split_once("/j/")?;
        let id = rest
            .split(['?', '/', '#'])
            .next()
            .unwrap_or_default();
        Self::new(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MeetingRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
