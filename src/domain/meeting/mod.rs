//! Video meeting value types.
//!
//! Sessions only store the join URL. The provider's identifier is recovered
//! from that URL when a meeting has to be updated or deleted.

mod reference;

pub use reference::MeetingRef;

use serde::{Deserialize, Serialize};

use crate::domain::foundation::Timestamp;

/// Parameters for creating a meeting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingRequest {
    pub topic: String,
    pub start_time: Timestamp,
    pub duration_minutes: i64,
    pub agenda: Option<String>,
}

/// Partial update; `None` fields are left untouched by the provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingUpdate {
    pub topic: Option<String>,
    pub start_time: Option<Timestamp>,
    pub duration_minutes: Option<i64>,
    pub agenda: Option<String>,
}

impl MeetingUpdate {
    pub fn is_empty(&self) -> bool {
        self.topic.is_none()
            && self.start_time.is_none()
            && self.duration_minutes.is_none()
            && self.agenda.is_none()
    }
}

/// A meeting as the provider reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingDetails {
    pub id: MeetingRef,
    pub join_url: String,
    pub topic: String,
    pub start_time: Option<Timestamp>,
    pub duration_minutes: Option<i64>,
}
