//! Zoom adapter - implements `MeetingProvider` against the Zoom REST API.

mod client;

pub use client::{ZoomConfig, ZoomMeetingProvider};
