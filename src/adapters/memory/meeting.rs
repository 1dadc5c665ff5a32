//! In-memory meeting provider.
//!
//! Issues `https://meet.local/j/<n>` links and records every call so tests
//! can assert which provider operations happened.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::meeting::{MeetingDetails, MeetingRef, MeetingRequest, MeetingUpdate};
use crate::ports::{MeetingProvider, MeetingProviderError};

/// Provider call, as recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MeetingCall {
    Create(String),
    Get(String),
    Update(String),
    Delete(String),
}

#[derive(Default)]
pub struct InMemoryMeetingProvider {
    meetings: Mutex<HashMap<MeetingRef, MeetingDetails>>,
    calls: Mutex<Vec<MeetingCall>>,
    next_id: AtomicU64,
    failing: AtomicBool,
}

impl InMemoryMeetingProvider {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1_000),
            ..Self::default()
        }
    }

    /// A provider whose every call fails.
    pub fn failing() -> Self {
        let provider = Self::new();
        provider.failing.store(true, Ordering::SeqCst);
        provider
    }

    pub fn calls(&self) -> Vec<MeetingCall> {
        self.calls
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }

    pub fn meeting_count(&self) -> usize {
        self.meetings.lock().unwrap_or_else(|p| p.into_inner()).len()
    }

    pub fn meeting(&self, id: &MeetingRef) -> Option<MeetingDetails> {
        self.meetings
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .get(id)
            .cloned()
    }

    fn record(&self, call: MeetingCall) -> Result<(), MeetingProviderError> {
        self.calls
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(call);
        if self.failing.load(Ordering::SeqCst) {
            return Err(MeetingProviderError::Transport("simulated outage".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl MeetingProvider for InMemoryMeetingProvider {
    async fn create(&self, request: &MeetingRequest) -> Result<MeetingDetails, MeetingProviderError> {
        self.record(MeetingCall::Create(request.topic.clone()))?;

        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        let id = MeetingRef::new(n.to_string())
            .ok_or_else(|| MeetingProviderError::Transport("bad id".to_string()))?;
        let details = MeetingDetails {
            id: id.clone(),
            join_url: format!("https://meet.local/j/{}?pwd=local", n),
            topic: request.topic.clone(),
            start_time: Some(request.start_time),
            duration_minutes: Some(request.duration_minutes),
        };
        self.meetings
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .insert(id, details.clone());
        Ok(details)
    }

    async fn get(&self, meeting: &MeetingRef) -> Result<MeetingDetails, MeetingProviderError> {
        self.record(MeetingCall::Get(meeting.to_string()))?;
        self.meeting(meeting)
            .ok_or_else(|| MeetingProviderError::NotFound(meeting.to_string()))
    }

    async fn update(
        &self,
        meeting: &MeetingRef,
        update: &MeetingUpdate,
    ) -> Result<(), MeetingProviderError> {
        self.record(MeetingCall::Update(meeting.to_string()))?;
        let mut meetings = self.meetings.lock().unwrap_or_else(|p| p.into_inner());
        let details = meetings
            .get_mut(meeting)
            .ok_or_else(|| MeetingProviderError::NotFound(meeting.to_string()))?;
        if let Some(topic) = &update.topic {
            details.topic = topic.clone();
        }
        if let Some(start) = update.start_time {
            details.start_time = Some(start);
        }
        if let Some(duration) = update.duration_minutes {
            details.duration_minutes = Some(duration);
        }
        Ok(())
    }

    async fn delete(&self, meeting: &MeetingRef) -> Result<(), MeetingProviderError> {
        self.record(MeetingCall::Delete(meeting.to_string()))?;
        self.meetings
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .remove(meeting)
            .map(|_| ())
            .ok_or_else(|| MeetingProviderError::NotFound(meeting.to_string()))
    }
}
