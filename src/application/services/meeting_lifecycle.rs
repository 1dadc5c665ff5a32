//! Meeting lifecycle service.
//!
//! Wraps the optional meeting provider so session handlers never see a
//! provider failure: `create` yields `None`, `update`/`delete` yield `false`,
//! and every failure is logged.
//!
//! It also owns the per-session locks. Every handler that writes a session
//! holds the lock across its read, the provider call and the write, so
//! meeting calls and status changes for one session never interleave.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::OwnedMutexGuard;

use crate::domain::foundation::SessionId;
use crate::domain::meeting::{MeetingDetails, MeetingRef, MeetingRequest, MeetingUpdate};
use crate::ports::MeetingProvider;

type SessionLocks = Arc<Mutex<HashMap<SessionId, Arc<tokio::sync::Mutex<()>>>>>;

pub struct MeetingLifecycle {
    provider: Option<Arc<dyn MeetingProvider>>,
    locks: SessionLocks,
}

/// Exclusive hold on one session.
///
/// The lock entry is removed when the last holder drops its guard and
/// nobody is waiting.
pub struct SessionGuard {
    guard: Option<OwnedMutexGuard<()>>,
    session_id: SessionId,
    locks: SessionLocks,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        drop(self.guard.take());
        let mut locks = self.locks.lock().unwrap_or_else(|p| p.into_inner());
        // Holders and waiters each own a clone; the map owns the last one.
        let idle = locks
            .get(&self.session_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1);
        if idle {
            locks.remove(&self.session_id);
        }
    }
}

impl MeetingLifecycle {
    pub fn new(provider: Arc<dyn MeetingProvider>) -> Self {
        Self {
            provider: Some(provider),
            locks: SessionLocks::default(),
        }
    }

    /// No provider configured: sessions are booked without video links.
    pub fn disabled() -> Self {
        Self {
            provider: None,
            locks: SessionLocks::default(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.provider.is_some()
    }

    /// Acquires the lock for a session.
    pub async fn lock_session(&self, session_id: SessionId) -> SessionGuard {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|p| p.into_inner());
            locks.entry(session_id).or_default().clone()
        };
        SessionGuard {
            guard: Some(lock.lock_owned().await),
            session_id,
            locks: self.locks.clone(),
        }
    }

    /// Sessions with a held or awaited lock.
    #[cfg(test)]
    pub(crate) fn locked_sessions(&self) -> usize {
        self.locks.lock().unwrap_or_else(|p| p.into_inner()).len()
    }

    /// Creates a meeting and returns its join URL.
    pub async fn create(&self, request: &MeetingRequest) -> Option<String> {
        let provider = self.provider.as_ref()?;
        match provider.create(request).await {
            Ok(details) => {
                tracing::info!(meeting_id = %details.id, topic = %request.topic, "Meeting created");
                Some(details.join_url)
            }
            Err(e) => {
                tracing::warn!(error = %e, topic = %request.topic, "Meeting creation failed; booking without link");
                None
            }
        }
    }

    /// Fetches the meeting behind a stored link.
    pub async fn get(&self, meeting_link: Option<&str>) -> Option<MeetingDetails> {
        let (provider, meeting) = self.resolve(meeting_link)?;
        match provider.get(&meeting).await {
            Ok(details) => Some(details),
            Err(e) => {
                tracing::warn!(meeting_id = %meeting, error = %e, "Meeting lookup failed");
                None
            }
        }
    }

    /// Applies an update to the meeting behind a stored link.
    pub async fn update(&self, meeting_link: Option<&str>, update: &MeetingUpdate) -> bool {
        if update.is_empty() {
            return false;
        }
        let Some((provider, meeting)) = self.resolve(meeting_link) else {
            return false;
        };
        match provider.update(&meeting, update).await {
            Ok(()) => {
                tracing::info!(meeting_id = %meeting, "Meeting updated");
                true
            }
            Err(e) => {
                tracing::warn!(meeting_id = %meeting, error = %e, "Meeting update failed");
                false
            }
        }
    }

    /// Deletes the meeting behind a stored link.
    pub async fn delete(&self, meeting_link: Option<&str>) -> bool {
        let Some((provider, meeting)) = self.resolve(meeting_link) else {
            return false;
        };
        match provider.delete(&meeting).await {
            Ok(()) => {
                tracing::info!(meeting_id = %meeting, "Meeting deleted");
                true
            }
            Err(e) => {
                tracing::warn!(meeting_id = %meeting, error = %e, "Meeting deletion failed");
                false
            }
        }
    }

    fn resolve(&self, meeting_link: Option<&str>) -> Option<(&Arc<dyn MeetingProvider>, MeetingRef)> {
        let provider = self.provider.as_ref()?;
        let link = meeting_link?;
        match MeetingRef::from_join_url(link) {
            Some(meeting) => Some((provider, meeting)),
            None => {
                tracing::warn!(meeting_link = %link, "Unrecognized meeting link; skipping provider call");
                None
            }
        }
    }
}
