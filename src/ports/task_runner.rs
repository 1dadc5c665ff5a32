//! Background task port.
//!
//! Work that must not hold up the triggering request (invitation emails,
//! notifications, payment side effects) is submitted here. Nothing awaits a
//! submitted task, so the runner owns retries and records every outcome.

use std::future::Future;
use std::pin::Pin;

use serde::Serialize;

use crate::domain::foundation::Timestamp;

/// Boxed future produced by one attempt of a task.
pub type TaskFuture = Pin<Box<dyn Future<Output = Result<(), TaskError>> + Send>>;

/// Failure of one attempt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct TaskError {
    pub message: String,
    pub retryable: bool,
}

impl TaskError {
    /// A failure worth another attempt (provider down, database blip).
    pub fn retryable(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            retryable: true,
        }
    }

    /// A failure another attempt cannot fix (invalid state, missing row).
    pub fn permanent(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            retryable: false,
        }
    }
}

/// A named unit of detached work that can be re-run on failure.
pub struct BackgroundTask {
    name: String,
    max_attempts: Option<u32>,
    factory: Box<dyn Fn() -> TaskFuture + Send + Sync>,
}

impl BackgroundTask {
    /// Wraps a closure producing one attempt's future.
    pub fn new<F, Fut>(name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
    {
        Self {
            name: name.into(),
            max_attempts: None,
            factory: Box::new(move || Box::pin(factory())),
        }
    }

    /// Overrides the runner's default attempt budget.
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = Some(attempts.max(1));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn max_attempts(&self) -> Option<u32> {
        self.max_attempts
    }

    /// Starts one attempt.
    pub fn attempt(&self) -> TaskFuture {
        (self.factory)()
    }
}

impl std::fmt::Debug for BackgroundTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackgroundTask")
            .field("name", &self.name)
            .field("max_attempts", &self.max_attempts)
            .finish_non_exhaustive()
    }
}

/// Final result of a task after all attempts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskOutcome {
    pub name: String,
    pub attempts: u32,
    pub succeeded: bool,
    pub error: Option<String>,
    pub finished_at: Timestamp,
}

pub trait TaskRunner: Send + Sync {
    /// Schedules the task and returns immediately.
    fn submit(&self, task: BackgroundTask);
}
