//! TokioTaskRunner - spawns background tasks with retries and an outcome journal.
//!
//! ## Configuration
//!
//! | Setting | Default | Description |
//! |---------|---------|-------------|
//! | `default_max_attempts` | 3 | Attempts for tasks that don't set their own |
//! | `retry_backoff` | 500ms | Pause between attempts |
//! | `journal_capacity` | 1000 | Outcomes kept, oldest dropped first |
//!
//! ## Shutdown
//!
//! `wait_idle` joins every in-flight task, including tasks submitted by
//! tasks, so the binary can drain work before exiting.

use std::collections::VecDeque;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::FutureExt;
use tokio::task::JoinHandle;

use crate::domain::foundation::Timestamp;
use crate::ports::{BackgroundTask, TaskOutcome, TaskRunner};

/// Configuration for the TokioTaskRunner.
#[derive(Debug, Clone)]
pub struct TaskRunnerConfig {
    /// Attempts for tasks without their own budget.
    pub default_max_attempts: u32,

    /// Pause between a failed attempt and the next one.
    pub retry_backoff: Duration,

    /// Maximum outcomes retained.
    pub journal_capacity: usize,
}

impl Default for TaskRunnerConfig {
    fn default() -> Self {
        Self {
            default_max_attempts: 3,
            retry_backoff: Duration::from_millis(500),
            journal_capacity: 1_000,
        }
    }
}

impl TaskRunnerConfig {
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.default_max_attempts = attempts.max(1);
        self
    }

    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    pub fn with_journal_capacity(mut self, capacity: usize) -> Self {
        self.journal_capacity = capacity.max(1);
        self
    }
}

type Journal = Arc<Mutex<VecDeque<TaskOutcome>>>;

/// Task runner backed by `tokio::spawn`.
pub struct TokioTaskRunner {
    config: TaskRunnerConfig,
    journal: Journal,
    in_flight: Mutex<Vec<JoinHandle<()>>>,
}

impl TokioTaskRunner {
    pub fn new(config: TaskRunnerConfig) -> Self {
        Self {
            config,
            journal: Arc::new(Mutex::new(VecDeque::new())),
            in_flight: Mutex::new(Vec::new()),
        }
    }

    /// Recorded outcomes, oldest first.
    pub fn outcomes(&self) -> Vec<TaskOutcome> {
        self.journal
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .iter()
            .cloned()
            .collect()
    }

    /// Recorded failures, oldest first.
    pub fn failures(&self) -> Vec<TaskOutcome> {
        self.outcomes().into_iter().filter(|o| !o.succeeded).collect()
    }

    /// Waits until no submitted task is running.
    pub async fn wait_idle(&self) {
        loop {
            let handles = std::mem::take(
                &mut *self.in_flight.lock().unwrap_or_else(|p| p.into_inner()),
            );
            if handles.is_empty() {
                return;
            }
            futures::future::join_all(handles).await;
        }
    }
}

impl Default for TokioTaskRunner {
    fn default() -> Self {
        Self::new(TaskRunnerConfig::default())
    }
}

impl TaskRunner for TokioTaskRunner {
    fn submit(&self, task: BackgroundTask) {
        let config = self.config.clone();
        let journal = self.journal.clone();

        let handle = tokio::spawn(async move {
            let outcome = run_with_retries(&task, &config).await;
            record(&journal, outcome, config.journal_capacity);
        });

        let mut in_flight = self.in_flight.lock().unwrap_or_else(|p| p.into_inner());
        in_flight.retain(|h| !h.is_finished());
        in_flight.push(handle);
    }
}

async fn run_with_retries(task: &BackgroundTask, config: &TaskRunnerConfig) -> TaskOutcome {
    let max_attempts = task
        .max_attempts()
        .unwrap_or(config.default_max_attempts)
        .max(1);
    let mut attempts = 0;
    let mut last_error = None;

    while attempts < max_attempts {
        attempts += 1;

        match AssertUnwindSafe(task.attempt()).catch_unwind().await {
            Ok(Ok(())) => {
                tracing::debug!(task = task.name(), attempts, "Background task succeeded");
                return TaskOutcome {
                    name: task.name().to_string(),
                    attempts,
                    succeeded: true,
                    error: None,
                    finished_at: Timestamp::now(),
                };
            }
            Ok(Err(err)) => {
                tracing::warn!(
                    task = task.name(),
                    attempt = attempts,
                    max_attempts,
                    retryable = err.retryable,
                    error = %err,
                    "Background task attempt failed"
                );
                let retryable = err.retryable;
                last_error = Some(err.message);
                if !retryable {
                    break;
                }
            }
            Err(_) => {
                tracing::error!(task = task.name(), attempt = attempts, "Background task panicked");
                last_error = Some("task panicked".to_string());
                break;
            }
        }

        if attempts < max_attempts && !config.retry_backoff.is_zero() {
            tokio::time::sleep(config.retry_backoff).await;
        }
    }

    tracing::error!(
        task = task.name(),
        attempts,
        error = last_error.as_deref().unwrap_or("unknown"),
        "Background task gave up"
    );
    TaskOutcome {
        name: task.name().to_string(),
        attempts,
        succeeded: false,
        error: last_error,
        finished_at: Timestamp::now(),
    }
}

fn record(journal: &Journal, outcome: TaskOutcome, capacity: usize) {
    let mut journal = journal.lock().unwrap_or_else(|p| p.into_inner());
    while journal.len() >= capacity {
        journal.pop_front();
    }
    journal.push_back(outcome);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::TaskError;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_runner() -> TokioTaskRunner {
        TokioTaskRunner::new(TaskRunnerConfig::default().with_retry_backoff(Duration::ZERO))
    }

    fn flaky(failures: u32, counter: Arc<AtomicU32>) -> BackgroundTask {
        BackgroundTask::new("flaky", move || {
            let counter = counter.clone();
            async move {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                if n < failures {
                    Err(TaskError::retryable("not yet"))
                } else {
                    Ok(())
                }
            }
        })
    }

    #[tokio::test]
    async fn retries_until_success() {
        let runner = fast_runner();
        let counter = Arc::new(AtomicU32::new(0));
        runner.submit(flaky(2, counter.clone()));
        runner.wait_idle().await;

        let outcomes = runner.outcomes();
        assert_eq!(outcomes.len(), 1);
        assert!(outcomes[0].succeeded);
        assert_eq!(outcomes[0].attempts, 3);
    }

    #[tokio::test]
    async fn gives_up_after_budget() {
        let runner = fast_runner();
        let counter = Arc::new(AtomicU32::new(0));
        runner.submit(flaky(10, counter.clone()).with_max_attempts(2));
        runner.wait_idle().await;

        assert_eq!(counter.load(Ordering::SeqCst), 2);
        let failures = runner.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].error.as_deref(), Some("not yet"));
    }

    #[tokio::test]
    async fn permanent_errors_are_not_retried() {
        let runner = fast_runner();
        let counter = Arc::new(AtomicU32::new(0));
        let c = counter.clone();
        runner.submit(BackgroundTask::new("doomed", move || {
            let c = c.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err(TaskError::permanent("session is canceled"))
            }
        }));
        runner.wait_idle().await;

        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(runner.failures()[0].attempts, 1);
    }

    #[tokio::test]
    async fn panics_are_recorded_not_propagated() {
        let runner = fast_runner();
        runner.submit(BackgroundTask::new("boom", || async {
            if true {
                panic!("kaboom");
            }
            Ok(())
        }));
        runner.wait_idle().await;

        let failures = runner.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].error.as_deref(), Some("task panicked"));
    }

    #[tokio::test]
    async fn journal_is_bounded() {
        let runner = TokioTaskRunner::new(
            TaskRunnerConfig::default()
                .with_retry_backoff(Duration::ZERO)
                .with_journal_capacity(2),
        );
        for _ in 0..5 {
            runner.submit(BackgroundTask::new("noop", || async { Ok(()) }));
        }
        runner.wait_idle().await;
        assert_eq!(runner.outcomes().len(), 2);
    }
}
