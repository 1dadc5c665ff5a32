//! Consulting business rules and background work tuning

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

#[derive(Debug, Clone, Deserialize)]
pub struct ConsultingConfig {
    #[serde(default = "default_subscription_price_cents")]
    pub subscription_price_cents: i64,

    #[serde(default = "default_subscription_validity_days")]
    pub subscription_validity_days: i64,

    /// Minimum notice for a cancellation, in hours
    #[serde(default = "default_cancellation_notice_hours")]
    pub cancellation_notice_hours: i64,

    /// Attempts per background task, including the first
    #[serde(default = "default_task_max_attempts")]
    pub task_max_attempts: u32,

    #[serde(default = "default_task_retry_backoff_ms")]
    pub task_retry_backoff_ms: u64,

    /// Requests left in `created` longer than this are re-dispatched
    #[serde(default = "default_stale_outreach_minutes")]
    pub stale_outreach_minutes: i64,

    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

impl ConsultingConfig {
    pub fn cancellation_notice(&self) -> chrono::Duration {
        chrono::Duration::hours(self.cancellation_notice_hours)
    }

    pub fn stale_outreach_age(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.stale_outreach_minutes)
    }

    pub fn task_retry_backoff(&self) -> Duration {
        Duration::from_millis(self.task_retry_backoff_ms)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.subscription_price_cents <= 0 {
            return Err(ValidationError::MustBePositive("consulting.subscription_price_cents"));
        }
        if self.subscription_validity_days <= 0 {
            return Err(ValidationError::MustBePositive("consulting.subscription_validity_days"));
        }
        if self.cancellation_notice_hours < 0 {
            return Err(ValidationError::MustBePositive("consulting.cancellation_notice_hours"));
        }
        if self.task_max_attempts == 0 {
            return Err(ValidationError::MustBePositive("consulting.task_max_attempts"));
        }
        if self.stale_outreach_minutes <= 0 {
            return Err(ValidationError::MustBePositive("consulting.stale_outreach_minutes"));
        }
        if self.sweep_interval_secs == 0 {
            return Err(ValidationError::MustBePositive("consulting.sweep_interval_secs"));
        }
        Ok(())
    }
}

impl Default for ConsultingConfig {
    fn default() -> Self {
        Self {
            subscription_price_cents: default_subscription_price_cents(),
            subscription_validity_days: default_subscription_validity_days(),
            cancellation_notice_hours: default_cancellation_notice_hours(),
            task_max_attempts: default_task_max_attempts(),
            task_retry_backoff_ms: default_task_retry_backoff_ms(),
            stale_outreach_minutes: default_stale_outreach_minutes(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

fn default_subscription_price_cents() -> i64 {
    4_900
}

fn default_subscription_validity_days() -> i64 {
    30
}

fn default_cancellation_notice_hours() -> i64 {
    24
}

fn default_task_max_attempts() -> u32 {
    3
}

fn default_task_retry_backoff_ms() -> u64 {
    2_000
}

fn default_stale_outreach_minutes() -> i64 {
    15
}

fn default_sweep_interval_secs() -> u64 {
    300
}
