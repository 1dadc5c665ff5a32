//! Video meeting provider configuration (Zoom)
//!
//! Credentials are optional: when `api_key` or `api_secret` is absent the
//! service runs without a meeting provider and sessions are booked without
//! a join link.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

#[derive(Debug, Clone, Deserialize)]
pub struct MeetingConfig {
    pub api_key: Option<String>,

    pub api_secret: Option<SecretString>,

    /// Host account that owns created meetings
    #[serde(default = "default_user_id")]
    pub user_id: String,

    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

/// Credentials for a configured provider.
pub struct MeetingCredentials<'a> {
    pub api_key: &'a str,
    pub api_secret: &'a SecretString,
}

impl MeetingConfig {
    /// Both halves of the credential pair, if configured.
    pub fn credentials(&self) -> Option<MeetingCredentials<'_>> {
        let api_key = self.api_key.as_deref().filter(|k| !k.is_empty())?;
        let api_secret = self
            .api_secret
            .as_ref()
            .filter(|s| !s.expose_secret().is_empty())?;
        Some(MeetingCredentials { api_key, api_secret })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let has_key = self.api_key.as_deref().is_some_and(|k| !k.is_empty());
        let has_secret = self
            .api_secret
            .as_ref()
            .is_some_and(|s| !s.expose_secret().is_empty());
        if has_key && !has_secret {
            return Err(ValidationError::MissingRequired("meeting.api_secret"));
        }
        if has_secret && !has_key {
            return Err(ValidationError::MissingRequired("meeting.api_key"));
        }
        if !self.api_base_url.starts_with("http") {
            return Err(ValidationError::InvalidUrl("meeting.api_base_url"));
        }
        if self.timeout_secs == 0 || self.timeout_secs > 120 {
            return Err(ValidationError::InvalidTimeout("meeting.timeout_secs"));
        }
        Ok(())
    }
}

impl Default for MeetingConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_secret: None,
            user_id: default_user_id(),
            api_base_url: default_api_base_url(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_user_id() -> String {
    "me".to_string()
}

fn default_api_base_url() -> String {
    "https://api.zoom.us/v2".to_string()
}

fn default_timeout() -> u64 {
    20
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unconfigured_provider_is_valid() {
        let config = MeetingConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.credentials().is_none());
    }

    #[test]
    fn half_configured_credentials_are_rejected() {
        let config = MeetingConfig {
            api_key: Some("key".to_string()),
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::MissingRequired("meeting.api_secret"))
        );
    }

    #[test]
    fn full_credentials_are_exposed() {
        let config = MeetingConfig {
            api_key: Some("key".to_string()),
            api_secret: Some(SecretString::new("secret".to_string())),
            ..Default::default()
        };
        let creds = config.credentials().unwrap();
        assert_eq!(creds.api_key, "key");
        assert_eq!(creds.api_secret.expose_secret(), "secret");
    }
}
