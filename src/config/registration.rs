//! Researcher registration configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;

#[derive(Debug, Clone, Deserialize)]
pub struct RegistrationConfig {
    /// HMAC secret for registration tokens
    pub token_secret: SecretString,

    #[serde(default = "default_token_ttl_days")]
    pub token_ttl_days: i64,

    /// Frontend origin the invitation link points at
    pub frontend_base_url: String,
}

impl RegistrationConfig {
    pub fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::days(self.token_ttl_days)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let secret = self.token_secret.expose_secret();
        if secret.is_empty() {
            return Err(ValidationError::MissingRequired("registration.token_secret"));
        }
        if secret.len() < 32 {
            return Err(ValidationError::WeakTokenSecret);
        }
        if self.token_ttl_days <= 0 {
            return Err(ValidationError::MustBePositive("registration.token_ttl_days"));
        }
        if !self.frontend_base_url.starts_with("http://")
            && !self.frontend_base_url.starts_with("https://")
        {
            return Err(ValidationError::InvalidUrl("registration.frontend_base_url"));
        }
        Ok(())
    }
}

fn default_token_ttl_days() -> i64 {
    14
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(secret: &str, url: &str) -> RegistrationConfig {
        RegistrationConfig {
            token_secret: SecretString::new(secret.to_string()),
            token_ttl_days: default_token_ttl_days(),
            frontend_base_url: url.to_string(),
        }
    }

    const STRONG: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn default_ttl_is_two_weeks() {
        assert_eq!(config(STRONG, "https://x").token_ttl().num_days(), 14);
    }

    #[test]
    fn short_secret_is_rejected() {
        assert_eq!(
            config("short", "https://x").validate(),
            Err(ValidationError::WeakTokenSecret)
        );
    }

    #[test]
    fn frontend_url_needs_scheme() {
        assert_eq!(
            config(STRONG, "app.example.com").validate(),
            Err(ValidationError::InvalidUrl("registration.frontend_base_url"))
        );
        assert!(config(STRONG, "https://app.example.com").validate().is_ok());
    }
}
