//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables with the
//! `config` and `dotenvy` crates. Variables use the `PAPER_CONSULT` prefix
//! and `__` between nested keys.
//!
//! # Example
//!
//! ```no_run
//! use paper_consult::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod consulting;
mod database;
mod email;
mod error;
mod meeting;
mod payment;
mod registration;
mod server;

pub use consulting::ConsultingConfig;
pub use database::DatabaseConfig;
pub use email::EmailConfig;
pub use error::{ConfigError, ValidationError};
pub use meeting::{MeetingConfig, MeetingCredentials};
pub use payment::PaymentConfig;
pub use registration::RegistrationConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    pub database: DatabaseConfig,

    /// Transactional email (Resend)
    pub email: EmailConfig,

    /// Webhook verification (Stripe)
    pub payment: PaymentConfig,

    /// Video meetings (Zoom); optional credentials
    #[serde(default)]
    pub meeting: MeetingConfig,

    pub registration: RegistrationConfig,

    #[serde(default)]
    pub consulting: ConsultingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Reads `.env` when present, then `PAPER_CONSULT__SECTION__KEY`
    /// variables:
    ///
    /// - `PAPER_CONSULT__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `PAPER_CONSULT__DATABASE__URL=...` -> `database.url = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when required values are missing or cannot be
    /// parsed.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("PAPER_CONSULT")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Semantic validation of every section.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.email.validate()?;
        self.payment.validate()?;
        self.meeting.validate()?;
        self.registration.validate()?;
        self.consulting.validate()?;
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
