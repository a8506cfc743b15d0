//! Application configuration.
//!
//! Type-safe configuration loaded from environment variables via the
//! `config` and `dotenvy` crates. Variables carry the `WORKTRACK` prefix
//! and nested values use double underscores:
//!
//! - `WORKTRACK__DATABASE__URL=postgres://...`
//! - `WORKTRACK__EMAIL__RESEND_API_KEY=re_...`
//! - `WORKTRACK__SCHEDULER__SWEEP_INTERVAL_SECS=3600`

mod database;
mod email;
mod error;
mod scheduler;

pub use database::DatabaseConfig;
pub use email::EmailConfig;
pub use error::{ConfigError, ValidationError};
pub use scheduler::SchedulerConfig;

use serde::Deserialize;

/// Root application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration (PostgreSQL connection)
    pub database: DatabaseConfig,

    /// Email configuration (Resend)
    #[serde(default)]
    pub email: EmailConfig,

    /// Reminder scheduler configuration
    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

impl AppConfig {
    /// Loads configuration from the environment, reading a `.env` file
    /// first when one is present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when required variables are missing or values
    /// cannot be parsed into their expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("WORKTRACK")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Semantic validation across all sections.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.database.validate()?;
        self.email.validate()?;
        self.scheduler.validate()?;
        Ok(())
    }
}
