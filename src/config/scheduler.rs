//! Reminder scheduler configuration.

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Settings for the periodic reminder sweep.
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConfig {
    /// Whether the background sweep runs at all
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Seconds between sweep passes
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

impl SchedulerConfig {
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.enabled && self.sweep_interval_secs < 60 {
            return Err(ValidationError::SweepIntervalTooShort);
        }
        Ok(())
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            sweep_interval_secs: default_sweep_interval(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_sweep_interval() -> u64 {
    3600
}
