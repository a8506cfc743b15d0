//! Email configuration (Resend).

use serde::Deserialize;

use super::error::ValidationError;

/// Outbound email settings.
///
/// Email is optional: when `enabled` is false the engine creates in-app
/// notifications only.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    /// Whether to send email at all
    #[serde(default)]
    pub enabled: bool,

    /// Resend API key
    #[serde(default)]
    pub resend_api_key: String,

    /// From email address
    #[serde(default = "default_from_email")]
    pub from_email: String,

    /// From name
    #[serde(default = "default_from_name")]
    pub from_name: String,
}

impl EmailConfig {
    /// Formatted "From" header value.
    pub fn from_header(&self) -> String {
        format!("{} <{}>", self.from_name, self.from_email)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.enabled {
            return Ok(());
        }
        if self.resend_api_key.is_empty() {
            return Err(ValidationError::MissingRequired("RESEND_API_KEY"));
        }
        if !self.resend_api_key.starts_with("re_") {
            return Err(ValidationError::InvalidResendKey);
        }
        if !self.from_email.contains('@') {
            return Err(ValidationError::InvalidFromEmail);
        }
        Ok(())
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            resend_api_key: String::new(),
            from_email: default_from_email(),
            from_name: default_from_name(),
        }
    }
}

fn default_from_email() -> String {
    "noreply@worktrack.local".to_string()
}

fn default_from_name() -> String {
    "Worktrack".to_string()
}
