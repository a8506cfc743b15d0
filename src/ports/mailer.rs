//! Outbound email port.
//!
//! Email is best-effort. Callers log failures and move on; an undeliverable
//! email never fails the operation that triggered it.

use async_trait::async_trait;
use thiserror::Error;

/// One outbound email.
#[derive(Debug, Clone, PartialEq)]
pub struct MailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Error)]
pub enum MailError {
    #[error("mail provider request failed: {0}")]
    Transport(String),
    #[error("mail provider rejected the message: {status}: {detail}")]
    Rejected { status: u16, detail: String },
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: MailMessage) -> Result<(), MailError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mailer_is_object_safe() {
        fn _accepts_dyn(_mailer: &dyn Mailer) {}
    }
}
