//! Mailer used when outbound email is disabled.

use async_trait::async_trait;
use tracing::debug;

use crate::ports::{MailError, MailMessage, Mailer};

/// Accepts every message and sends nothing.
pub struct NoopMailer;

#[async_trait]
impl Mailer for NoopMailer {
    async fn send(&self, message: MailMessage) -> Result<(), MailError> {
        debug!(to = %message.to, subject = %message.subject, "email disabled, dropping message");
        Ok(())
    }
}
