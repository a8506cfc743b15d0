//! Notification services.
//!
//! Two paths feed the notification store. The event path runs inline with
//! commands (assignment changes, status changes, reviews, system notices);
//! the milestone sweep runs on a schedule. Both converge on the store's
//! dedup contract, and both treat email as best-effort: an undeliverable
//! email is logged and swallowed, never surfaced to the triggering command.

mod assignment;
mod review;
mod status;
mod sweep;
mod system;

pub use assignment::AssignmentNotifier;
pub use review::ReviewNotifier;
pub use status::StatusNotifier;
pub use sweep::{ReminderSweep, SweepReport};
pub use system::SystemNotifier;

use tracing::warn;

use crate::ports::{MailMessage, Mailer, UserProfile};

/// Sends one email if the profile has an address, logging failures.
pub(crate) async fn email_best_effort(
    mailer: &dyn Mailer,
    profile: &UserProfile,
    subject: String,
    body: String,
) {
    let Some(address) = profile.email.as_deref() else {
        return;
    };
    let message = MailMessage {
        to: address.to_string(),
        subject,
        body,
    };
    if let Err(err) = mailer.send(message).await {
        warn!(user = %profile.id, error = %err, "email delivery failed");
    }
}
