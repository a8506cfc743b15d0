//! Outbound email adapters.

mod noop;
mod resend;

pub use noop::NoopMailer;
pub use resend::ResendMailer;
