//! Per-item discussion threads and per-user read cursors.

mod message;
mod read_state;

pub use message::ThreadMessage;
pub use read_state::{latest_foreign_message, unread_count, ReadCursor};
