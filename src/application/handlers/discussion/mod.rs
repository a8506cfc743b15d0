//! Discussion commands: post a message, mark a thread read.

mod mark_thread_read;
mod post_message;

pub use mark_thread_read::{MarkThreadReadCommand, MarkThreadReadHandler, MarkThreadReadResult};
pub use post_message::{PostMessageCommand, PostMessageHandler, PostMessageResult};
