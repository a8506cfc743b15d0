//! Work item aggregate and its save-time state machine.

mod aggregate;
mod values;

pub use aggregate::{SubmissionTiming, WorkItem};
pub use values::{InactiveReason, ItemStatus, ReviewDecision};
