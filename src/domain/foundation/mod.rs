//! Foundation types shared across the domain.

mod errors;
mod ids;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{MessageId, NotificationId, TeamId, UserId, WorkCycleId, WorkItemId};
pub use timestamp::Timestamp;
