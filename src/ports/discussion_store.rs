//! Discussion thread storage port.

use async_trait::async_trait;

use crate::domain::discussion::{ReadCursor, ThreadMessage};
use crate::domain::foundation::{DomainError, UserId, WorkItemId};

#[async_trait]
pub trait DiscussionStore: Send + Sync {
    /// Appends a message, assigning the next sequential id within the store.
    /// Returns the stored message with its final id.
    async fn append(&self, message: ThreadMessage) -> Result<ThreadMessage, DomainError>;

    /// All messages for one item, in id order.
    async fn messages_for_item(
        &self,
        work_item: WorkItemId,
    ) -> Result<Vec<ThreadMessage>, DomainError>;

    /// The read cursor of one user in one thread, if any.
    async fn cursor(
        &self,
        work_item: WorkItemId,
        user: &UserId,
    ) -> Result<Option<ReadCursor>, DomainError>;

    /// Inserts or advances a cursor. Must never move a cursor backwards;
    /// stale writes are dropped.
    async fn upsert_cursor(&self, cursor: ReadCursor) -> Result<(), DomainError>;
}
