//! Immutable discussion messages attached to a work item.

use crate::domain::foundation::{MessageId, Timestamp, UserId, ValidationError, WorkItemId};
use crate::domain::org::Role;

/// One message in a work item's discussion thread.
///
/// Messages are append-only. Ids are assigned sequentially by the store so
/// read cursors can compare them.
#[derive(Debug, Clone, PartialEq)]
pub struct ThreadMessage {
    id: MessageId,
    work_item: WorkItemId,
    sender: UserId,
    sender_role: Role,
    body: String,
    created_at: Timestamp,
}

impl ThreadMessage {
    /// Builds a message ready for append. The store assigns the final id.
    pub fn new(
        work_item: WorkItemId,
        sender: UserId,
        sender_role: Role,
        body: impl Into<String>,
        now: Timestamp,
    ) -> Result<Self, ValidationError> {
        let body = body.into();
        if body.trim().is_empty() {
            return Err(ValidationError::empty_field("body"));
        }
        Ok(Self {
            id: MessageId::zero(),
            work_item,
            sender,
            sender_role,
            body,
            created_at: now,
        })
    }

    pub fn reconstitute(
        id: MessageId,
        work_item: WorkItemId,
        sender: UserId,
        sender_role: Role,
        body: String,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            work_item,
            sender,
            sender_role,
            body,
            created_at,
        }
    }

    /// Returns a copy with the store-assigned id.
    pub fn with_id(mut self, id: MessageId) -> Self {
        self.id = id;
        self
    }

    pub fn id(&self) -> MessageId {
        self.id
    }

    pub fn work_item(&self) -> WorkItemId {
        self.work_item
    }

    pub fn sender(&self) -> &UserId {
        &self.sender
    }

    pub fn sender_role(&self) -> Role {
        self.sender_role
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }
}
