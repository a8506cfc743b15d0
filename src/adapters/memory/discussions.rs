//! In-memory discussion store with a process-wide message sequence.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::discussion::{ReadCursor, ThreadMessage};
use crate::domain::foundation::{DomainError, MessageId, UserId, WorkItemId};
use crate::ports::DiscussionStore;

#[derive(Default)]
struct DiscussionState {
    messages: Vec<ThreadMessage>,
    cursors: HashMap<(WorkItemId, UserId), ReadCursor>,
    next_id: i64,
}

#[derive(Default)]
pub struct InMemoryDiscussionStore {
    state: Mutex<DiscussionState>,
}

impl InMemoryDiscussionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DiscussionStore for InMemoryDiscussionStore {
    async fn append(&self, message: ThreadMessage) -> Result<ThreadMessage, DomainError> {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let stored = message.with_id(MessageId::from_i64(state.next_id));
        state.messages.push(stored.clone());
        Ok(stored)
    }

    async fn messages_for_item(
        &self,
        work_item: WorkItemId,
    ) -> Result<Vec<ThreadMessage>, DomainError> {
        let state = self.state.lock().unwrap();
        let mut messages: Vec<ThreadMessage> = state
            .messages
            .iter()
            .filter(|m| m.work_item() == work_item)
            .cloned()
            .collect();
        messages.sort_by_key(|m| m.id());
        Ok(messages)
    }

    async fn cursor(
        &self,
        work_item: WorkItemId,
        user: &UserId,
    ) -> Result<Option<ReadCursor>, DomainError> {
        let state = self.state.lock().unwrap();
        Ok(state.cursors.get(&(work_item, user.clone())).cloned())
    }

    async fn upsert_cursor(&self, cursor: ReadCursor) -> Result<(), DomainError> {
        let mut state = self.state.lock().unwrap();
        let key = (cursor.work_item(), cursor.user().clone());
        match state.cursors.get_mut(&key) {
            Some(existing) => {
                existing.advance(cursor.last_read_message(), cursor.last_read_at());
            }
            None => {
                state.cursors.insert(key, cursor);
            }
        }
        Ok(())
    }
}
