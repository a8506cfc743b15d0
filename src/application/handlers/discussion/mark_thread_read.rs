//! MarkThreadReadHandler - advances a user's read cursor.

use std::sync::Arc;

use crate::domain::discussion::{latest_foreign_message, ReadCursor};
use crate::domain::foundation::{DomainError, MessageId, UserId, WorkItemId};
use crate::ports::{Clock, DiscussionStore, WorkItemRepository};

use crate::application::handlers::workitem::load_item;

#[derive(Debug, Clone)]
pub struct MarkThreadReadCommand {
    pub item_id: WorkItemId,
    pub user: UserId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkThreadReadResult {
    /// The message id the cursor now points at, `None` when the thread has
    /// no foreign messages to read.
    pub advanced_to: Option<MessageId>,
}

pub struct MarkThreadReadHandler {
    items: Arc<dyn WorkItemRepository>,
    discussions: Arc<dyn DiscussionStore>,
    clock: Arc<dyn Clock>,
}

impl MarkThreadReadHandler {
    pub fn new(
        items: Arc<dyn WorkItemRepository>,
        discussions: Arc<dyn DiscussionStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            items,
            discussions,
            clock,
        }
    }

    /// Idempotent: repeated calls, or calls racing a slower reader, settle
    /// on the same cursor because stale advances are dropped by the store.
    pub async fn handle(
        &self,
        cmd: MarkThreadReadCommand,
    ) -> Result<MarkThreadReadResult, DomainError> {
        let now = self.clock.now();
        let item = load_item(self.items.as_ref(), cmd.item_id).await?;

        let messages = self.discussions.messages_for_item(item.id()).await?;
        let Some(latest) = latest_foreign_message(&messages, &cmd.user) else {
            return Ok(MarkThreadReadResult { advanced_to: None });
        };

        self.discussions
            .upsert_cursor(ReadCursor::new(item.id(), cmd.user, latest.id(), now))
            .await?;

        Ok(MarkThreadReadResult {
            advanced_to: Some(latest.id()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{
        FixedClock, InMemoryDiscussionStore, InMemoryWorkBoard,
    };
    use crate::domain::discussion::{unread_count, ThreadMessage};
    use crate::domain::foundation::Timestamp;
    use crate::domain::org::Role;
    use crate::domain::workitem::WorkItem;
    use crate::domain::foundation::WorkCycleId;

    fn uid(s: &str) -> UserId {
        UserId::new(s).unwrap()
    }

    struct Fixture {
        discussions: Arc<InMemoryDiscussionStore>,
        handler: MarkThreadReadHandler,
        item: WorkItem,
    }

    async fn fixture() -> Fixture {
        let now = Timestamp::now();
        let board = Arc::new(InMemoryWorkBoard::new());
        let discussions = Arc::new(InMemoryDiscussionStore::new());
        let clock = Arc::new(FixedClock::at(now));

        let item = WorkItem::new(WorkCycleId::new(), uid("alice"), now);
        board.save(&item).await.unwrap();

        let handler = MarkThreadReadHandler::new(board, discussions.clone(), clock);
        Fixture {
            discussions,
            handler,
            item,
        }
    }

    async fn post(f: &Fixture, sender: &str, body: &str) {
        let role = if sender == "admin-1" { Role::Admin } else { Role::User };
        f.discussions
            .append(
                ThreadMessage::new(f.item.id(), uid(sender), role, body, Timestamp::now())
                    .unwrap(),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn marks_everything_foreign_read() {
        let f = fixture().await;
        post(&f, "admin-1", "How is it going?").await;
        post(&f, "alice", "Almost done").await;
        post(&f, "admin-1", "Good").await;

        let result = f
            .handler
            .handle(MarkThreadReadCommand {
                item_id: f.item.id(),
                user: uid("alice"),
            })
            .await
            .unwrap();
        assert_eq!(result.advanced_to, Some(MessageId::from_i64(3)));

        let messages = f.discussions.messages_for_item(f.item.id()).await.unwrap();
        let cursor = f
            .discussions
            .cursor(f.item.id(), &uid("alice"))
            .await
            .unwrap();
        assert_eq!(unread_count(&messages, &uid("alice"), cursor.as_ref()), 0);
    }

    #[tokio::test]
    async fn repeated_calls_are_idempotent() {
        let f = fixture().await;
        post(&f, "admin-1", "ping").await;

        let cmd = MarkThreadReadCommand {
            item_id: f.item.id(),
            user: uid("alice"),
        };
        let first = f.handler.handle(cmd.clone()).await.unwrap();
        let second = f.handler.handle(cmd).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn empty_thread_is_a_noop() {
        let f = fixture().await;
        let result = f
            .handler
            .handle(MarkThreadReadCommand {
                item_id: f.item.id(),
                user: uid("alice"),
            })
            .await
            .unwrap();
        assert_eq!(result.advanced_to, None);
        assert!(f
            .discussions
            .cursor(f.item.id(), &uid("alice"))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn own_trailing_messages_do_not_move_the_cursor_past_foreign_ones() {
        let f = fixture().await;
        post(&f, "admin-1", "question").await;
        post(&f, "alice", "answer").await;

        let result = f
            .handler
            .handle(MarkThreadReadCommand {
                item_id: f.item.id(),
                user: uid("admin-1"),
            })
            .await
            .unwrap();
        // Admin's read target is alice's message, id 2.
        assert_eq!(result.advanced_to, Some(MessageId::from_i64(2)));
    }
}
