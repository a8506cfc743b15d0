//! PostMessageHandler - appends to a work item's discussion thread.

use std::sync::Arc;

use crate::application::notify::SystemNotifier;
use crate::domain::discussion::ThreadMessage;
use crate::domain::foundation::{DomainError, ErrorCode, UserId, WorkItemId};
use crate::ports::{Clock, DiscussionStore, OrgDirectory, WorkCycleRepository, WorkItemRepository};

use crate::application::handlers::workitem::{load_cycle, load_item};

#[derive(Debug, Clone)]
pub struct PostMessageCommand {
    pub item_id: WorkItemId,
    pub sender: UserId,
    pub body: String,
}

#[derive(Debug, Clone)]
pub struct PostMessageResult {
    pub message: ThreadMessage,
}

pub struct PostMessageHandler {
    items: Arc<dyn WorkItemRepository>,
    cycles: Arc<dyn WorkCycleRepository>,
    directory: Arc<dyn OrgDirectory>,
    discussions: Arc<dyn DiscussionStore>,
    system_notifier: Arc<SystemNotifier>,
    clock: Arc<dyn Clock>,
}

impl PostMessageHandler {
    pub fn new(
        items: Arc<dyn WorkItemRepository>,
        cycles: Arc<dyn WorkCycleRepository>,
        directory: Arc<dyn OrgDirectory>,
        discussions: Arc<dyn DiscussionStore>,
        system_notifier: Arc<SystemNotifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            items,
            cycles,
            directory,
            discussions,
            system_notifier,
            clock,
        }
    }

    pub async fn handle(&self, cmd: PostMessageCommand) -> Result<PostMessageResult, DomainError> {
        let now = self.clock.now();
        let item = load_item(self.items.as_ref(), cmd.item_id).await?;

        // Threads are between the owner and staff; bystanders stay out.
        let sender_profile = self.directory.profile(&cmd.sender).await?;
        if item.owner() != &cmd.sender && !sender_profile.role.is_staff() {
            return Err(DomainError::new(
                ErrorCode::Forbidden,
                "Only the item owner and staff can post in this thread",
            ));
        }

        let message = ThreadMessage::new(
            item.id(),
            cmd.sender,
            sender_profile.role,
            cmd.body,
            now,
        )?;
        let message = self.discussions.append(message).await?;

        let cycle = load_cycle(self.cycles.as_ref(), item.cycle_id()).await?;
        self.system_notifier
            .message_posted(&cycle, &item, &message, now)
            .await?;

        Ok(PostMessageResult { message })
    }
}
