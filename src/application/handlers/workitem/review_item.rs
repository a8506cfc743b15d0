//! ReviewItemHandler - staff records a decision on a submitted item.

use std::sync::Arc;

use crate::application::handlers::require_staff;
use crate::application::notify::ReviewNotifier;
use crate::domain::discussion::ThreadMessage;
use crate::domain::foundation::{DomainError, UserId, WorkItemId};
use crate::domain::workitem::{ReviewDecision, WorkItem};
use crate::ports::{Clock, DiscussionStore, OrgDirectory, WorkCycleRepository, WorkItemRepository};

use super::{load_cycle, load_item};

#[derive(Debug, Clone)]
pub struct ReviewItemCommand {
    pub item_id: WorkItemId,
    pub decision: ReviewDecision,
    pub reviewer: UserId,
    /// Optional note appended to the item's discussion thread.
    pub note: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ReviewItemResult {
    pub item: WorkItem,
}

pub struct ReviewItemHandler {
    items: Arc<dyn WorkItemRepository>,
    cycles: Arc<dyn WorkCycleRepository>,
    directory: Arc<dyn OrgDirectory>,
    discussions: Arc<dyn DiscussionStore>,
    review_notifier: Arc<ReviewNotifier>,
    clock: Arc<dyn Clock>,
}

impl ReviewItemHandler {
    pub fn new(
        items: Arc<dyn WorkItemRepository>,
        cycles: Arc<dyn WorkCycleRepository>,
        directory: Arc<dyn OrgDirectory>,
        discussions: Arc<dyn DiscussionStore>,
        review_notifier: Arc<ReviewNotifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            items,
            cycles,
            directory,
            discussions,
            review_notifier,
            clock,
        }
    }

    pub async fn handle(&self, cmd: ReviewItemCommand) -> Result<ReviewItemResult, DomainError> {
        require_staff(self.directory.as_ref(), &cmd.reviewer).await?;
        let now = self.clock.now();

        let stored = load_item(self.items.as_ref(), cmd.item_id).await?;
        let mut item = stored.clone();
        item.review(cmd.decision)?;
        item.apply_audit_rules(&stored, now);
        self.items.update(&item).await?;

        // The note lands in the thread so the decision and its reasoning
        // stay in one place.
        if let Some(note) = cmd.note.filter(|n| !n.trim().is_empty()) {
            let reviewer_profile = self.directory.profile(&cmd.reviewer).await?;
            let message = ThreadMessage::new(
                item.id(),
                cmd.reviewer.clone(),
                reviewer_profile.role,
                note,
                now,
            )?;
            self.discussions.append(message).await?;
        }

        let cycle = load_cycle(self.cycles.as_ref(), item.cycle_id()).await?;
        self.review_notifier
            .decision_recorded(&cycle, &item, cmd.decision, now)
            .await?;

        Ok(ReviewItemResult { item })
    }
}
