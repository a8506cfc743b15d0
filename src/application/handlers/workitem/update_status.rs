//! UpdateStatusHandler - the owner's ordinary status toggle.

use std::sync::Arc;

use crate::application::notify::StatusNotifier;
use crate::domain::foundation::{DomainError, ErrorCode, UserId, WorkItemId};
use crate::domain::workitem::{ItemStatus, WorkItem};
use crate::ports::{Clock, WorkCycleRepository, WorkItemRepository};

use super::{load_cycle, load_item};

#[derive(Debug, Clone)]
pub struct UpdateStatusCommand {
    pub item_id: WorkItemId,
    pub new_status: ItemStatus,
    pub acting_user: UserId,
}

#[derive(Debug, Clone)]
pub struct UpdateStatusResult {
    pub item: WorkItem,
}

pub struct UpdateStatusHandler {
    items: Arc<dyn WorkItemRepository>,
    cycles: Arc<dyn WorkCycleRepository>,
    status_notifier: Arc<StatusNotifier>,
    clock: Arc<dyn Clock>,
}

impl UpdateStatusHandler {
    pub fn new(
        items: Arc<dyn WorkItemRepository>,
        cycles: Arc<dyn WorkCycleRepository>,
        status_notifier: Arc<StatusNotifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            items,
            cycles,
            status_notifier,
            clock,
        }
    }

    pub async fn handle(&self, cmd: UpdateStatusCommand) -> Result<UpdateStatusResult, DomainError> {
        let now = self.clock.now();
        let stored = load_item(self.items.as_ref(), cmd.item_id).await?;

        if stored.owner() != &cmd.acting_user {
            return Err(DomainError::new(
                ErrorCode::Forbidden,
                "Only the item owner can change its status",
            ));
        }

        let from = stored.status();
        let mut item = stored.clone();
        item.set_status(cmd.new_status)?;
        item.apply_audit_rules(&stored, now);
        self.items.update(&item).await?;

        if item.status() != from {
            let cycle = load_cycle(self.cycles.as_ref(), item.cycle_id()).await?;
            self.status_notifier
                .status_updated(&cycle, &item, from, now)
                .await?;
        }

        Ok(UpdateStatusResult { item })
    }
}
