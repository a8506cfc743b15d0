//! DeleteCycleHandler - hard deletion, refused when protected records exist.

use std::sync::Arc;

use crate::application::handlers::require_staff;
use crate::application::notify::SystemNotifier;
use crate::domain::foundation::{DomainError, ErrorCode, UserId, WorkCycleId};
use crate::ports::{Clock, OrgDirectory, WorkCycleRepository, WorkItemRepository};

#[derive(Debug, Clone)]
pub struct DeleteCycleCommand {
    pub cycle_id: WorkCycleId,
    pub performed_by: UserId,
}

#[derive(Debug, Clone)]
pub struct DeleteCycleResult {
    pub title: String,
}

pub struct DeleteCycleHandler {
    cycles: Arc<dyn WorkCycleRepository>,
    items: Arc<dyn WorkItemRepository>,
    directory: Arc<dyn OrgDirectory>,
    system_notifier: Arc<SystemNotifier>,
    clock: Arc<dyn Clock>,
}

impl DeleteCycleHandler {
    pub fn new(
        cycles: Arc<dyn WorkCycleRepository>,
        items: Arc<dyn WorkItemRepository>,
        directory: Arc<dyn OrgDirectory>,
        system_notifier: Arc<SystemNotifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            cycles,
            items,
            directory,
            system_notifier,
            clock,
        }
    }

    pub async fn handle(&self, cmd: DeleteCycleCommand) -> Result<DeleteCycleResult, DomainError> {
        require_staff(self.directory.as_ref(), &cmd.performed_by).await?;
        let now = self.clock.now();

        let cycle = self
            .cycles
            .find_by_id(cmd.cycle_id)
            .await?
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::CycleNotFound,
                    format!("No work cycle with id {}", cmd.cycle_id),
                )
            })?;

        // Owners must be collected before the delete cascades their items.
        let owners: Vec<UserId> = self
            .items
            .list_active_for_cycle(cycle.id())
            .await?
            .iter()
            .map(|i| i.owner().clone())
            .collect();

        // Refused with DeletionBlocked when protected records exist; the
        // error message points the caller at archiving instead.
        self.cycles.delete(cycle.id()).await?;

        self.system_notifier
            .cycle_deleted(cycle.title(), &owners, now)
            .await?;

        Ok(DeleteCycleResult {
            title: cycle.title().to_string(),
        })
    }
}
