//! ToggleArchiveHandler - archives or restores a cycle.

use std::sync::Arc;

use crate::application::handlers::require_staff;
use crate::application::notify::SystemNotifier;
use crate::domain::foundation::{DomainError, ErrorCode, UserId, WorkCycleId};
use crate::domain::workcycle::WorkCycle;
use crate::ports::{Clock, OrgDirectory, WorkCycleRepository, WorkItemRepository};

#[derive(Debug, Clone)]
pub struct ToggleArchiveCommand {
    pub cycle_id: WorkCycleId,
    pub performed_by: UserId,
}

#[derive(Debug, Clone)]
pub struct ToggleArchiveResult {
    pub cycle: WorkCycle,
    pub now_active: bool,
}

pub struct ToggleArchiveHandler {
    cycles: Arc<dyn WorkCycleRepository>,
    items: Arc<dyn WorkItemRepository>,
    directory: Arc<dyn OrgDirectory>,
    system_notifier: Arc<SystemNotifier>,
    clock: Arc<dyn Clock>,
}

impl ToggleArchiveHandler {
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

    pub async fn handle(
        &self,
        cmd: ToggleArchiveCommand,
    ) -> Result<ToggleArchiveResult, DomainError> {
        require_staff(self.directory.as_ref(), &cmd.performed_by).await?;
        let now = self.clock.now();

        let mut cycle = self
            .cycles
            .find_by_id(cmd.cycle_id)
            .await?
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::CycleNotFound,
                    format!("No work cycle with id {}", cmd.cycle_id),
                )
            })?;

        let now_active = cycle.toggle_archive();
        self.cycles.update(&cycle).await?;

        // Owners, the creator, and the actor hear about the flip; items
        // themselves are left untouched, an archived cycle simply stops
        // surfacing.
        let mut recipients: Vec<UserId> = self
            .items
            .list_active_for_cycle(cycle.id())
            .await?
            .iter()
            .map(|i| i.owner().clone())
            .collect();
        if let Some(creator) = cycle.created_by() {
            if !recipients.contains(creator) {
                recipients.push(creator.clone());
            }
        }
        if !recipients.contains(&cmd.performed_by) {
            recipients.push(cmd.performed_by);
        }
        self.system_notifier
            .archive_toggled(&cycle, &recipients, now_active, now)
            .await?;

        Ok(ToggleArchiveResult { cycle, now_active })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{
        FixedClock, InMemoryNotificationStore, InMemoryOrgDirectory, InMemoryWorkBoard,
        InMemoryWorkCycleRepository, RecordingMailer,
    };
    use crate::domain::foundation::Timestamp;
    use crate::domain::org::Role;
    use crate::domain::workcycle::LifecycleState;
    use crate::domain::workitem::WorkItem;
    use crate::ports::UserProfile;

    fn uid(s: &str) -> UserId {
        UserId::new(s).unwrap()
    }

    struct Fixture {
        cycles: Arc<InMemoryWorkCycleRepository>,
        board: Arc<InMemoryWorkBoard>,
        notifications: Arc<InMemoryNotificationStore>,
        handler: ToggleArchiveHandler,
        now: Timestamp,
    }

    fn fixture() -> Fixture {
        let now = Timestamp::now();
        let cycles = Arc::new(InMemoryWorkCycleRepository::new());
        let board = Arc::new(InMemoryWorkBoard::new());
        let notifications = Arc::new(InMemoryNotificationStore::new());
        let directory = Arc::new(InMemoryOrgDirectory::new());
        let clock = Arc::new(FixedClock::at(now));

        directory.register_profile(UserProfile {
            id: uid("admin-1"),
            display_name: "Admin".into(),
            role: Role::Admin,
            email: None,
            is_active: true,
        });
        directory.register_profile(UserProfile {
            id: uid("alice"),
            display_name: "Alice".into(),
            role: Role::User,
            email: None,
            is_active: true,
        });

        let system_notifier = Arc::new(SystemNotifier::new(
            notifications.clone(),
            directory.clone(),
            Arc::new(RecordingMailer::new()),
        ));
        let handler = ToggleArchiveHandler::new(
            cycles.clone(),
            board.clone(),
            directory,
            system_notifier,
            clock,
        );
        Fixture {
            cycles,
            board,
            notifications,
            handler,
            now,
        }
    }

    #[tokio::test]
    async fn archive_then_restore_round_trips() {
        let f = fixture();
        let cycle =
            WorkCycle::new("Q3 report", "", f.now.plus_days(10), uid("admin-1"), f.now).unwrap();
        f.cycles.save(&cycle).await.unwrap();
        f.board
            .save(&WorkItem::new(cycle.id(), uid("alice"), f.now))
            .await
            .unwrap();

        let result = f
            .handler
            .handle(ToggleArchiveCommand {
                cycle_id: cycle.id(),
                performed_by: uid("admin-1"),
            })
            .await
            .unwrap();
        assert!(!result.now_active);
        assert_eq!(result.cycle.lifecycle(f.now), LifecycleState::Archived);

        // Owner and actor each got an in-app notice.
        assert_eq!(f.notifications.all().len(), 2);

        let result = f
            .handler
            .handle(ToggleArchiveCommand {
                cycle_id: cycle.id(),
                performed_by: uid("admin-1"),
            })
            .await
            .unwrap();
        assert!(result.now_active);
        assert_eq!(result.cycle.lifecycle(f.now), LifecycleState::Ongoing);
    }

    #[tokio::test]
    async fn non_staff_cannot_toggle() {
        let f = fixture();
        let cycle =
            WorkCycle::new("Q3 report", "", f.now.plus_days(10), uid("admin-1"), f.now).unwrap();
        f.cycles.save(&cycle).await.unwrap();

        let err = f
            .handler
            .handle(ToggleArchiveCommand {
                cycle_id: cycle.id(),
                performed_by: uid("alice"),
            })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);
    }
}
