//! UndoSubmissionHandler - pulls a submission back while review is pending.

use std::sync::Arc;

use crate::application::notify::StatusNotifier;
use crate::domain::foundation::{DomainError, ErrorCode, UserId, WorkItemId};
use crate::domain::workitem::WorkItem;
use crate::ports::{Clock, WorkCycleRepository, WorkItemRepository};

use super::{load_cycle, load_item};

#[derive(Debug, Clone)]
pub struct UndoSubmissionCommand {
    pub item_id: WorkItemId,
    pub acting_user: UserId,
}

#[derive(Debug, Clone)]
pub struct UndoSubmissionResult {
    pub item: WorkItem,
}

pub struct UndoSubmissionHandler {
    items: Arc<dyn WorkItemRepository>,
    cycles: Arc<dyn WorkCycleRepository>,
    status_notifier: Arc<StatusNotifier>,
    clock: Arc<dyn Clock>,
}

impl UndoSubmissionHandler {
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

    pub async fn handle(
        &self,
        cmd: UndoSubmissionCommand,
    ) -> Result<UndoSubmissionResult, DomainError> {
        let now = self.clock.now();
        let stored = load_item(self.items.as_ref(), cmd.item_id).await?;

        if stored.owner() != &cmd.acting_user {
            return Err(DomainError::new(
                ErrorCode::Forbidden,
                "Only the item owner can revert a submission",
            ));
        }

        let mut item = stored.clone();
        item.undo_submission()?;
        item.apply_audit_rules(&stored, now);
        self.items.update(&item).await?;

        let cycle = load_cycle(self.cycles.as_ref(), item.cycle_id()).await?;
        self.status_notifier
            .submission_reverted(&cycle, &item, now)
            .await?;

        Ok(UndoSubmissionResult { item })
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
    use crate::domain::workcycle::WorkCycle;
    use crate::domain::workitem::{ItemStatus, ReviewDecision};
    use crate::ports::UserProfile;

    fn uid(s: &str) -> UserId {
        UserId::new(s).unwrap()
    }

    struct Fixture {
        board: Arc<InMemoryWorkBoard>,
        handler: UndoSubmissionHandler,
        item: WorkItem,
    }

    async fn fixture(submitted: bool, reviewed: bool) -> Fixture {
        let now = Timestamp::now();
        let cycles = Arc::new(InMemoryWorkCycleRepository::new());
        let board = Arc::new(InMemoryWorkBoard::new());
        let notifications = Arc::new(InMemoryNotificationStore::new());
        let directory = Arc::new(InMemoryOrgDirectory::new());
        let clock = Arc::new(FixedClock::at(now));

        for (name, role) in [("admin-1", Role::Admin), ("alice", Role::User)] {
            directory.register_profile(UserProfile {
                id: uid(name),
                display_name: name.to_string(),
                role,
                email: None,
                is_active: true,
            });
        }

        let cycle =
            WorkCycle::new("Q3 report", "", now.plus_days(10), uid("admin-1"), now).unwrap();
        cycles.save(&cycle).await.unwrap();

        let mut item = WorkItem::new(cycle.id(), uid("alice"), now);
        if submitted {
            let stored = item.clone();
            item.submit().unwrap();
            item.apply_audit_rules(&stored, now);
        }
        if reviewed {
            let stored = item.clone();
            item.review(ReviewDecision::Approved).unwrap();
            item.apply_audit_rules(&stored, now);
        }
        board.save(&item).await.unwrap();

        let status_notifier = Arc::new(StatusNotifier::new(
            notifications,
            directory,
            Arc::new(RecordingMailer::new()),
        ));
        let handler = UndoSubmissionHandler::new(board.clone(), cycles, status_notifier, clock);
        Fixture {
            board,
            handler,
            item,
        }
    }

    #[tokio::test]
    async fn undo_returns_to_working_and_clears_the_stamp() {
        let f = fixture(true, false).await;
        let result = f
            .handler
            .handle(UndoSubmissionCommand {
                item_id: f.item.id(),
                acting_user: uid("alice"),
            })
            .await
            .unwrap();

        assert_eq!(result.item.status(), ItemStatus::WorkingOnIt);
        assert!(result.item.submitted_at().is_none());

        let stored = f.board.find_by_id(f.item.id()).await.unwrap().unwrap();
        assert!(stored.submitted_at().is_none());
    }

    #[tokio::test]
    async fn undo_after_review_is_refused() {
        let f = fixture(true, true).await;
        let err = f
            .handler
            .handle(UndoSubmissionCommand {
                item_id: f.item.id(),
                acting_user: uid("alice"),
            })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::UndoNotAllowed);
    }

    #[tokio::test]
    async fn undo_without_submission_is_refused() {
        let f = fixture(false, false).await;
        let err = f
            .handler
            .handle(UndoSubmissionCommand {
                item_id: f.item.id(),
                acting_user: uid("alice"),
            })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::UndoNotAllowed);
    }
}
