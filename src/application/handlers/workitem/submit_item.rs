//! SubmitItemHandler - the owner turns in their work.

use std::sync::Arc;

use crate::application::notify::StatusNotifier;
use crate::domain::foundation::{DomainError, ErrorCode, UserId, WorkItemId};
use crate::domain::workitem::{SubmissionTiming, WorkItem};
use crate::ports::{Clock, WorkCycleRepository, WorkItemRepository};

use super::{load_cycle, load_item};

#[derive(Debug, Clone)]
pub struct SubmitItemCommand {
    pub item_id: WorkItemId,
    pub acting_user: UserId,
}

#[derive(Debug, Clone)]
pub struct SubmitItemResult {
    pub item: WorkItem,
    /// On-time or late, judged against the cycle's due instant.
    pub timing: Option<SubmissionTiming>,
}

pub struct SubmitItemHandler {
    items: Arc<dyn WorkItemRepository>,
    cycles: Arc<dyn WorkCycleRepository>,
    status_notifier: Arc<StatusNotifier>,
    clock: Arc<dyn Clock>,
}

impl SubmitItemHandler {
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

    pub async fn handle(&self, cmd: SubmitItemCommand) -> Result<SubmitItemResult, DomainError> {
        let now = self.clock.now();
        let stored = load_item(self.items.as_ref(), cmd.item_id).await?;

        if stored.owner() != &cmd.acting_user {
            return Err(DomainError::new(
                ErrorCode::Forbidden,
                "Only the item owner can submit it",
            ));
        }

        let mut item = stored.clone();
        item.submit()?;
        item.apply_audit_rules(&stored, now);
        self.items.update(&item).await?;

        let cycle = load_cycle(self.cycles.as_ref(), item.cycle_id()).await?;
        self.status_notifier.submitted(&cycle, &item, now).await?;

        let timing = item.submission_timing(cycle.due_at());
        Ok(SubmitItemResult { item, timing })
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
    use crate::domain::notification::Category;
    use crate::domain::org::Role;
    use crate::domain::workcycle::WorkCycle;
    use crate::domain::workitem::{ItemStatus, ReviewDecision};
    use crate::ports::UserProfile;

    fn uid(s: &str) -> UserId {
        UserId::new(s).unwrap()
    }

    struct Fixture {
        notifications: Arc<InMemoryNotificationStore>,
        mailer: Arc<RecordingMailer>,
        clock: Arc<FixedClock>,
        handler: SubmitItemHandler,
        item: WorkItem,
    }

    async fn fixture(due_in_days: i64) -> Fixture {
        let now = Timestamp::now();
        let cycles = Arc::new(InMemoryWorkCycleRepository::new());
        let board = Arc::new(InMemoryWorkBoard::new());
        let notifications = Arc::new(InMemoryNotificationStore::new());
        let directory = Arc::new(InMemoryOrgDirectory::new());
        let mailer = Arc::new(RecordingMailer::new());
        let clock = Arc::new(FixedClock::at(now));

        directory.register_profile(UserProfile {
            id: uid("admin-1"),
            display_name: "Admin".into(),
            role: Role::Admin,
            email: Some("admin@example.org".into()),
            is_active: true,
        });
        directory.register_profile(UserProfile {
            id: uid("alice"),
            display_name: "Alice".into(),
            role: Role::User,
            email: None,
            is_active: true,
        });

        let cycle = WorkCycle::new(
            "Q3 report",
            "",
            now.plus_days(due_in_days),
            uid("admin-1"),
            now,
        )
        .unwrap();
        cycles.save(&cycle).await.unwrap();
        let item = WorkItem::new(cycle.id(), uid("alice"), now);
        board.save(&item).await.unwrap();

        let status_notifier = Arc::new(StatusNotifier::new(
            notifications.clone(),
            directory,
            mailer.clone(),
        ));
        let handler = SubmitItemHandler::new(board, cycles, status_notifier, clock.clone());
        Fixture {
            notifications,
            mailer,
            clock,
            handler,
            item,
        }
    }

    #[tokio::test]
    async fn submit_marks_done_pending_and_on_time() {
        let f = fixture(5).await;
        let result = f
            .handler
            .handle(SubmitItemCommand {
                item_id: f.item.id(),
                acting_user: uid("alice"),
            })
            .await
            .unwrap();

        assert_eq!(result.item.status(), ItemStatus::Done);
        assert_eq!(result.item.review_decision(), ReviewDecision::Pending);
        assert!(result.item.submitted_at().is_some());
        assert_eq!(result.timing, Some(SubmissionTiming::OnTime));

        // Creator got the in-app notice and the email.
        let created = f.notifications.all();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].category(), Category::Status);
        assert_eq!(f.mailer.sent().len(), 1);
    }

    #[tokio::test]
    async fn late_submission_is_classified_late() {
        let f = fixture(1).await;
        f.clock.advance_days(3);

        let result = f
            .handler
            .handle(SubmitItemCommand {
                item_id: f.item.id(),
                acting_user: uid("alice"),
            })
            .await
            .unwrap();
        assert_eq!(result.timing, Some(SubmissionTiming::Late));
    }

    #[tokio::test]
    async fn double_submit_is_rejected() {
        let f = fixture(5).await;
        let cmd = SubmitItemCommand {
            item_id: f.item.id(),
            acting_user: uid("alice"),
        };
        f.handler.handle(cmd.clone()).await.unwrap();
        let err = f.handler.handle(cmd).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::AlreadySubmitted);
    }

    #[tokio::test]
    async fn only_the_owner_can_submit() {
        let f = fixture(5).await;
        let err = f
            .handler
            .handle(SubmitItemCommand {
                item_id: f.item.id(),
                acting_user: uid("admin-1"),
            })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);
    }
}
