//! EditCycleHandler - edits a cycle and propagates due date changes.

use std::sync::Arc;

use crate::application::handlers::require_staff;
use crate::application::notify::{ReminderSweep, SystemNotifier};
use crate::domain::foundation::{DomainError, ErrorCode, Timestamp, UserId, WorkCycleId};
use crate::domain::workcycle::WorkCycle;
use crate::ports::{Clock, OrgDirectory, WorkCycleRepository, WorkItemRepository};

/// Command to edit a work cycle's details.
#[derive(Debug, Clone)]
pub struct EditCycleCommand {
    pub cycle_id: WorkCycleId,
    pub title: String,
    pub description: String,
    pub due_at: Timestamp,
    pub performed_by: UserId,
}

#[derive(Debug, Clone)]
pub struct EditCycleResult {
    pub cycle: WorkCycle,
    pub due_changed: bool,
}

pub struct EditCycleHandler {
    cycles: Arc<dyn WorkCycleRepository>,
    items: Arc<dyn WorkItemRepository>,
    directory: Arc<dyn OrgDirectory>,
    system_notifier: Arc<SystemNotifier>,
    sweep: Arc<ReminderSweep>,
    clock: Arc<dyn Clock>,
}

impl EditCycleHandler {
    pub fn new(
        cycles: Arc<dyn WorkCycleRepository>,
        items: Arc<dyn WorkItemRepository>,
        directory: Arc<dyn OrgDirectory>,
        system_notifier: Arc<SystemNotifier>,
        sweep: Arc<ReminderSweep>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            cycles,
            items,
            directory,
            system_notifier,
            sweep,
            clock,
        }
    }

    pub async fn handle(&self, cmd: EditCycleCommand) -> Result<EditCycleResult, DomainError> {
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

        let old_due = cycle.edit(cmd.title, cmd.description, cmd.due_at)?;
        self.cycles.update(&cycle).await?;

        let due_changed = old_due != cycle.due_at();
        if due_changed && cycle.is_active() {
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
            self.system_notifier
                .cycle_edited(&cycle, &recipients, now)
                .await?;

            // A due date pulled into a milestone window shouldn't wait for
            // the next scheduled pass.
            self.sweep.evaluate_cycle(&cycle, now).await?;
        }

        Ok(EditCycleResult { cycle, due_changed })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{
        FixedClock, InMemoryNotificationStore, InMemoryOrgDirectory, InMemoryWorkBoard,
        InMemoryWorkCycleRepository, RecordingMailer,
    };
    use crate::domain::notification::Category;
    use crate::domain::org::Role;
    use crate::domain::workitem::WorkItem;
    use crate::ports::UserProfile;

    fn uid(s: &str) -> UserId {
        UserId::new(s).unwrap()
    }

    struct Fixture {
        cycles: Arc<InMemoryWorkCycleRepository>,
        board: Arc<InMemoryWorkBoard>,
        notifications: Arc<InMemoryNotificationStore>,
        handler: EditCycleHandler,
        now: Timestamp,
    }

    fn fixture() -> Fixture {
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
            mailer.clone(),
        ));
        let sweep = Arc::new(ReminderSweep::new(
            cycles.clone(),
            board.clone(),
            notifications.clone(),
            directory.clone(),
            mailer,
            clock.clone(),
        ));
        let handler = EditCycleHandler::new(
            cycles.clone(),
            board.clone(),
            directory,
            system_notifier,
            sweep,
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

    async fn seed(f: &Fixture, due_in_days: i64) -> WorkCycle {
        let cycle = WorkCycle::new(
            "Q3 report",
            "",
            f.now.plus_days(due_in_days),
            uid("admin-1"),
            f.now,
        )
        .unwrap();
        f.cycles.save(&cycle).await.unwrap();
        f.board
            .save(&WorkItem::new(cycle.id(), uid("alice"), f.now))
            .await
            .unwrap();
        cycle
    }

    #[tokio::test]
    async fn title_only_edit_stays_quiet() {
        let f = fixture();
        let cycle = seed(&f, 10).await;

        let result = f
            .handler
            .handle(EditCycleCommand {
                cycle_id: cycle.id(),
                title: "Q3 report (final)".into(),
                description: "".into(),
                due_at: cycle.due_at(),
                performed_by: uid("admin-1"),
            })
            .await
            .unwrap();

        assert!(!result.due_changed);
        assert!(f.notifications.all().is_empty());
    }

    #[tokio::test]
    async fn due_change_notifies_and_reevaluates_milestones() {
        let f = fixture();
        let cycle = seed(&f, 10).await;

        // Pull the deadline straight into the 3-day window.
        let result = f
            .handler
            .handle(EditCycleCommand {
                cycle_id: cycle.id(),
                title: "Q3 report".into(),
                description: "".into(),
                due_at: f.now.plus_days(3),
                performed_by: uid("admin-1"),
            })
            .await
            .unwrap();

        assert!(result.due_changed);
        let created = f.notifications.all();
        let system: Vec<_> = created
            .iter()
            .filter(|n| n.category() == Category::System)
            .collect();
        let reminders: Vec<_> = created
            .iter()
            .filter(|n| n.category() == Category::Reminder)
            .collect();
        // The owner and the creator both hear about the new due date.
        assert_eq!(system.len(), 2);
        assert!(system.iter().any(|n| n.recipient() == &uid("alice")));
        assert!(system.iter().any(|n| n.recipient() == &uid("admin-1")));
        // Day 3 milestone fires immediately: the creator's cycle reminder
        // plus the owner's item reminder.
        assert_eq!(reminders.len(), 2);
        assert!(reminders
            .iter()
            .any(|n| n.recipient() == &uid("admin-1") && n.title().starts_with("Work cycle due")));
        assert!(reminders
            .iter()
            .any(|n| n.recipient() == &uid("alice") && n.title().starts_with("Submission due")));
    }

    #[tokio::test]
    async fn unknown_cycle_is_rejected() {
        let f = fixture();
        let err = f
            .handler
            .handle(EditCycleCommand {
                cycle_id: WorkCycleId::new(),
                title: "x".into(),
                description: "".into(),
                due_at: f.now,
                performed_by: uid("admin-1"),
            })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::CycleNotFound);
    }
}
