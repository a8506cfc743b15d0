//! CreateCycleHandler - creates a cycle and seeds its membership.

use std::sync::Arc;

use crate::application::handlers::require_staff;
use crate::application::notify::AssignmentNotifier;
use crate::domain::foundation::{DomainError, TeamId, Timestamp, UserId};
use crate::domain::workcycle::WorkCycle;
use crate::ports::{
    Clock, OrgDirectory, ReconciliationDirective, ReconciliationOutcome, ReconciliationStore,
    WorkCycleRepository,
};

use super::targets::resolve_targets;

/// Command to create a work cycle.
#[derive(Debug, Clone)]
pub struct CreateCycleCommand {
    pub title: String,
    pub description: String,
    pub due_at: Timestamp,
    pub created_by: UserId,
    pub user_targets: Vec<UserId>,
    pub team_target: Option<TeamId>,
}

/// Result of a successful creation.
#[derive(Debug, Clone)]
pub struct CreateCycleResult {
    pub cycle: WorkCycle,
    pub outcome: ReconciliationOutcome,
}

pub struct CreateCycleHandler {
    cycles: Arc<dyn WorkCycleRepository>,
    reconciliation: Arc<dyn ReconciliationStore>,
    directory: Arc<dyn OrgDirectory>,
    assignment_notifier: Arc<AssignmentNotifier>,
    clock: Arc<dyn Clock>,
}

impl CreateCycleHandler {
    pub fn new(
        cycles: Arc<dyn WorkCycleRepository>,
        reconciliation: Arc<dyn ReconciliationStore>,
        directory: Arc<dyn OrgDirectory>,
        assignment_notifier: Arc<AssignmentNotifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            cycles,
            reconciliation,
            directory,
            assignment_notifier,
            clock,
        }
    }

    pub async fn handle(&self, cmd: CreateCycleCommand) -> Result<CreateCycleResult, DomainError> {
        require_staff(self.directory.as_ref(), &cmd.created_by).await?;
        let now = self.clock.now();

        // 1. Resolve targets before writing anything.
        let resolution =
            resolve_targets(self.directory.as_ref(), &cmd.user_targets, cmd.team_target).await?;

        // 2. Create and persist the cycle.
        let cycle = WorkCycle::new(
            cmd.title,
            cmd.description,
            cmd.due_at,
            cmd.created_by.clone(),
            now,
        )?;
        self.cycles.save(&cycle).await?;

        // 3. Seed membership through the same path reassignment uses.
        let outcome = self
            .reconciliation
            .reconcile(ReconciliationDirective {
                cycle_id: cycle.id(),
                targets: resolution.targets,
                explicit_users: resolution.explicit_users,
                team: resolution.team,
                performed_by: cmd.created_by,
                note: None,
                now,
            })
            .await?;

        // 4. Welcome the new owners.
        let assigned: Vec<UserId> = outcome.newly_added.iter().cloned().collect();
        self.assignment_notifier
            .notify_assigned(&cycle, &assigned, now)
            .await?;

        Ok(CreateCycleResult { cycle, outcome })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{
        FixedClock, InMemoryNotificationStore, InMemoryOrgDirectory, InMemoryWorkBoard,
        InMemoryWorkCycleRepository, RecordingMailer,
    };
    use crate::domain::foundation::ErrorCode;
    use crate::domain::notification::Category;
    use crate::domain::org::Role;
    use crate::ports::{UserProfile, WorkItemRepository as _};

    fn uid(s: &str) -> UserId {
        UserId::new(s).unwrap()
    }

    struct Fixture {
        board: Arc<InMemoryWorkBoard>,
        notifications: Arc<InMemoryNotificationStore>,
        mailer: Arc<RecordingMailer>,
        handler: CreateCycleHandler,
    }

    fn fixture() -> Fixture {
        let cycles = Arc::new(InMemoryWorkCycleRepository::new());
        let board = Arc::new(InMemoryWorkBoard::new());
        let notifications = Arc::new(InMemoryNotificationStore::new());
        let directory = Arc::new(InMemoryOrgDirectory::new());
        let mailer = Arc::new(RecordingMailer::new());
        let clock = Arc::new(FixedClock::at(Timestamp::now()));

        directory.register_profile(UserProfile {
            id: uid("admin-1"),
            display_name: "Admin".into(),
            role: Role::Admin,
            email: None,
            is_active: true,
        });
        for name in ["alice", "bob"] {
            directory.register_profile(UserProfile {
                id: uid(name),
                display_name: name.to_string(),
                role: Role::User,
                email: Some(format!("{name}@example.org")),
                is_active: true,
            });
        }

        let assignment_notifier = Arc::new(AssignmentNotifier::new(
            notifications.clone(),
            directory.clone(),
            mailer.clone(),
        ));
        let handler = CreateCycleHandler::new(
            cycles,
            board.clone(),
            directory,
            assignment_notifier,
            clock,
        );
        Fixture {
            board,
            notifications,
            mailer,
            handler,
        }
    }

    fn command() -> CreateCycleCommand {
        CreateCycleCommand {
            title: "Q3 report".into(),
            description: "Quarterly".into(),
            due_at: Timestamp::now().plus_days(10),
            created_by: uid("admin-1"),
            user_targets: vec![uid("alice"), uid("bob")],
            team_target: None,
        }
    }

    #[tokio::test]
    async fn creates_cycle_items_and_welcome_notifications() {
        let f = fixture();
        let result = f.handler.handle(command()).await.unwrap();

        assert_eq!(result.outcome.newly_added.len(), 2);
        let items = f.board.list_for_cycle(result.cycle.id()).await.unwrap();
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|i| i.is_active()));

        let created = f.notifications.all();
        assert_eq!(created.len(), 2);
        assert!(created.iter().all(|n| n.category() == Category::Assignment));
        assert_eq!(f.mailer.sent().len(), 2);
    }

    #[tokio::test]
    async fn rejects_non_staff_creator() {
        let f = fixture();
        let mut cmd = command();
        cmd.created_by = uid("alice");
        let err = f.handler.handle(cmd).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn rejects_empty_targets_without_creating_anything() {
        let f = fixture();
        let mut cmd = command();
        cmd.user_targets.clear();
        let err = f.handler.handle(cmd).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::EmptyAssignmentTarget);
        assert!(f.notifications.all().is_empty());
    }

    #[tokio::test]
    async fn rejects_blank_title() {
        let f = fixture();
        let mut cmd = command();
        cmd.title = "  ".into();
        let err = f.handler.handle(cmd).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::EmptyField);
    }
}
