//! ReassignCycleHandler - replaces a cycle's membership in one atomic pass.

use std::sync::Arc;

use crate::application::handlers::require_staff;
use crate::application::notify::AssignmentNotifier;
use crate::domain::foundation::{DomainError, ErrorCode, TeamId, UserId, WorkCycleId};
use crate::ports::{
    Clock, OrgDirectory, ReconciliationDirective, ReconciliationOutcome, ReconciliationStore,
    WorkCycleRepository,
};

use super::targets::resolve_targets;

/// Command to reassign a work cycle.
#[derive(Debug, Clone)]
pub struct ReassignCycleCommand {
    pub cycle_id: WorkCycleId,
    pub user_targets: Vec<UserId>,
    pub team_target: Option<TeamId>,
    pub performed_by: UserId,
    pub note: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ReassignCycleResult {
    pub outcome: ReconciliationOutcome,
}

pub struct ReassignCycleHandler {
    cycles: Arc<dyn WorkCycleRepository>,
    reconciliation: Arc<dyn ReconciliationStore>,
    directory: Arc<dyn OrgDirectory>,
    assignment_notifier: Arc<AssignmentNotifier>,
    clock: Arc<dyn Clock>,
}

impl ReassignCycleHandler {
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

    pub async fn handle(
        &self,
        cmd: ReassignCycleCommand,
    ) -> Result<ReassignCycleResult, DomainError> {
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

        let resolution =
            resolve_targets(self.directory.as_ref(), &cmd.user_targets, cmd.team_target).await?;

        let outcome = self
            .reconciliation
            .reconcile(ReconciliationDirective {
                cycle_id: cycle.id(),
                targets: resolution.targets,
                explicit_users: resolution.explicit_users,
                team: resolution.team,
                performed_by: cmd.performed_by,
                note: cmd.note,
                now,
            })
            .await?;

        // Notifications happen after the pass commits; each partition hears
        // a different story.
        let removed: Vec<UserId> = outcome.removed.iter().cloned().collect();
        self.assignment_notifier
            .notify_removed(&cycle, &removed, now)
            .await?;

        let added: Vec<UserId> = outcome.newly_added.iter().cloned().collect();
        self.assignment_notifier
            .notify_assigned(&cycle, &added, now)
            .await?;

        let reactivated: Vec<UserId> = outcome.reactivated.iter().cloned().collect();
        self.assignment_notifier
            .notify_reactivated(&cycle, &reactivated, now)
            .await?;

        Ok(ReassignCycleResult { outcome })
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
    use crate::ports::{UserProfile, WorkCycleRepository as _};
    use std::collections::BTreeSet;

    fn uid(s: &str) -> UserId {
        UserId::new(s).unwrap()
    }

    fn users(ids: &[&str]) -> BTreeSet<UserId> {
        ids.iter().map(|s| uid(s)).collect()
    }

    struct Fixture {
        cycles: Arc<InMemoryWorkCycleRepository>,
        board: Arc<InMemoryWorkBoard>,
        notifications: Arc<InMemoryNotificationStore>,
        handler: ReassignCycleHandler,
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
        for name in ["a", "b", "c", "d"] {
            directory.register_profile(UserProfile {
                id: uid(name),
                display_name: name.to_string(),
                role: Role::User,
                email: None,
                is_active: true,
            });
        }

        let assignment_notifier = Arc::new(AssignmentNotifier::new(
            notifications.clone(),
            directory.clone(),
            mailer,
        ));
        let handler = ReassignCycleHandler::new(
            cycles.clone(),
            board.clone(),
            directory,
            assignment_notifier,
            clock,
        );
        Fixture {
            cycles,
            board,
            notifications,
            handler,
        }
    }

    async fn seed(f: &Fixture, owners: &[&str]) -> WorkCycle {
        let now = Timestamp::now();
        let cycle =
            WorkCycle::new("Q3 report", "", now.plus_days(10), uid("admin-1"), now).unwrap();
        f.cycles.save(&cycle).await.unwrap();
        f.board
            .reconcile(ReconciliationDirective {
                cycle_id: cycle.id(),
                targets: owners.iter().map(|s| uid(s)).collect(),
                explicit_users: owners.iter().map(|s| uid(s)).collect(),
                team: None,
                performed_by: uid("admin-1"),
                note: None,
                now,
            })
            .await
            .unwrap();
        cycle
    }

    #[tokio::test]
    async fn partitions_removed_retained_and_added() {
        let f = fixture();
        let cycle = seed(&f, &["a", "b", "c"]).await;

        let result = f
            .handler
            .handle(ReassignCycleCommand {
                cycle_id: cycle.id(),
                user_targets: vec![uid("b"), uid("c"), uid("d")],
                team_target: None,
                performed_by: uid("admin-1"),
                note: Some("Quarterly rotation".into()),
            })
            .await
            .unwrap();

        assert_eq!(result.outcome.removed, users(&["a"]));
        assert_eq!(result.outcome.newly_added, users(&["d"]));

        // One removal notice and one welcome; the retained hear nothing.
        let created = f.notifications.all();
        assert_eq!(created.len(), 2);
        let recipients: Vec<&str> = created.iter().map(|n| n.recipient().as_str()).collect();
        assert!(recipients.contains(&"a"));
        assert!(recipients.contains(&"d"));
    }

    #[tokio::test]
    async fn reactivation_sends_a_system_notice() {
        let f = fixture();
        let cycle = seed(&f, &["a", "b"]).await;

        f.handler
            .handle(ReassignCycleCommand {
                cycle_id: cycle.id(),
                user_targets: vec![uid("b")],
                team_target: None,
                performed_by: uid("admin-1"),
                note: None,
            })
            .await
            .unwrap();
        let result = f
            .handler
            .handle(ReassignCycleCommand {
                cycle_id: cycle.id(),
                user_targets: vec![uid("a"), uid("b")],
                team_target: None,
                performed_by: uid("admin-1"),
                note: None,
            })
            .await
            .unwrap();
        assert_eq!(result.outcome.reactivated, users(&["a"]));

        // Coming back is a system notice, not a fresh-assignment welcome.
        let notice = f
            .notifications
            .all()
            .into_iter()
            .find(|n| n.title() == "Work reassigned")
            .unwrap();
        assert_eq!(notice.category(), Category::System);
        assert_eq!(notice.recipient(), &uid("a"));
    }

    #[tokio::test]
    async fn unknown_cycle_is_rejected() {
        let f = fixture();
        let err = f
            .handler
            .handle(ReassignCycleCommand {
                cycle_id: WorkCycleId::new(),
                user_targets: vec![uid("a")],
                team_target: None,
                performed_by: uid("admin-1"),
                note: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::CycleNotFound);
    }

    #[tokio::test]
    async fn non_staff_cannot_reassign() {
        let f = fixture();
        let cycle = seed(&f, &["a"]).await;
        let err = f
            .handler
            .handle(ReassignCycleCommand {
                cycle_id: cycle.id(),
                user_targets: vec![uid("b")],
                team_target: None,
                performed_by: uid("a"),
                note: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);
    }
}
