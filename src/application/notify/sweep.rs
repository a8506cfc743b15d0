//! Scheduled milestone sweep.
//!
//! Walks every active cycle, computes whole calendar days to the due date,
//! and delivers cycle-level and item-level reminders when that distance sits
//! exactly on a milestone. Idempotency comes entirely from the store's dedup
//! keys: a sweep can run every few minutes, crash mid-pass, or overlap a
//! manual run and each (recipient, milestone) still lands once.

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::foundation::{DomainError, Timestamp};
use crate::domain::notification::{
    cycle_reminder_dedup_key, cycle_reminder_draft, cycle_reminder_email, item_reminder_dedup_key,
    item_reminder_draft, item_reminder_email, item_submitted_confirmation_draft,
    item_submitted_confirmation_email, Category, WORKCYCLE_MILESTONES, WORKITEM_MILESTONES,
};
use crate::domain::workcycle::WorkCycle;
use crate::domain::workitem::ItemStatus;
use crate::ports::{Clock, Mailer, NotificationStore, OrgDirectory, WorkCycleRepository,
    WorkItemRepository};

use super::email_best_effort;

/// What one sweep pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub cycles_examined: usize,
    pub cycle_reminders_created: usize,
    pub item_reminders_created: usize,
}

pub struct ReminderSweep {
    cycles: Arc<dyn WorkCycleRepository>,
    items: Arc<dyn WorkItemRepository>,
    notifications: Arc<dyn NotificationStore>,
    directory: Arc<dyn OrgDirectory>,
    mailer: Arc<dyn Mailer>,
    clock: Arc<dyn Clock>,
}

impl ReminderSweep {
    pub fn new(
        cycles: Arc<dyn WorkCycleRepository>,
        items: Arc<dyn WorkItemRepository>,
        notifications: Arc<dyn NotificationStore>,
        directory: Arc<dyn OrgDirectory>,
        mailer: Arc<dyn Mailer>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            cycles,
            items,
            notifications,
            directory,
            mailer,
            clock,
        }
    }

    /// One full pass over every active cycle.
    pub async fn run(&self) -> Result<SweepReport, DomainError> {
        let now = self.clock.now();
        let mut report = SweepReport::default();

        for cycle in self.cycles.list_active().await? {
            report.cycles_examined += 1;
            let (cycle_created, item_created) = self.evaluate_cycle(&cycle, now).await?;
            report.cycle_reminders_created += cycle_created;
            report.item_reminders_created += item_created;
        }

        info!(
            cycles = report.cycles_examined,
            cycle_reminders = report.cycle_reminders_created,
            item_reminders = report.item_reminders_created,
            "reminder sweep finished"
        );
        Ok(report)
    }

    /// Evaluates one cycle at one instant. Also called directly after a due
    /// date edit so a cycle moved into a milestone window doesn't wait for
    /// the next scheduled pass.
    pub async fn evaluate_cycle(
        &self,
        cycle: &WorkCycle,
        now: Timestamp,
    ) -> Result<(usize, usize), DomainError> {
        let days_left = now.days_until(&cycle.due_at());
        if days_left < 0 {
            debug!(cycle = %cycle.id(), "cycle already lapsed, no reminders");
            return Ok((0, 0));
        }

        let items = self.items.list_active_for_cycle(cycle.id()).await?;
        let mut cycle_created = 0;
        let mut item_created = 0;

        // Cycle-level reminders go to the creator alone; owners are already
        // chased through their own item milestones.
        if WORKCYCLE_MILESTONES.contains(&days_left) {
            if let Some(creator) = cycle.created_by() {
                match self.directory.profile(creator).await {
                    Ok(profile) => {
                        let key = cycle_reminder_dedup_key(cycle.id(), days_left);
                        let draft = cycle_reminder_draft(cycle, days_left);
                        let (_, created) = self
                            .notifications
                            .ensure(&profile.id, Category::Reminder, &key, draft, now)
                            .await?;
                        if created {
                            cycle_created += 1;
                            let (subject, body) = cycle_reminder_email(cycle, days_left);
                            email_best_effort(self.mailer.as_ref(), &profile, subject, body)
                                .await;
                        }
                    }
                    // Creator account gone from the directory; skip quietly.
                    Err(_) => {}
                }
            }
        }

        if WORKITEM_MILESTONES.contains(&days_left) {
            for item in &items {
                // Nothing to chase once the work is in; on the due date
                // itself a finished item gets a confirmation instead.
                let done = item.status() == ItemStatus::Done;
                if done && days_left > 0 {
                    continue;
                }
                let profile = match self.directory.profile(item.owner()).await {
                    Ok(p) => p,
                    Err(_) => continue,
                };
                let key = item_reminder_dedup_key(item.id(), days_left);
                let draft = if done {
                    item_submitted_confirmation_draft(cycle, item.id())
                } else {
                    item_reminder_draft(cycle, item.id(), days_left)
                };
                let (_, created) = self
                    .notifications
                    .ensure(&profile.id, Category::Reminder, &key, draft, now)
                    .await?;
                if created {
                    item_created += 1;
                    let (subject, body) = if done {
                        item_submitted_confirmation_email(cycle)
                    } else {
                        item_reminder_email(cycle, days_left)
                    };
                    email_best_effort(self.mailer.as_ref(), &profile, subject, body).await;
                }
            }
        }

        Ok((cycle_created, item_created))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{
        FixedClock, InMemoryNotificationStore, InMemoryOrgDirectory, InMemoryWorkBoard,
        InMemoryWorkCycleRepository, RecordingMailer,
    };
    use crate::domain::foundation::UserId;
    use crate::domain::org::Role;
    use crate::domain::workitem::WorkItem;
    use crate::ports::{UserProfile, WorkCycleRepository as _, WorkItemRepository as _};

    fn uid(s: &str) -> UserId {
        UserId::new(s).unwrap()
    }

    fn profile(id: &str, email: Option<&str>) -> UserProfile {
        UserProfile {
            id: uid(id),
            display_name: id.to_string(),
            role: Role::User,
            email: email.map(String::from),
            is_active: true,
        }
    }

    struct Fixture {
        cycles: Arc<InMemoryWorkCycleRepository>,
        board: Arc<InMemoryWorkBoard>,
        notifications: Arc<InMemoryNotificationStore>,
        mailer: Arc<RecordingMailer>,
        clock: Arc<FixedClock>,
        sweep: ReminderSweep,
    }

    fn fixture(now: Timestamp) -> Fixture {
        let cycles = Arc::new(InMemoryWorkCycleRepository::new());
        let board = Arc::new(InMemoryWorkBoard::new());
        let notifications = Arc::new(InMemoryNotificationStore::new());
        let directory = Arc::new(InMemoryOrgDirectory::new());
        let mailer = Arc::new(RecordingMailer::new());
        let clock = Arc::new(FixedClock::at(now));

        directory.register_profile(profile("alice", Some("alice@example.org")));
        directory.register_profile(profile("bob", None));
        directory.register_profile(profile("admin-1", None));

        let sweep = ReminderSweep::new(
            cycles.clone(),
            board.clone(),
            notifications.clone(),
            directory,
            mailer.clone(),
            clock.clone(),
        );
        Fixture {
            cycles,
            board,
            notifications,
            mailer,
            clock,
            sweep,
        }
    }

    async fn seed_cycle(f: &Fixture, due_in_days: i64, now: Timestamp) -> WorkCycle {
        let cycle = WorkCycle::new(
            "Q3 report",
            "",
            now.plus_days(due_in_days),
            uid("admin-1"),
            now,
        )
        .unwrap();
        f.cycles.save(&cycle).await.unwrap();
        for owner in ["alice", "bob"] {
            f.board
                .save(&WorkItem::new(cycle.id(), uid(owner), now))
                .await
                .unwrap();
        }
        cycle
    }

    #[tokio::test]
    async fn sweep_at_a_milestone_is_idempotent() {
        let now = Timestamp::now();
        let f = fixture(now);
        seed_cycle(&f, 3, now).await;

        let report = f.sweep.run().await.unwrap();
        // Day 3 is both milestones: one cycle reminder for the creator,
        // item reminders for the two owners.
        assert_eq!(report.cycle_reminders_created, 1);
        assert_eq!(report.item_reminders_created, 2);

        let report = f.sweep.run().await.unwrap();
        assert_eq!(report.cycle_reminders_created, 0);
        assert_eq!(report.item_reminders_created, 0);
        assert_eq!(f.notifications.all().len(), 3);
    }

    #[tokio::test]
    async fn owners_get_one_reminder_and_one_email_per_shared_milestone() {
        let now = Timestamp::now();
        let f = fixture(now);
        seed_cycle(&f, 3, now).await;

        f.sweep.run().await.unwrap();

        let to_alice: Vec<_> = f
            .notifications
            .all()
            .into_iter()
            .filter(|n| n.recipient() == &uid("alice"))
            .collect();
        assert_eq!(to_alice.len(), 1);
        assert!(to_alice[0].title().starts_with("Submission due"));

        let sent = f.mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "alice@example.org");
    }

    #[tokio::test]
    async fn off_milestone_days_produce_nothing() {
        let now = Timestamp::now();
        let f = fixture(now);
        seed_cycle(&f, 4, now).await;

        let report = f.sweep.run().await.unwrap();
        assert_eq!(report.cycle_reminders_created, 0);
        assert_eq!(report.item_reminders_created, 0);
    }

    #[tokio::test]
    async fn day_seven_is_item_only() {
        let now = Timestamp::now();
        let f = fixture(now);
        seed_cycle(&f, 7, now).await;

        let report = f.sweep.run().await.unwrap();
        assert_eq!(report.cycle_reminders_created, 0);
        assert_eq!(report.item_reminders_created, 2);
    }

    #[tokio::test]
    async fn submitted_items_are_not_chased() {
        let now = Timestamp::now();
        let f = fixture(now);
        let cycle = seed_cycle(&f, 1, now).await;

        let stored = f
            .board
            .find_by_cycle_and_owner(cycle.id(), &uid("alice"))
            .await
            .unwrap()
            .unwrap();
        let mut item = stored.clone();
        item.submit().unwrap();
        item.apply_audit_rules(&stored, now);
        f.board.update(&item).await.unwrap();

        let report = f.sweep.run().await.unwrap();
        // The creator still gets the cycle reminder; only bob gets the
        // item nudge.
        assert_eq!(report.cycle_reminders_created, 1);
        assert_eq!(report.item_reminders_created, 1);
    }

    #[tokio::test]
    async fn due_day_confirms_finished_items_instead_of_chasing() {
        let now = Timestamp::now();
        let f = fixture(now);
        let cycle = seed_cycle(&f, 0, now).await;

        let stored = f
            .board
            .find_by_cycle_and_owner(cycle.id(), &uid("alice"))
            .await
            .unwrap()
            .unwrap();
        let mut item = stored.clone();
        item.submit().unwrap();
        item.apply_audit_rules(&stored, now);
        f.board.update(&item).await.unwrap();

        let report = f.sweep.run().await.unwrap();
        // Alice's slot becomes a confirmation, bob still gets the chase.
        assert_eq!(report.item_reminders_created, 2);
        let confirmation = f
            .notifications
            .all()
            .into_iter()
            .find(|n| {
                n.recipient() == &uid("alice") && n.title().starts_with("Submission received")
            })
            .unwrap();
        assert_eq!(confirmation.priority(), crate::domain::notification::Priority::Info);
        // First creation still fans out to email, with confirmation copy.
        let to_alice: Vec<_> = f
            .mailer
            .sent()
            .into_iter()
            .filter(|m| m.to == "alice@example.org")
            .collect();
        assert_eq!(to_alice.len(), 1);
        assert!(to_alice[0].subject.starts_with("Submission confirmed"));
    }

    #[tokio::test]
    async fn milestones_accumulate_as_days_pass() {
        let now = Timestamp::now();
        let f = fixture(now);
        seed_cycle(&f, 5, now).await;

        f.sweep.run().await.unwrap();
        f.clock.advance_days(2);
        f.sweep.run().await.unwrap();
        f.clock.advance_days(2);
        f.sweep.run().await.unwrap();

        // Days 5, 3, and 1: three milestones, each with one cycle reminder
        // and two item reminders.
        assert_eq!(f.notifications.all().len(), 9);
    }

    #[tokio::test]
    async fn email_failure_does_not_fail_the_sweep() {
        let now = Timestamp::now();
        let f = fixture(now);
        seed_cycle(&f, 0, now).await;
        f.mailer.fail_next_sends(true);

        let report = f.sweep.run().await.unwrap();
        assert_eq!(report.cycle_reminders_created, 1);
        assert_eq!(report.item_reminders_created, 2);
        assert!(f.mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn only_addressed_owners_get_email() {
        let now = Timestamp::now();
        let f = fixture(now);
        seed_cycle(&f, 0, now).await;

        f.sweep.run().await.unwrap();
        let sent = f.mailer.sent();
        // Bob and the creator have no address on file; only alice's item
        // reminder goes out.
        assert_eq!(sent.len(), 1);
        assert!(sent.iter().all(|m| m.to == "alice@example.org"));
    }
}
