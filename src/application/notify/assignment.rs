//! Assignment-change notifications.
//!
//! Each reconciliation produces a fresh event, so these go through plain
//! `create` rather than the dedup path.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, Timestamp, UserId};
use crate::domain::notification::{Category, NotificationDraft, Priority};
use crate::domain::workcycle::WorkCycle;
use crate::ports::{Mailer, NotificationStore, OrgDirectory};

use super::email_best_effort;

pub struct AssignmentNotifier {
    notifications: Arc<dyn NotificationStore>,
    directory: Arc<dyn OrgDirectory>,
    mailer: Arc<dyn Mailer>,
}

impl AssignmentNotifier {
    pub fn new(
        notifications: Arc<dyn NotificationStore>,
        directory: Arc<dyn OrgDirectory>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            notifications,
            directory,
            mailer,
        }
    }

    /// In-app notification plus email to every newly assigned owner.
    pub async fn notify_assigned(
        &self,
        cycle: &WorkCycle,
        users: &[UserId],
        now: Timestamp,
    ) -> Result<(), DomainError> {
        let profiles = self.directory.profiles(users).await?;
        for profile in profiles {
            let draft = NotificationDraft {
                category: Category::Assignment,
                priority: Priority::Info,
                title: "New work cycle assigned".into(),
                body: format!(
                    "You have been assigned to \"{}\", due on {}.",
                    cycle.title(),
                    cycle.due_at().as_datetime().format("%B %-d, %Y"),
                ),
                work_item: None,
                work_cycle: Some(cycle.id()),
            };
            self.notifications.create(&profile.id, draft, now).await?;

            let subject = format!("New work cycle assigned: \"{}\"", cycle.title());
            let body = format!(
                "Good day.\n\n\
                 You have been assigned to the work cycle \"{}\", due on {}.\n\n\
                 Please review the details and plan your submission.\n\n\
                 — Worktrack System",
                cycle.title(),
                cycle.due_at().as_datetime().format("%B %-d, %Y"),
            );
            email_best_effort(self.mailer.as_ref(), &profile, subject, body).await;
        }
        Ok(())
    }

    /// In-app notification to owners whose items were archived.
    pub async fn notify_removed(
        &self,
        cycle: &WorkCycle,
        users: &[UserId],
        now: Timestamp,
    ) -> Result<(), DomainError> {
        for user in users {
            let draft = NotificationDraft {
                category: Category::Assignment,
                priority: Priority::Info,
                title: "Removed from work cycle".into(),
                body: format!(
                    "You are no longer assigned to \"{}\". Your work item was archived.",
                    cycle.title(),
                ),
                work_item: None,
                work_cycle: Some(cycle.id()),
            };
            self.notifications.create(user, draft, now).await?;
        }
        Ok(())
    }

    /// In-app notice to owners whose archived item came back. Goes out as
    /// a system notice, distinct from a first assignment.
    pub async fn notify_reactivated(
        &self,
        cycle: &WorkCycle,
        users: &[UserId],
        now: Timestamp,
    ) -> Result<(), DomainError> {
        for user in users {
            let draft = NotificationDraft {
                category: Category::System,
                priority: Priority::Info,
                title: "Work reassigned".into(),
                body: format!(
                    "A work item in \"{}\" has been reassigned to you. It starts fresh.",
                    cycle.title(),
                ),
                work_item: None,
                work_cycle: Some(cycle.id()),
            };
            self.notifications.create(user, draft, now).await?;
        }
        Ok(())
    }
}
