//! Status-change notifications to the cycle creator.
//!
//! These are deduplicated per (item, transition): resubmitting after an undo
//! is a new transition pair, so the creator hears about it again, but a
//! double-fired submit event lands only once.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, Timestamp};
use crate::domain::notification::{Category, NotificationDraft, Priority};
use crate::domain::workcycle::WorkCycle;
use crate::domain::workitem::{ItemStatus, WorkItem};
use crate::ports::{Mailer, NotificationStore, OrgDirectory};

use super::email_best_effort;

pub struct StatusNotifier {
    notifications: Arc<dyn NotificationStore>,
    directory: Arc<dyn OrgDirectory>,
    mailer: Arc<dyn Mailer>,
}

impl StatusNotifier {
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

    /// Tells the cycle creator that an owner submitted.
    ///
    /// The dedup key carries the submission stamp, so a resubmit after an
    /// undo notifies again while a double-fired event does not.
    pub async fn submitted(
        &self,
        cycle: &WorkCycle,
        item: &WorkItem,
        now: Timestamp,
    ) -> Result<(), DomainError> {
        let stamp = item
            .submitted_at()
            .unwrap_or(now)
            .as_datetime()
            .timestamp();
        let transition = format!("submitted:{stamp}");
        self.transition(cycle, item, &transition, Priority::Info, now, true)
            .await
    }

    /// Tells the cycle creator that an owner reverted a submission.
    pub async fn submission_reverted(
        &self,
        cycle: &WorkCycle,
        item: &WorkItem,
        now: Timestamp,
    ) -> Result<(), DomainError> {
        let transition = format!("reverted:{}", now.as_datetime().timestamp());
        self.transition(cycle, item, &transition, Priority::Warning, now, false)
            .await
    }

    /// Tells the cycle creator about an ordinary status change.
    pub async fn status_updated(
        &self,
        cycle: &WorkCycle,
        item: &WorkItem,
        from: ItemStatus,
        now: Timestamp,
    ) -> Result<(), DomainError> {
        let transition = format!("{}-{}", from.as_str(), item.status().as_str());
        self.transition(cycle, item, &transition, Priority::Info, now, false)
            .await
    }

    async fn transition(
        &self,
        cycle: &WorkCycle,
        item: &WorkItem,
        transition: &str,
        priority: Priority,
        now: Timestamp,
        email: bool,
    ) -> Result<(), DomainError> {
        // The creator account may be gone; then there is nobody to tell.
        let Some(creator) = cycle.created_by() else {
            return Ok(());
        };
        // Owners acting on their own cycle don't need to hear about it.
        if creator == item.owner() {
            return Ok(());
        }

        let owner_profile = self.directory.profile(item.owner()).await?;
        let draft = NotificationDraft {
            category: Category::Status,
            priority,
            title: status_title(transition, item),
            body: format!(
                "{} {} in \"{}\". Current status: {}.",
                owner_profile.display_name,
                describe_transition(transition),
                cycle.title(),
                item.status().label(),
            ),
            work_item: Some(item.id()),
            work_cycle: Some(cycle.id()),
        };

        let dedup_key = format!("item:{}:status:{}", item.id(), transition);
        let (_, created) = self
            .notifications
            .ensure(creator, Category::Status, &dedup_key, draft, now)
            .await?;

        if created && email {
            if let Ok(creator_profile) = self.directory.profile(creator).await {
                let subject = format!(
                    "Submission received: {} ({})",
                    cycle.title(),
                    owner_profile.display_name
                );
                let body = format!(
                    "Good day.\n\n\
                     {} submitted their work for \"{}\".\n\n\
                     You can now review the submission.\n\n\
                     — Worktrack System",
                    owner_profile.display_name,
                    cycle.title(),
                );
                email_best_effort(self.mailer.as_ref(), &creator_profile, subject, body).await;
            }
        }
        Ok(())
    }
}

fn status_title(transition: &str, item: &WorkItem) -> String {
    if transition.starts_with("submitted") {
        "Work item submitted".to_string()
    } else if transition.starts_with("reverted") {
        "Submission reverted".to_string()
    } else {
        format!("Status changed to {}", item.status().label())
    }
}

fn describe_transition(transition: &str) -> &'static str {
    if transition.starts_with("submitted") {
        "submitted their work"
    } else if transition.starts_with("reverted") {
        "reverted their submission"
    } else {
        "updated their status"
    }
}
