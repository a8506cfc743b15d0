//! System notices: cycle edits, archive toggles, deletions, and routed
//! discussion messages.

use std::sync::Arc;

use crate::domain::discussion::ThreadMessage;
use crate::domain::foundation::{DomainError, Timestamp, UserId};
use crate::domain::notification::{Category, NotificationDraft, Priority};
use crate::domain::workcycle::WorkCycle;
use crate::domain::workitem::WorkItem;
use crate::ports::{Mailer, NotificationStore, OrgDirectory};

use super::email_best_effort;

pub struct SystemNotifier {
    notifications: Arc<dyn NotificationStore>,
    directory: Arc<dyn OrgDirectory>,
    mailer: Arc<dyn Mailer>,
}

impl SystemNotifier {
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

    /// Tells assigned owners that the cycle's details changed. Emails go
    /// out on first delivery; repeated edits within the same dedup window
    /// reuse the stamp so each distinct edit notifies once.
    pub async fn cycle_edited(
        &self,
        cycle: &WorkCycle,
        recipients: &[UserId],
        now: Timestamp,
    ) -> Result<(), DomainError> {
        let stamp = now.as_datetime().timestamp();
        let profiles = self.directory.profiles(recipients).await?;
        for profile in profiles {
            let draft = NotificationDraft {
                category: Category::System,
                priority: Priority::Info,
                title: "Work cycle updated".into(),
                body: format!(
                    "\"{}\" was updated. It is now due on {}.",
                    cycle.title(),
                    cycle.due_at().as_datetime().format("%B %-d, %Y"),
                ),
                work_item: None,
                work_cycle: Some(cycle.id()),
            };
            let dedup_key = format!("cycle:{}:system:updated:{stamp}", cycle.id());
            let (_, created) = self
                .notifications
                .ensure(&profile.id, Category::System, &dedup_key, draft, now)
                .await?;

            if created {
                let subject = format!("Work cycle updated: \"{}\"", cycle.title());
                let body = format!(
                    "Good day.\n\n\
                     The work cycle \"{}\" was updated. It is now due on {}.\n\n\
                     Please review the new details.\n\n\
                     — Worktrack System",
                    cycle.title(),
                    cycle.due_at().as_datetime().format("%B %-d, %Y"),
                );
                email_best_effort(self.mailer.as_ref(), &profile, subject, body).await;
            }
        }
        Ok(())
    }

    /// In-app notice that a cycle was archived or restored.
    pub async fn archive_toggled(
        &self,
        cycle: &WorkCycle,
        recipients: &[UserId],
        now_active: bool,
        now: Timestamp,
    ) -> Result<(), DomainError> {
        let (word, title) = if now_active {
            ("restored", "Work cycle restored")
        } else {
            ("archived", "Work cycle archived")
        };
        let stamp = now.as_datetime().timestamp();
        for user in recipients {
            let draft = NotificationDraft {
                category: Category::System,
                priority: Priority::Info,
                title: title.to_string(),
                body: format!("\"{}\" was {}.", cycle.title(), word),
                work_item: None,
                work_cycle: Some(cycle.id()),
            };
            let dedup_key = format!("cycle:{}:system:{word}:{stamp}", cycle.id());
            self.notifications
                .ensure(user, Category::System, &dedup_key, draft, now)
                .await?;
        }
        Ok(())
    }

    /// In-app notice that a cycle was deleted outright.
    pub async fn cycle_deleted(
        &self,
        cycle_title: &str,
        recipients: &[UserId],
        now: Timestamp,
    ) -> Result<(), DomainError> {
        for user in recipients {
            let draft = NotificationDraft {
                category: Category::System,
                priority: Priority::Warning,
                title: "Work cycle deleted".into(),
                body: format!(
                    "\"{cycle_title}\" was deleted along with its work items.",
                ),
                work_item: None,
                work_cycle: None,
            };
            self.notifications.create(user, draft, now).await?;
        }
        Ok(())
    }

    /// Routes a discussion message to the other side of the thread: staff
    /// messages go to the item owner, owner messages to the cycle creator.
    pub async fn message_posted(
        &self,
        cycle: &WorkCycle,
        item: &WorkItem,
        message: &ThreadMessage,
        now: Timestamp,
    ) -> Result<(), DomainError> {
        let recipient = if message.sender_role().is_staff() {
            Some(item.owner().clone())
        } else {
            cycle.created_by().cloned()
        };
        let Some(recipient) = recipient else {
            return Ok(());
        };
        if &recipient == message.sender() {
            return Ok(());
        }

        let sender_profile = self.directory.profile(message.sender()).await?;
        let draft = NotificationDraft {
            category: Category::Message,
            priority: Priority::Info,
            title: format!("New message from {}", sender_profile.display_name),
            body: format!(
                "On \"{}\": {}",
                cycle.title(),
                preview(message.body()),
            ),
            work_item: Some(item.id()),
            work_cycle: Some(cycle.id()),
        };
        // Keyed per message so a retried post never notifies twice.
        let dedup_key = format!("item:{}:message:{}", item.id(), message.id());
        self.notifications
            .ensure(&recipient, Category::Message, &dedup_key, draft, now)
            .await?;
        Ok(())
    }
}

fn preview(body: &str) -> String {
    const LIMIT: usize = 120;
    if body.chars().count() <= LIMIT {
        body.to_string()
    } else {
        let truncated: String = body.chars().take(LIMIT).collect();
        format!("{truncated}…")
    }
}
