//! Review-decision notifications to the item owner.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, Timestamp};
use crate::domain::notification::{Category, NotificationDraft, Priority};
use crate::domain::workcycle::WorkCycle;
use crate::domain::workitem::{ReviewDecision, WorkItem};
use crate::ports::{Mailer, NotificationStore, OrgDirectory};

use super::email_best_effort;

pub struct ReviewNotifier {
    notifications: Arc<dyn NotificationStore>,
    directory: Arc<dyn OrgDirectory>,
    mailer: Arc<dyn Mailer>,
}

impl ReviewNotifier {
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

    /// Tells the owner how their submission was reviewed. Every decision is
    /// a distinct event and also goes out by email.
    pub async fn decision_recorded(
        &self,
        cycle: &WorkCycle,
        item: &WorkItem,
        decision: ReviewDecision,
        now: Timestamp,
    ) -> Result<(), DomainError> {
        let (title, priority, verdict) = match decision {
            ReviewDecision::Approved => (
                "Submission approved",
                Priority::Info,
                "was approved. No further action is needed",
            ),
            ReviewDecision::Revision => (
                "Revision requested",
                Priority::Warning,
                "needs revision. Please update and resubmit your work",
            ),
            ReviewDecision::Pending => (
                "Review reverted to pending",
                Priority::Info,
                "was reverted to pending review. This notice is issued for your information",
            ),
        };

        let draft = NotificationDraft {
            category: Category::Review,
            priority,
            title: title.to_string(),
            body: format!("Your submission for \"{}\" {}.", cycle.title(), verdict),
            work_item: Some(item.id()),
            work_cycle: Some(cycle.id()),
        };
        self.notifications.create(item.owner(), draft, now).await?;

        if let Ok(profile) = self.directory.profile(item.owner()).await {
            let subject = format!("{}: \"{}\"", title, cycle.title());
            let body = format!(
                "Good day.\n\n\
                 Your submission for the work cycle \"{}\" {}.\n\n\
                 — Worktrack System",
                cycle.title(),
                verdict,
            );
            email_best_effort(self.mailer.as_ref(), &profile, subject, body).await;
        }
        Ok(())
    }
}
