//! In-app notifications, reminder milestones, and email copy.

mod milestones;
mod notification;

pub use milestones::{
    cycle_reminder_dedup_key, cycle_reminder_draft, cycle_reminder_email, item_reminder_dedup_key,
    item_reminder_draft, item_reminder_email, item_submitted_confirmation_draft,
    item_submitted_confirmation_email, milestone_label, WORKCYCLE_MILESTONES,
    WORKITEM_MILESTONES,
};
pub use notification::{Category, Notification, NotificationDraft, Priority};
