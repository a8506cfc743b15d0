//! Reminder milestones and the copy they produce.
//!
//! Milestones are calendar-day distances to the due date, computed in UTC.
//! Day 0 is the due date itself and escalates to danger priority. Dedup keys
//! name the subject and the milestone so the sweep can run any number of
//! times without duplicating a reminder.

use crate::domain::foundation::{Timestamp, WorkCycleId, WorkItemId};
use crate::domain::workcycle::WorkCycle;

use super::{Category, NotificationDraft, Priority};

/// Days-left milestones at which a cycle-level reminder goes out.
pub const WORKCYCLE_MILESTONES: [i64; 4] = [5, 3, 1, 0];

/// Days-left milestones at which a per-item reminder goes out.
pub const WORKITEM_MILESTONES: [i64; 5] = [7, 5, 3, 1, 0];

/// "Due today", "1 day left", "N days left".
pub fn milestone_label(days_left: i64) -> String {
    match days_left {
        0 => "Due today".to_string(),
        1 => "1 day left".to_string(),
        n => format!("{n} days left"),
    }
}

fn milestone_priority(days_left: i64) -> Priority {
    if days_left == 0 {
        Priority::Danger
    } else {
        Priority::Warning
    }
}

fn due_date_line(due_at: Timestamp) -> String {
    due_at.as_datetime().format("%B %-d, %Y").to_string()
}

pub fn cycle_reminder_dedup_key(cycle_id: WorkCycleId, days_left: i64) -> String {
    format!("cycle:{cycle_id}:reminder:{days_left}d")
}

pub fn item_reminder_dedup_key(item_id: WorkItemId, days_left: i64) -> String {
    format!("item:{item_id}:reminder:{days_left}d")
}

/// In-app reminder that a whole cycle is approaching its due date.
pub fn cycle_reminder_draft(cycle: &WorkCycle, days_left: i64) -> NotificationDraft {
    NotificationDraft {
        category: Category::Reminder,
        priority: milestone_priority(days_left),
        title: format!("Work cycle due: {}", milestone_label(days_left).to_lowercase()),
        body: format!(
            "\"{}\" is due on {} ({}).",
            cycle.title(),
            due_date_line(cycle.due_at()),
            milestone_label(days_left).to_lowercase(),
        ),
        work_item: None,
        work_cycle: Some(cycle.id()),
    }
}

/// In-app reminder that one user's own item is still unsubmitted.
pub fn item_reminder_draft(
    cycle: &WorkCycle,
    item_id: WorkItemId,
    days_left: i64,
) -> NotificationDraft {
    NotificationDraft {
        category: Category::Reminder,
        priority: milestone_priority(days_left),
        title: format!(
            "Submission due: {}",
            milestone_label(days_left).to_lowercase()
        ),
        body: format!(
            "Your submission for \"{}\" is due on {} ({}).",
            cycle.title(),
            due_date_line(cycle.due_at()),
            milestone_label(days_left).to_lowercase(),
        ),
        work_item: Some(item_id),
        work_cycle: Some(cycle.id()),
    }
}

/// Due-day notice for an item whose work is already in. Shares the item's
/// day-0 dedup slot, so an owner who was chased earlier in the day is not
/// notified a second time after submitting.
pub fn item_submitted_confirmation_draft(
    cycle: &WorkCycle,
    item_id: WorkItemId,
) -> NotificationDraft {
    NotificationDraft {
        category: Category::Reminder,
        priority: Priority::Info,
        title: "Submission received: due today".to_string(),
        body: format!(
            "\"{}\" is due today. Your submission is already in; no further action is needed.",
            cycle.title(),
        ),
        work_item: Some(item_id),
        work_cycle: Some(cycle.id()),
    }
}

/// Email confirming a recorded submission on the due day itself.
pub fn item_submitted_confirmation_email(cycle: &WorkCycle) -> (String, String) {
    let subject = format!(
        "Submission confirmed: \"{}\" was due today",
        cycle.title(),
    );
    let body = format!(
        "Good day.\n\n\
         The work cycle \"{}\" was due today, {}. Your submission has been \
         recorded and is now pending review.\n\n\
         Thank you for completing your assigned work within the deadline.\n\n\
         — Worktrack System",
        cycle.title(),
        due_date_line(cycle.due_at()),
    );
    (subject, body)
}

/// Email subject and body mirroring the cycle reminder.
pub fn cycle_reminder_email(cycle: &WorkCycle, days_left: i64) -> (String, String) {
    let subject = format!(
        "Reminder: \"{}\" is due {}",
        cycle.title(),
        if days_left == 0 {
            "today".to_string()
        } else {
            format!("in {}", milestone_label(days_left).to_lowercase().replace(" left", ""))
        }
    );
    let body = format!(
        "Good day.\n\n\
         This is a reminder that the work cycle \"{}\" is due on {} ({}).\n\n\
         Please make sure all required submissions are completed on time.\n\n\
         — Worktrack System",
        cycle.title(),
        due_date_line(cycle.due_at()),
        milestone_label(days_left).to_lowercase(),
    );
    (subject, body)
}

/// Email subject and body mirroring the per-item reminder.
pub fn item_reminder_email(cycle: &WorkCycle, days_left: i64) -> (String, String) {
    let subject = format!(
        "Reminder: your submission for \"{}\" is due {}",
        cycle.title(),
        if days_left == 0 {
            "today".to_string()
        } else {
            format!("in {}", milestone_label(days_left).to_lowercase().replace(" left", ""))
        }
    );
    let body = format!(
        "Good day.\n\n\
         Your submission for the work cycle \"{}\" is due on {} ({}).\n\n\
         Please submit your work before the deadline.\n\n\
         — Worktrack System",
        cycle.title(),
        due_date_line(cycle.due_at()),
        milestone_label(days_left).to_lowercase(),
    );
    (subject, body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::UserId;

    fn cycle() -> WorkCycle {
        let now = Timestamp::now();
        WorkCycle::new(
            "Q3 accomplishment report",
            "",
            now.plus_days(3),
            UserId::new("admin-1").unwrap(),
            now,
        )
        .unwrap()
    }

    #[test]
    fn labels_read_naturally() {
        assert_eq!(milestone_label(0), "Due today");
        assert_eq!(milestone_label(1), "1 day left");
        assert_eq!(milestone_label(5), "5 days left");
    }

    #[test]
    fn due_day_escalates_to_danger() {
        let c = cycle();
        assert_eq!(cycle_reminder_draft(&c, 0).priority, Priority::Danger);
        assert_eq!(cycle_reminder_draft(&c, 1).priority, Priority::Warning);
        assert_eq!(item_reminder_draft(&c, WorkItemId::new(), 0).priority, Priority::Danger);
    }

    #[test]
    fn dedup_keys_name_subject_and_milestone() {
        let cycle_id = WorkCycleId::new();
        let key = cycle_reminder_dedup_key(cycle_id, 3);
        assert_eq!(key, format!("cycle:{cycle_id}:reminder:3d"));

        let item_id = WorkItemId::new();
        assert_eq!(
            item_reminder_dedup_key(item_id, 0),
            format!("item:{item_id}:reminder:0d")
        );
    }

    #[test]
    fn reminder_email_names_the_cycle() {
        let c = cycle();
        let (subject, body) = cycle_reminder_email(&c, 3);
        assert!(subject.contains("Q3 accomplishment report"));
        assert!(body.starts_with("Good day."));
        assert!(body.ends_with("— Worktrack System"));
    }
}
