//! The in-app notification record.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{NotificationId, Timestamp, UserId, WorkCycleId, WorkItemId};

/// What kind of event a notification reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Reminder,
    Status,
    Review,
    Assignment,
    Message,
    System,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Reminder => "reminder",
            Category::Status => "status",
            Category::Review => "review",
            Category::Assignment => "assignment",
            Category::Message => "message",
            Category::System => "system",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "reminder" => Some(Category::Reminder),
            "status" => Some(Category::Status),
            "review" => Some(Category::Review),
            "assignment" => Some(Category::Assignment),
            "message" => Some(Category::Message),
            "system" => Some(Category::System),
            _ => None,
        }
    }
}

/// Display urgency of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Info,
    Warning,
    Danger,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Info => "info",
            Priority::Warning => "warning",
            Priority::Danger => "danger",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "info" => Some(Priority::Info),
            "warning" => Some(Priority::Warning),
            "danger" => Some(Priority::Danger),
            _ => None,
        }
    }
}

/// Everything a notification carries except identity, recipient, and read
/// state. Built by the notify services, turned into a [`Notification`] by the
/// store.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationDraft {
    pub category: Category,
    pub priority: Priority,
    pub title: String,
    pub body: String,
    pub work_item: Option<WorkItemId>,
    pub work_cycle: Option<WorkCycleId>,
}

/// One in-app notification for one recipient.
///
/// `dedup_key` makes delivery idempotent: the store refuses to create a
/// second notification with the same (recipient, category, key) triple.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    id: NotificationId,
    recipient: UserId,
    category: Category,
    priority: Priority,
    title: String,
    body: String,
    work_item: Option<WorkItemId>,
    work_cycle: Option<WorkCycleId>,
    dedup_key: Option<String>,
    is_read: bool,
    read_at: Option<Timestamp>,
    created_at: Timestamp,
}

impl Notification {
    pub fn from_draft(
        recipient: UserId,
        draft: NotificationDraft,
        dedup_key: Option<String>,
        now: Timestamp,
    ) -> Self {
        Self {
            id: NotificationId::new(),
            recipient,
            category: draft.category,
            priority: draft.priority,
            title: draft.title,
            body: draft.body,
            work_item: draft.work_item,
            work_cycle: draft.work_cycle,
            dedup_key,
            is_read: false,
            read_at: None,
            created_at: now,
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: NotificationId,
        recipient: UserId,
        category: Category,
        priority: Priority,
        title: String,
        body: String,
        work_item: Option<WorkItemId>,
        work_cycle: Option<WorkCycleId>,
        dedup_key: Option<String>,
        is_read: bool,
        read_at: Option<Timestamp>,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            recipient,
            category,
            priority,
            title,
            body,
            work_item,
            work_cycle,
            dedup_key,
            is_read,
            read_at,
            created_at,
        }
    }

    pub fn id(&self) -> NotificationId {
        self.id
    }

    pub fn recipient(&self) -> &UserId {
        &self.recipient
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn work_item(&self) -> Option<WorkItemId> {
        self.work_item
    }

    pub fn work_cycle(&self) -> Option<WorkCycleId> {
        self.work_cycle
    }

    pub fn dedup_key(&self) -> Option<&str> {
        self.dedup_key.as_deref()
    }

    pub fn is_read(&self) -> bool {
        self.is_read
    }

    pub fn read_at(&self) -> Option<Timestamp> {
        self.read_at
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Marks the notification read. Idempotent; the first read wins.
    pub fn mark_as_read(&mut self, now: Timestamp) -> bool {
        if self.is_read {
            return false;
        }
        self.is_read = true;
        self.read_at = Some(now);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> NotificationDraft {
        NotificationDraft {
            category: Category::System,
            priority: Priority::Info,
            title: "Work cycle updated".into(),
            body: "The details of a work cycle assigned to you were updated.".into(),
            work_item: None,
            work_cycle: Some(WorkCycleId::new()),
        }
    }

    #[test]
    fn new_notification_is_unread() {
        let n = Notification::from_draft(
            UserId::new("u1").unwrap(),
            draft(),
            Some("cycle:x:system:updated".into()),
            Timestamp::now(),
        );
        assert!(!n.is_read());
        assert!(n.read_at().is_none());
    }

    #[test]
    fn mark_as_read_is_idempotent() {
        let mut n =
            Notification::from_draft(UserId::new("u1").unwrap(), draft(), None, Timestamp::now());
        let t1 = Timestamp::now();
        assert!(n.mark_as_read(t1));
        assert!(!n.mark_as_read(t1.plus_secs(60)));
        assert_eq!(n.read_at(), Some(t1));
    }

    #[test]
    fn category_and_priority_round_trip() {
        for c in [
            Category::Reminder,
            Category::Status,
            Category::Review,
            Category::Assignment,
            Category::Message,
            Category::System,
        ] {
            assert_eq!(Category::parse(c.as_str()), Some(c));
        }
        for p in [Priority::Info, Priority::Warning, Priority::Danger] {
            assert_eq!(Priority::parse(p.as_str()), Some(p));
        }
    }
}
