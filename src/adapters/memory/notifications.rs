//! In-memory notification store.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ErrorCode, NotificationId, Timestamp, UserId};
use crate::domain::notification::{Category, Notification, NotificationDraft};
use crate::ports::NotificationStore;

#[derive(Default)]
pub struct InMemoryNotificationStore {
    notifications: Mutex<Vec<Notification>>,
}

impl InMemoryNotificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every notification ever created, in creation order.
    pub fn all(&self) -> Vec<Notification> {
        self.notifications.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationStore for InMemoryNotificationStore {
    async fn ensure(
        &self,
        recipient: &UserId,
        category: Category,
        dedup_key: &str,
        draft: NotificationDraft,
        now: Timestamp,
    ) -> Result<(Notification, bool), DomainError> {
        let mut notifications = self.notifications.lock().unwrap();
        if let Some(existing) = notifications.iter().find(|n| {
            n.recipient() == recipient
                && n.category() == category
                && n.dedup_key() == Some(dedup_key)
        }) {
            return Ok((existing.clone(), false));
        }
        let notification =
            Notification::from_draft(recipient.clone(), draft, Some(dedup_key.to_string()), now);
        notifications.push(notification.clone());
        Ok((notification, true))
    }

    async fn create(
        &self,
        recipient: &UserId,
        draft: NotificationDraft,
        now: Timestamp,
    ) -> Result<Notification, DomainError> {
        let notification = Notification::from_draft(recipient.clone(), draft, None, now);
        self.notifications.lock().unwrap().push(notification.clone());
        Ok(notification)
    }

    async fn list_for_recipient(
        &self,
        recipient: &UserId,
        unread_only: bool,
    ) -> Result<Vec<Notification>, DomainError> {
        let notifications = self.notifications.lock().unwrap();
        let mut list: Vec<Notification> = notifications
            .iter()
            .filter(|n| n.recipient() == recipient)
            .filter(|n| !unread_only || !n.is_read())
            .cloned()
            .collect();
        list.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(list)
    }

    async fn unread_count(&self, recipient: &UserId) -> Result<u64, DomainError> {
        let notifications = self.notifications.lock().unwrap();
        Ok(notifications
            .iter()
            .filter(|n| n.recipient() == recipient && !n.is_read())
            .count() as u64)
    }

    async fn mark_read(
        &self,
        recipient: &UserId,
        id: NotificationId,
        now: Timestamp,
    ) -> Result<Notification, DomainError> {
        let mut notifications = self.notifications.lock().unwrap();
        let notification = notifications
            .iter_mut()
            .find(|n| n.id() == id && n.recipient() == recipient)
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::ItemNotFound,
                    format!("No notification with id {id}"),
                )
            })?;
        notification.mark_as_read(now);
        Ok(notification.clone())
    }

    async fn mark_all_read(
        &self,
        recipient: &UserId,
        category: Option<Category>,
        now: Timestamp,
    ) -> Result<u64, DomainError> {
        let mut notifications = self.notifications.lock().unwrap();
        let mut changed = 0;
        for n in notifications.iter_mut().filter(|n| {
            n.recipient() == recipient && category.map(|c| n.category() == c).unwrap_or(true)
        }) {
            if n.mark_as_read(now) {
                changed += 1;
            }
        }
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::WorkCycleId;
    use crate::domain::notification::Priority;

    fn uid(s: &str) -> UserId {
        UserId::new(s).unwrap()
    }

    fn draft() -> NotificationDraft {
        NotificationDraft {
            category: Category::Reminder,
            priority: Priority::Warning,
            title: "Work cycle due: 3 days left".into(),
            body: "test".into(),
            work_item: None,
            work_cycle: Some(WorkCycleId::new()),
        }
    }

    #[tokio::test]
    async fn ensure_creates_once_per_key() {
        let store = InMemoryNotificationStore::new();
        let now = Timestamp::now();

        let (first, created) = store
            .ensure(&uid("a"), Category::Reminder, "cycle:x:reminder:3d", draft(), now)
            .await
            .unwrap();
        assert!(created);

        let (second, created) = store
            .ensure(&uid("a"), Category::Reminder, "cycle:x:reminder:3d", draft(), now)
            .await
            .unwrap();
        assert!(!created);
        assert_eq!(first.id(), second.id());

        // Same key for another recipient is a separate notification.
        let (_, created) = store
            .ensure(&uid("b"), Category::Reminder, "cycle:x:reminder:3d", draft(), now)
            .await
            .unwrap();
        assert!(created);
    }

    #[tokio::test]
    async fn mark_all_read_respects_category_filter() {
        let store = InMemoryNotificationStore::new();
        let now = Timestamp::now();
        store.create(&uid("a"), draft(), now).await.unwrap();
        let mut system = draft();
        system.category = Category::System;
        store.create(&uid("a"), system, now).await.unwrap();

        let changed = store
            .mark_all_read(&uid("a"), Some(Category::System), now)
            .await
            .unwrap();
        assert_eq!(changed, 1);
        assert_eq!(store.unread_count(&uid("a")).await.unwrap(), 1);

        // Second pass has nothing left to change.
        let changed = store
            .mark_all_read(&uid("a"), None, now)
            .await
            .unwrap();
        assert_eq!(changed, 1);
        assert_eq!(store.unread_count(&uid("a")).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn mark_read_rejects_foreign_notifications() {
        let store = InMemoryNotificationStore::new();
        let now = Timestamp::now();
        let n = store.create(&uid("a"), draft(), now).await.unwrap();

        let err = store.mark_read(&uid("b"), n.id(), now).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ItemNotFound);
    }
}
