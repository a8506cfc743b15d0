//! Notification store port.
//!
//! The dedup contract lives here: `ensure` is get-or-create on the
//! (recipient, category, dedup_key) triple, and the boolean it returns is
//! what gates email delivery. `create` is for events that should always
//! produce a fresh notification.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, NotificationId, Timestamp, UserId};
use crate::domain::notification::{Category, Notification, NotificationDraft};

#[async_trait]
pub trait NotificationStore: Send + Sync {
    /// Get-or-create keyed on (recipient, category, dedup_key).
    ///
    /// Returns the notification and `true` when this call created it,
    /// `false` when an earlier delivery already had. Safe under concurrent
    /// calls with the same key.
    async fn ensure(
        &self,
        recipient: &UserId,
        category: Category,
        dedup_key: &str,
        draft: NotificationDraft,
        now: Timestamp,
    ) -> Result<(Notification, bool), DomainError>;

    /// Unconditionally creates a notification.
    async fn create(
        &self,
        recipient: &UserId,
        draft: NotificationDraft,
        now: Timestamp,
    ) -> Result<Notification, DomainError>;

    /// Notifications for one recipient, newest first.
    async fn list_for_recipient(
        &self,
        recipient: &UserId,
        unread_only: bool,
    ) -> Result<Vec<Notification>, DomainError>;

    /// Unread count for one recipient.
    async fn unread_count(&self, recipient: &UserId) -> Result<u64, DomainError>;

    /// Marks one notification read. Returns the updated notification.
    ///
    /// # Errors
    ///
    /// - `ItemNotFound` if the notification doesn't exist or belongs to
    ///   another recipient
    async fn mark_read(
        &self,
        recipient: &UserId,
        id: NotificationId,
        now: Timestamp,
    ) -> Result<Notification, DomainError>;

    /// Marks all of a recipient's unread notifications read, optionally
    /// restricted to one category. Returns how many changed.
    async fn mark_all_read(
        &self,
        recipient: &UserId,
        category: Option<Category>,
        now: Timestamp,
    ) -> Result<u64, DomainError>;
}
