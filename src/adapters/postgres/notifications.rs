//! PostgreSQL implementation of NotificationStore.
//!
//! Idempotency rides on a partial unique index over (recipient, category,
//! dedup_key). `ensure` inserts with `ON CONFLICT DO NOTHING` and falls back
//! to selecting the survivor, so concurrent deliveries of the same key agree
//! on one row and exactly one caller sees `created = true`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{
    DomainError, ErrorCode, NotificationId, Timestamp, UserId, WorkCycleId, WorkItemId,
};
use crate::domain::notification::{Category, Notification, NotificationDraft, Priority};
use crate::ports::NotificationStore;

pub struct PostgresNotificationStore {
    pool: PgPool,
}

impl PostgresNotificationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct NotificationRow {
    id: Uuid,
    recipient: String,
    category: String,
    priority: String,
    title: String,
    body: String,
    work_item_id: Option<Uuid>,
    work_cycle_id: Option<Uuid>,
    dedup_key: Option<String>,
    is_read: bool,
    read_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl TryFrom<NotificationRow> for Notification {
    type Error = DomainError;

    fn try_from(row: NotificationRow) -> Result<Self, Self::Error> {
        let category = Category::parse(&row.category).ok_or_else(|| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Invalid category value: {}", row.category),
            )
        })?;
        let priority = Priority::parse(&row.priority).ok_or_else(|| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Invalid priority value: {}", row.priority),
            )
        })?;
        let recipient = UserId::new(row.recipient).map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Invalid recipient: {}", e))
        })?;

        Ok(Notification::reconstitute(
            NotificationId::from_uuid(row.id),
            recipient,
            category,
            priority,
            row.title,
            row.body,
            row.work_item_id.map(WorkItemId::from_uuid),
            row.work_cycle_id.map(WorkCycleId::from_uuid),
            row.dedup_key,
            row.is_read,
            row.read_at.map(Timestamp::from_datetime),
            Timestamp::from_datetime(row.created_at),
        ))
    }
}

const NOTIFICATION_COLUMNS: &str = "id, recipient, category, priority, title, body, \
     work_item_id, work_cycle_id, dedup_key, is_read, read_at, created_at";

fn db_err(context: &str, e: sqlx::Error) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, format!("{}: {}", context, e))
}

async fn insert(
    pool: &PgPool,
    notification: &Notification,
    on_conflict_do_nothing: bool,
) -> Result<bool, DomainError> {
    let conflict_clause = if on_conflict_do_nothing {
        " ON CONFLICT (recipient, category, dedup_key) WHERE dedup_key IS NOT NULL DO NOTHING"
    } else {
        ""
    };
    let result = sqlx::query(&format!(
        "INSERT INTO notifications ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12){}",
        NOTIFICATION_COLUMNS, conflict_clause
    ))
    .bind(notification.id().as_uuid())
    .bind(notification.recipient().as_str())
    .bind(notification.category().as_str())
    .bind(notification.priority().as_str())
    .bind(notification.title())
    .bind(notification.body())
    .bind(notification.work_item().map(|i| *i.as_uuid()))
    .bind(notification.work_cycle().map(|c| *c.as_uuid()))
    .bind(notification.dedup_key())
    .bind(notification.is_read())
    .bind(notification.read_at().map(|t| *t.as_datetime()))
    .bind(notification.created_at().as_datetime())
    .execute(pool)
    .await
    .map_err(|e| db_err("Failed to insert notification", e))?;

    Ok(result.rows_affected() > 0)
}

#[async_trait]
impl NotificationStore for PostgresNotificationStore {
    async fn ensure(
        &self,
        recipient: &UserId,
        category: Category,
        dedup_key: &str,
        draft: NotificationDraft,
        now: Timestamp,
    ) -> Result<(Notification, bool), DomainError> {
        let candidate = Notification::from_draft(
            recipient.clone(),
            draft,
            Some(dedup_key.to_string()),
            now,
        );

        if insert(&self.pool, &candidate, true).await? {
            return Ok((candidate, true));
        }

        // Lost the race or delivered earlier; fetch the survivor.
        let row: NotificationRow = sqlx::query_as(&format!(
            "SELECT {} FROM notifications WHERE recipient = $1 AND category = $2 AND dedup_key = $3",
            NOTIFICATION_COLUMNS
        ))
        .bind(recipient.as_str())
        .bind(category.as_str())
        .bind(dedup_key)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_err("Failed to fetch existing notification", e))?;

        Ok((Notification::try_from(row)?, false))
    }

    async fn create(
        &self,
        recipient: &UserId,
        draft: NotificationDraft,
        now: Timestamp,
    ) -> Result<Notification, DomainError> {
        let notification = Notification::from_draft(recipient.clone(), draft, None, now);
        insert(&self.pool, &notification, false).await?;
        Ok(notification)
    }

    async fn list_for_recipient(
        &self,
        recipient: &UserId,
        unread_only: bool,
    ) -> Result<Vec<Notification>, DomainError> {
        let filter = if unread_only { " AND NOT is_read" } else { "" };
        let rows: Vec<NotificationRow> = sqlx::query_as(&format!(
            "SELECT {} FROM notifications WHERE recipient = $1{} ORDER BY created_at DESC",
            NOTIFICATION_COLUMNS, filter
        ))
        .bind(recipient.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_err("Failed to list notifications", e))?;

        rows.into_iter().map(Notification::try_from).collect()
    }

    async fn unread_count(&self, recipient: &UserId) -> Result<u64, DomainError> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM notifications WHERE recipient = $1 AND NOT is_read",
        )
        .bind(recipient.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_err("Failed to count notifications", e))?;

        Ok(count as u64)
    }

    async fn mark_read(
        &self,
        recipient: &UserId,
        id: NotificationId,
        now: Timestamp,
    ) -> Result<Notification, DomainError> {
        let row: Option<NotificationRow> = sqlx::query_as(&format!(
            r#"
            UPDATE notifications
            SET is_read = TRUE, read_at = COALESCE(read_at, $3)
            WHERE id = $1 AND recipient = $2
            RETURNING {}
            "#,
            NOTIFICATION_COLUMNS
        ))
        .bind(id.as_uuid())
        .bind(recipient.as_str())
        .bind(now.as_datetime())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_err("Failed to mark notification read", e))?;

        match row {
            Some(row) => Notification::try_from(row),
            None => Err(DomainError::new(ErrorCode::ItemNotFound, "Notification not found")),
        }
    }

    async fn mark_all_read(
        &self,
        recipient: &UserId,
        category: Option<Category>,
        now: Timestamp,
    ) -> Result<u64, DomainError> {
        let result = match category {
            Some(category) => {
                sqlx::query(
                    r#"
                    UPDATE notifications
                    SET is_read = TRUE, read_at = $3
                    WHERE recipient = $1 AND category = $2 AND NOT is_read
                    "#,
                )
                .bind(recipient.as_str())
                .bind(category.as_str())
                .bind(now.as_datetime())
                .execute(&self.pool)
                .await
            }
            None => {
                sqlx::query(
                    r#"
                    UPDATE notifications
                    SET is_read = TRUE, read_at = $2
                    WHERE recipient = $1 AND NOT is_read
                    "#,
                )
                .bind(recipient.as_str())
                .bind(now.as_datetime())
                .execute(&self.pool)
                .await
            }
        }
        .map_err(|e| db_err("Failed to mark notifications read", e))?;

        Ok(result.rows_affected())
    }
}
