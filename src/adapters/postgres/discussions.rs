//! PostgreSQL implementation of DiscussionStore.
//!
//! Message ids come from a bigserial column, so they are monotonic within
//! the deployment and read cursors can compare them. Cursor upserts carry a
//! guard in the `ON CONFLICT` update so a stale advance never rolls a cursor
//! back.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::discussion::{ReadCursor, ThreadMessage};
use crate::domain::foundation::{
    DomainError, ErrorCode, MessageId, Timestamp, UserId, WorkItemId,
};
use crate::domain::org::Role;
use crate::ports::DiscussionStore;

pub struct PostgresDiscussionStore {
    pool: PgPool,
}

impl PostgresDiscussionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct MessageRow {
    id: i64,
    work_item_id: Uuid,
    sender: String,
    sender_role: String,
    body: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<MessageRow> for ThreadMessage {
    type Error = DomainError;

    fn try_from(row: MessageRow) -> Result<Self, Self::Error> {
        let sender = UserId::new(row.sender).map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Invalid sender: {}", e))
        })?;
        let sender_role = Role::parse(&row.sender_role).ok_or_else(|| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Invalid role value: {}", row.sender_role),
            )
        })?;

        Ok(ThreadMessage::reconstitute(
            MessageId::from_i64(row.id),
            WorkItemId::from_uuid(row.work_item_id),
            sender,
            sender_role,
            row.body,
            Timestamp::from_datetime(row.created_at),
        ))
    }
}

fn db_err(context: &str, e: sqlx::Error) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, format!("{}: {}", context, e))
}

#[async_trait]
impl DiscussionStore for PostgresDiscussionStore {
    async fn append(&self, message: ThreadMessage) -> Result<ThreadMessage, DomainError> {
        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO thread_messages (work_item_id, sender, sender_role, body, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(message.work_item().as_uuid())
        .bind(message.sender().as_str())
        .bind(message.sender_role().as_str())
        .bind(message.body())
        .bind(message.created_at().as_datetime())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_err("Failed to append message", e))?;

        Ok(message.with_id(MessageId::from_i64(id)))
    }

    async fn messages_for_item(
        &self,
        work_item: WorkItemId,
    ) -> Result<Vec<ThreadMessage>, DomainError> {
        let rows: Vec<MessageRow> = sqlx::query_as(
            r#"
            SELECT id, work_item_id, sender, sender_role, body, created_at
            FROM thread_messages
            WHERE work_item_id = $1
            ORDER BY id
            "#,
        )
        .bind(work_item.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_err("Failed to list messages", e))?;

        rows.into_iter().map(ThreadMessage::try_from).collect()
    }

    async fn cursor(
        &self,
        work_item: WorkItemId,
        user: &UserId,
    ) -> Result<Option<ReadCursor>, DomainError> {
        let row: Option<(i64, DateTime<Utc>)> = sqlx::query_as(
            r#"
            SELECT last_read_message_id, last_read_at
            FROM read_cursors
            WHERE work_item_id = $1 AND user_id = $2
            "#,
        )
        .bind(work_item.as_uuid())
        .bind(user.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_err("Failed to fetch cursor", e))?;

        Ok(row.map(|(id, at)| {
            ReadCursor::new(
                work_item,
                user.clone(),
                MessageId::from_i64(id),
                Timestamp::from_datetime(at),
            )
        }))
    }

    async fn upsert_cursor(&self, cursor: ReadCursor) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO read_cursors (work_item_id, user_id, last_read_message_id, last_read_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (work_item_id, user_id) DO UPDATE
            SET last_read_message_id = EXCLUDED.last_read_message_id,
                last_read_at = EXCLUDED.last_read_at
            WHERE read_cursors.last_read_message_id < EXCLUDED.last_read_message_id
            "#,
        )
        .bind(cursor.work_item().as_uuid())
        .bind(cursor.user().as_str())
        .bind(cursor.last_read_message().as_i64())
        .bind(cursor.last_read_at().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_err("Failed to upsert cursor", e))?;

        Ok(())
    }
}
