//! PostgreSQL implementation of WorkItemRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{DomainError, ErrorCode, Timestamp, UserId, WorkCycleId, WorkItemId};
use crate::domain::workitem::{InactiveReason, ItemStatus, ReviewDecision, WorkItem};
use crate::ports::WorkItemRepository;

pub struct PostgresWorkItemRepository {
    pool: PgPool,
}

impl PostgresWorkItemRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(super) struct WorkItemRow {
    pub id: Uuid,
    pub cycle_id: Uuid,
    pub owner: String,
    pub status: String,
    pub review_decision: String,
    pub is_active: bool,
    pub inactive_reason: Option<String>,
    pub inactive_note: String,
    pub inactive_at: Option<DateTime<Utc>>,
    pub inactive_by: Option<String>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<WorkItemRow> for WorkItem {
    type Error = DomainError;

    fn try_from(row: WorkItemRow) -> Result<Self, Self::Error> {
        let status = ItemStatus::parse(&row.status).ok_or_else(|| {
            DomainError::new(ErrorCode::DatabaseError, format!("Invalid status value: {}", row.status))
        })?;
        let review_decision = ReviewDecision::parse(&row.review_decision).ok_or_else(|| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Invalid review decision value: {}", row.review_decision),
            )
        })?;
        let inactive_reason = row
            .inactive_reason
            .as_deref()
            .map(|s| {
                InactiveReason::parse(s).ok_or_else(|| {
                    DomainError::new(
                        ErrorCode::DatabaseError,
                        format!("Invalid inactive reason value: {}", s),
                    )
                })
            })
            .transpose()?;
        let owner = UserId::new(row.owner).map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Invalid owner: {}", e))
        })?;
        let inactive_by = row.inactive_by.map(UserId::new).transpose().map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Invalid inactive_by: {}", e))
        })?;

        Ok(WorkItem::reconstitute(
            WorkItemId::from_uuid(row.id),
            WorkCycleId::from_uuid(row.cycle_id),
            owner,
            status,
            review_decision,
            row.is_active,
            inactive_reason,
            row.inactive_note,
            row.inactive_at.map(Timestamp::from_datetime),
            inactive_by,
            row.submitted_at.map(Timestamp::from_datetime),
            row.reviewed_at.map(Timestamp::from_datetime),
            Timestamp::from_datetime(row.created_at),
        ))
    }
}

pub(super) const ITEM_COLUMNS: &str = "id, cycle_id, owner, status, review_decision, is_active, \
     inactive_reason, inactive_note, inactive_at, inactive_by, submitted_at, reviewed_at, created_at";

#[async_trait]
impl WorkItemRepository for PostgresWorkItemRepository {
    async fn find_by_id(&self, id: WorkItemId) -> Result<Option<WorkItem>, DomainError> {
        let row: Option<WorkItemRow> = sqlx::query_as(&format!(
            "SELECT {} FROM work_items WHERE id = $1",
            ITEM_COLUMNS
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to find work item: {}", e))
        })?;

        row.map(WorkItem::try_from).transpose()
    }

    async fn find_by_cycle_and_owner(
        &self,
        cycle_id: WorkCycleId,
        owner: &UserId,
    ) -> Result<Option<WorkItem>, DomainError> {
        let row: Option<WorkItemRow> = sqlx::query_as(&format!(
            "SELECT {} FROM work_items WHERE cycle_id = $1 AND owner = $2",
            ITEM_COLUMNS
        ))
        .bind(cycle_id.as_uuid())
        .bind(owner.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to find work item: {}", e))
        })?;

        row.map(WorkItem::try_from).transpose()
    }

    async fn list_for_cycle(&self, cycle_id: WorkCycleId) -> Result<Vec<WorkItem>, DomainError> {
        let rows: Vec<WorkItemRow> = sqlx::query_as(&format!(
            "SELECT {} FROM work_items WHERE cycle_id = $1 ORDER BY created_at",
            ITEM_COLUMNS
        ))
        .bind(cycle_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to list work items: {}", e))
        })?;

        rows.into_iter().map(WorkItem::try_from).collect()
    }

    async fn list_active_for_cycle(
        &self,
        cycle_id: WorkCycleId,
    ) -> Result<Vec<WorkItem>, DomainError> {
        let rows: Vec<WorkItemRow> = sqlx::query_as(&format!(
            "SELECT {} FROM work_items WHERE cycle_id = $1 AND is_active ORDER BY created_at",
            ITEM_COLUMNS
        ))
        .bind(cycle_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to list work items: {}", e))
        })?;

        rows.into_iter().map(WorkItem::try_from).collect()
    }

    async fn list_active_for_owner(&self, owner: &UserId) -> Result<Vec<WorkItem>, DomainError> {
        let rows: Vec<WorkItemRow> = sqlx::query_as(&format!(
            "SELECT {} FROM work_items WHERE owner = $1 AND is_active ORDER BY created_at",
            ITEM_COLUMNS
        ))
        .bind(owner.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to list work items: {}", e))
        })?;

        rows.into_iter().map(WorkItem::try_from).collect()
    }

    async fn save(&self, item: &WorkItem) -> Result<(), DomainError> {
        sqlx::query(&format!(
            "INSERT INTO work_items ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
            ITEM_COLUMNS
        ))
        .bind(item.id().as_uuid())
        .bind(item.cycle_id().as_uuid())
        .bind(item.owner().as_str())
        .bind(item.status().as_str())
        .bind(item.review_decision().as_str())
        .bind(item.is_active())
        .bind(item.inactive_reason().map(|r| r.as_str()))
        .bind(item.inactive_note())
        .bind(item.inactive_at().map(|t| *t.as_datetime()))
        .bind(item.inactive_by().map(|u| u.as_str()))
        .bind(item.submitted_at().map(|t| *t.as_datetime()))
        .bind(item.reviewed_at().map(|t| *t.as_datetime()))
        .bind(item.created_at().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.constraint() == Some("work_items_cycle_id_owner_key") {
                    return DomainError::new(
                        ErrorCode::ConcurrencyConflict,
                        "An item for this cycle and owner already exists",
                    );
                }
            }
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to save work item: {}", e))
        })?;

        Ok(())
    }

    async fn update(&self, item: &WorkItem) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE work_items SET
                status = $2,
                review_decision = $3,
                is_active = $4,
                inactive_reason = $5,
                inactive_note = $6,
                inactive_at = $7,
                inactive_by = $8,
                submitted_at = $9,
                reviewed_at = $10
            WHERE id = $1
            "#,
        )
        .bind(item.id().as_uuid())
        .bind(item.status().as_str())
        .bind(item.review_decision().as_str())
        .bind(item.is_active())
        .bind(item.inactive_reason().map(|r| r.as_str()))
        .bind(item.inactive_note())
        .bind(item.inactive_at().map(|t| *t.as_datetime()))
        .bind(item.inactive_by().map(|u| u.as_str()))
        .bind(item.submitted_at().map(|t| *t.as_datetime()))
        .bind(item.reviewed_at().map(|t| *t.as_datetime()))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to update work item: {}", e))
        })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(ErrorCode::ItemNotFound, "Work item not found"));
        }

        Ok(())
    }
}
