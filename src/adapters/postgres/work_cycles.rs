//! PostgreSQL implementation of WorkCycleRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{DomainError, ErrorCode, Timestamp, UserId, WorkCycleId};
use crate::domain::workcycle::WorkCycle;
use crate::ports::WorkCycleRepository;

pub struct PostgresWorkCycleRepository {
    pool: PgPool,
}

impl PostgresWorkCycleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct WorkCycleRow {
    id: Uuid,
    title: String,
    description: String,
    due_at: DateTime<Utc>,
    is_active: bool,
    created_by: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<WorkCycleRow> for WorkCycle {
    type Error = DomainError;

    fn try_from(row: WorkCycleRow) -> Result<Self, Self::Error> {
        let created_by = row
            .created_by
            .map(UserId::new)
            .transpose()
            .map_err(|e| {
                DomainError::new(ErrorCode::DatabaseError, format!("Invalid created_by: {}", e))
            })?;

        Ok(WorkCycle::reconstitute(
            WorkCycleId::from_uuid(row.id),
            row.title,
            row.description,
            Timestamp::from_datetime(row.due_at),
            row.is_active,
            created_by,
            Timestamp::from_datetime(row.created_at),
        ))
    }
}

const SELECT_COLUMNS: &str =
    "id, title, description, due_at, is_active, created_by, created_at";

#[async_trait]
impl WorkCycleRepository for PostgresWorkCycleRepository {
    async fn save(&self, cycle: &WorkCycle) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO work_cycles (id, title, description, due_at, is_active, created_by, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(cycle.id().as_uuid())
        .bind(cycle.title())
        .bind(cycle.description())
        .bind(cycle.due_at().as_datetime())
        .bind(cycle.is_active())
        .bind(cycle.created_by().map(|u| u.as_str()))
        .bind(cycle.created_at().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to save work cycle: {}", e))
        })?;

        Ok(())
    }

    async fn update(&self, cycle: &WorkCycle) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE work_cycles SET
                title = $2,
                description = $3,
                due_at = $4,
                is_active = $5
            WHERE id = $1
            "#,
        )
        .bind(cycle.id().as_uuid())
        .bind(cycle.title())
        .bind(cycle.description())
        .bind(cycle.due_at().as_datetime())
        .bind(cycle.is_active())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to update work cycle: {}", e))
        })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(ErrorCode::CycleNotFound, "Work cycle not found"));
        }

        Ok(())
    }

    async fn find_by_id(&self, id: WorkCycleId) -> Result<Option<WorkCycle>, DomainError> {
        let row: Option<WorkCycleRow> = sqlx::query_as(&format!(
            "SELECT {} FROM work_cycles WHERE id = $1",
            SELECT_COLUMNS
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to find work cycle: {}", e))
        })?;

        row.map(WorkCycle::try_from).transpose()
    }

    async fn list_active(&self) -> Result<Vec<WorkCycle>, DomainError> {
        let rows: Vec<WorkCycleRow> = sqlx::query_as(&format!(
            "SELECT {} FROM work_cycles WHERE is_active ORDER BY due_at",
            SELECT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to list work cycles: {}", e))
        })?;

        rows.into_iter().map(WorkCycle::try_from).collect()
    }

    async fn list_all(&self) -> Result<Vec<WorkCycle>, DomainError> {
        let rows: Vec<WorkCycleRow> = sqlx::query_as(&format!(
            "SELECT {} FROM work_cycles ORDER BY due_at",
            SELECT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to list work cycles: {}", e))
        })?;

        rows.into_iter().map(WorkCycle::try_from).collect()
    }

    async fn has_protected_dependents(&self, id: WorkCycleId) -> Result<bool, DomainError> {
        // Submissions and discussion history must survive; their presence
        // blocks deletion.
        let (exists,): (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM work_items i
                LEFT JOIN thread_messages m ON m.work_item_id = i.id
                WHERE i.cycle_id = $1
                  AND (i.submitted_at IS NOT NULL OR m.id IS NOT NULL)
            )
            "#,
        )
        .bind(id.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to check dependents: {}", e))
        })?;

        Ok(exists)
    }

    async fn delete(&self, id: WorkCycleId) -> Result<(), DomainError> {
        if self.has_protected_dependents(id).await? {
            return Err(DomainError::deletion_blocked(format!("Work cycle {}", id)));
        }

        let result = sqlx::query("DELETE FROM work_cycles WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                DomainError::new(
                    ErrorCode::DatabaseError,
                    format!("Failed to delete work cycle: {}", e),
                )
            })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(ErrorCode::CycleNotFound, "Work cycle not found"));
        }

        Ok(())
    }
}
