//! PostgreSQL membership reconciliation.
//!
//! The whole pass runs in one transaction: the cycle's items are locked
//! with `FOR UPDATE`, removed owners are archived, new owners get fresh or
//! reactivated items, and the assignment records are replaced. A failure
//! anywhere rolls everything back.

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::assignment::{ReconciliationPlan, WorkAssignment};
use crate::domain::foundation::{DomainError, ErrorCode, Timestamp, UserId, WorkCycleId};
use crate::domain::workitem::{InactiveReason, WorkItem};
use crate::ports::{
    ReconciliationDirective, ReconciliationOutcome, ReconciliationStore, WorkAssignmentRepository,
};

use super::work_items::{WorkItemRow, ITEM_COLUMNS};

pub struct PostgresReconciliationStore {
    pool: PgPool,
}

impl PostgresReconciliationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn db_err(context: &str, e: sqlx::Error) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, format!("{}: {}", context, e))
}

async fn update_item(
    tx: &mut Transaction<'_, Postgres>,
    item: &WorkItem,
) -> Result<(), DomainError> {
    sqlx::query(
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
    .execute(&mut **tx)
    .await
    .map_err(|e| db_err("Failed to update work item", e))?;

    Ok(())
}

#[async_trait]
impl ReconciliationStore for PostgresReconciliationStore {
    async fn reconcile(
        &self,
        directive: ReconciliationDirective,
    ) -> Result<ReconciliationOutcome, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_err("Failed to begin transaction", e))?;

        let (cycle_exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM work_cycles WHERE id = $1)")
                .bind(directive.cycle_id.as_uuid())
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| db_err("Failed to check cycle", e))?;
        if !cycle_exists {
            return Err(DomainError::new(ErrorCode::CycleNotFound, "Work cycle not found"));
        }

        // Lock every item of the cycle for the duration of the pass so two
        // concurrent reconciliations serialize instead of interleaving.
        let rows: Vec<WorkItemRow> = sqlx::query_as(&format!(
            "SELECT {} FROM work_items WHERE cycle_id = $1 FOR UPDATE",
            ITEM_COLUMNS
        ))
        .bind(directive.cycle_id.as_uuid())
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| db_err("Failed to lock work items", e))?;

        let items: Vec<WorkItem> = rows
            .into_iter()
            .map(WorkItem::try_from)
            .collect::<Result<_, _>>()?;

        let existing: BTreeSet<UserId> = items
            .iter()
            .filter(|i| i.is_active())
            .map(|i| i.owner().clone())
            .collect();
        let plan = ReconciliationPlan::compute(&existing, directive.targets.clone())?;

        let mut outcome = ReconciliationOutcome::default();

        for stored in items.iter().filter(|i| i.is_active()) {
            if plan.removed().contains(stored.owner()) {
                let mut item = stored.clone();
                item.deactivate(
                    InactiveReason::Reassigned,
                    directive.note.clone().unwrap_or_default(),
                    Some(directive.performed_by.clone()),
                );
                item.apply_audit_rules(stored, directive.now);
                update_item(&mut tx, &item).await?;
                outcome.removed.insert(item.owner().clone());
            }
        }

        for owner in plan.newly_added() {
            let archived = items
                .iter()
                .find(|i| i.owner() == owner && !i.is_active());
            if let Some(stored) = archived {
                let mut item = stored.clone();
                item.reactivate();
                item.apply_audit_rules(stored, directive.now);
                update_item(&mut tx, &item).await?;
                outcome.reactivated.insert(owner.clone());
            } else {
                let item = WorkItem::new(directive.cycle_id, owner.clone(), directive.now);
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
                .execute(&mut *tx)
                .await
                .map_err(|e| db_err("Failed to insert work item", e))?;
                outcome.newly_added.insert(owner.clone());
            }
        }

        sqlx::query("DELETE FROM work_assignments WHERE cycle_id = $1")
            .bind(directive.cycle_id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| db_err("Failed to clear assignments", e))?;

        for user in &directive.explicit_users {
            sqlx::query(
                r#"
                INSERT INTO work_assignments (id, cycle_id, user_id, team_id, created_at)
                VALUES ($1, $2, $3, NULL, $4)
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(directive.cycle_id.as_uuid())
            .bind(user.as_str())
            .bind(directive.now.as_datetime())
            .execute(&mut *tx)
            .await
            .map_err(|e| db_err("Failed to insert assignment", e))?;
        }
        if let Some(team) = directive.team {
            sqlx::query(
                r#"
                INSERT INTO work_assignments (id, cycle_id, user_id, team_id, created_at)
                VALUES ($1, $2, NULL, $3, $4)
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(directive.cycle_id.as_uuid())
            .bind(team.as_uuid())
            .bind(directive.now.as_datetime())
            .execute(&mut *tx)
            .await
            .map_err(|e| db_err("Failed to insert assignment", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| db_err("Failed to commit reconciliation", e))?;

        Ok(outcome)
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AssignmentRow {
    id: Uuid,
    cycle_id: Uuid,
    user_id: Option<String>,
    team_id: Option<Uuid>,
    created_at: DateTime<Utc>,
}

impl TryFrom<AssignmentRow> for WorkAssignment {
    type Error = DomainError;

    fn try_from(row: AssignmentRow) -> Result<Self, Self::Error> {
        let user = row.user_id.map(UserId::new).transpose().map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Invalid user_id: {}", e))
        })?;
        Ok(WorkAssignment::reconstitute(
            row.id,
            WorkCycleId::from_uuid(row.cycle_id),
            user,
            row.team_id.map(crate::domain::foundation::TeamId::from_uuid),
            Timestamp::from_datetime(row.created_at),
        ))
    }
}

#[async_trait]
impl WorkAssignmentRepository for PostgresReconciliationStore {
    async fn list_for_cycle(
        &self,
        cycle_id: WorkCycleId,
    ) -> Result<Vec<WorkAssignment>, DomainError> {
        let rows: Vec<AssignmentRow> = sqlx::query_as(
            r#"
            SELECT id, cycle_id, user_id, team_id, created_at
            FROM work_assignments
            WHERE cycle_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(cycle_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_err("Failed to list assignments", e))?;

        rows.into_iter().map(WorkAssignment::try_from).collect()
    }
}
