//! Read access to a cycle's assignment records.
//!
//! Writes happen inside [`super::ReconciliationStore::reconcile`]; this port
//! only exposes the current records for display and target resolution.

use async_trait::async_trait;

use crate::domain::assignment::WorkAssignment;
use crate::domain::foundation::{DomainError, WorkCycleId};

#[async_trait]
pub trait WorkAssignmentRepository: Send + Sync {
    async fn list_for_cycle(
        &self,
        cycle_id: WorkCycleId,
    ) -> Result<Vec<WorkAssignment>, DomainError>;
}
