//! Work item repository port.
//!
//! Items are unique per (cycle, owner) and soft-deleted only; reconciliation
//! and archive flows flip `is_active` rather than removing rows.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, UserId, WorkCycleId, WorkItemId};
use crate::domain::workitem::WorkItem;

#[async_trait]
pub trait WorkItemRepository: Send + Sync {
    /// Finds an item by id. Returns `None` if not found.
    async fn find_by_id(&self, id: WorkItemId) -> Result<Option<WorkItem>, DomainError>;

    /// Finds the one item for a (cycle, owner) pair, active or not.
    async fn find_by_cycle_and_owner(
        &self,
        cycle_id: WorkCycleId,
        owner: &UserId,
    ) -> Result<Option<WorkItem>, DomainError>;

    /// Every item ever created for a cycle, archived included.
    async fn list_for_cycle(&self, cycle_id: WorkCycleId) -> Result<Vec<WorkItem>, DomainError>;

    /// Active items for a cycle. This is the cycle's current roster.
    async fn list_active_for_cycle(
        &self,
        cycle_id: WorkCycleId,
    ) -> Result<Vec<WorkItem>, DomainError>;

    /// Active items across cycles for one owner.
    async fn list_active_for_owner(&self, owner: &UserId) -> Result<Vec<WorkItem>, DomainError>;

    /// Persists a new item.
    async fn save(&self, item: &WorkItem) -> Result<(), DomainError>;

    /// Updates an existing item.
    ///
    /// # Errors
    ///
    /// - `ItemNotFound` if the item doesn't exist
    /// - `DatabaseError` on persistence failure
    async fn update(&self, item: &WorkItem) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn work_item_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn WorkItemRepository) {}
    }
}
