//! Work cycle repository port (write side plus the listings the engine
//! itself needs).

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, WorkCycleId};
use crate::domain::workcycle::WorkCycle;

#[async_trait]
pub trait WorkCycleRepository: Send + Sync {
    /// Persists a new cycle.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on persistence failure
    async fn save(&self, cycle: &WorkCycle) -> Result<(), DomainError>;

    /// Updates an existing cycle.
    ///
    /// # Errors
    ///
    /// - `CycleNotFound` if the cycle doesn't exist
    /// - `DatabaseError` on persistence failure
    async fn update(&self, cycle: &WorkCycle) -> Result<(), DomainError>;

    /// Finds a cycle by id. Returns `None` if not found.
    async fn find_by_id(&self, id: WorkCycleId) -> Result<Option<WorkCycle>, DomainError>;

    /// All non-archived cycles. The reminder sweep walks this list.
    async fn list_active(&self) -> Result<Vec<WorkCycle>, DomainError>;

    /// Every cycle, archived included.
    async fn list_all(&self) -> Result<Vec<WorkCycle>, DomainError>;

    /// Whether protected records (submissions, discussion history) hang off
    /// this cycle. Deletion is refused while this holds.
    async fn has_protected_dependents(&self, id: WorkCycleId) -> Result<bool, DomainError>;

    /// Hard-deletes a cycle and its cascade-safe children.
    ///
    /// # Errors
    ///
    /// - `CycleNotFound` if the cycle doesn't exist
    /// - `DeletionBlocked` if protected dependents exist
    /// - `DatabaseError` on persistence failure
    async fn delete(&self, id: WorkCycleId) -> Result<(), DomainError>;
}
