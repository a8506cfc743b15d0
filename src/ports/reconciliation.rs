//! Atomic membership reconciliation.
//!
//! Reconciliation archives removed owners' items, creates or reactivates
//! items for new owners, and replaces the cycle's assignment records. All of
//! it must land or none of it; partial application would leave the roster
//! and the assignment records disagreeing. The store implements the whole
//! step as one transaction.

use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, TeamId, Timestamp, UserId, WorkCycleId};

/// One reconciliation request against one cycle.
#[derive(Debug, Clone)]
pub struct ReconciliationDirective {
    pub cycle_id: WorkCycleId,
    /// Fully resolved target owners. Never empty; handlers validate first.
    pub targets: BTreeSet<UserId>,
    /// Users named individually. Each keeps its own assignment record.
    pub explicit_users: BTreeSet<UserId>,
    /// The team assignment record to keep, when targets came from a team.
    pub team: Option<TeamId>,
    pub performed_by: UserId,
    /// Note recorded on items archived by this pass.
    pub note: Option<String>,
    pub now: Timestamp,
}

/// What a reconciliation pass actually did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconciliationOutcome {
    /// Owners whose items were archived.
    pub removed: BTreeSet<UserId>,
    /// Owners who received a brand new item.
    pub newly_added: BTreeSet<UserId>,
    /// Owners whose previously archived item was reactivated.
    pub reactivated: BTreeSet<UserId>,
}

#[async_trait]
pub trait ReconciliationStore: Send + Sync {
    /// Applies the directive atomically.
    ///
    /// # Errors
    ///
    /// - `CycleNotFound` if the cycle doesn't exist
    /// - `DatabaseError` on persistence failure; nothing is applied
    async fn reconcile(
        &self,
        directive: ReconciliationDirective,
    ) -> Result<ReconciliationOutcome, DomainError>;
}
