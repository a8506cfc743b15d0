//! Pure set arithmetic behind membership reconciliation.

use std::collections::BTreeSet;

use crate::domain::foundation::{DomainError, ErrorCode, UserId};

/// The three disjoint partitions of a reconciliation.
///
/// Computed from the currently active owner set and the resolved target set.
/// `removed` items are archived, `newly_added` get fresh items (or have an
/// archived item reactivated), and `retained` items are left untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciliationPlan {
    removed: BTreeSet<UserId>,
    newly_added: BTreeSet<UserId>,
    retained: BTreeSet<UserId>,
}

impl ReconciliationPlan {
    /// Partitions `existing` active owners against the resolved `targets`.
    ///
    /// An empty target set is rejected; reconciliation must never silently
    /// strip every owner from a cycle.
    pub fn compute(
        existing: &BTreeSet<UserId>,
        targets: BTreeSet<UserId>,
    ) -> Result<Self, DomainError> {
        if targets.is_empty() {
            return Err(DomainError::new(
                ErrorCode::EmptyAssignmentTarget,
                "A work cycle must be assigned to at least one user or team",
            ));
        }

        let removed = existing.difference(&targets).cloned().collect();
        let newly_added = targets.difference(existing).cloned().collect();
        let retained = existing.intersection(&targets).cloned().collect();

        Ok(Self {
            removed,
            newly_added,
            retained,
        })
    }

    pub fn removed(&self) -> &BTreeSet<UserId> {
        &self.removed
    }

    pub fn newly_added(&self) -> &BTreeSet<UserId> {
        &self.newly_added
    }

    pub fn retained(&self) -> &BTreeSet<UserId> {
        &self.retained
    }

    /// True when nothing changes hands.
    pub fn is_noop(&self) -> bool {
        self.removed.is_empty() && self.newly_added.is_empty()
    }
}
