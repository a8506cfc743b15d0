//! In-memory work items, assignment records, and reconciliation.
//!
//! One struct backs three ports because reconciliation touches items and
//! assignment records together. A single mutex over the whole board gives
//! the pass the same all-or-nothing behavior the Postgres adapter gets from
//! a transaction.

use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::assignment::{ReconciliationPlan, WorkAssignment};
use crate::domain::foundation::{DomainError, ErrorCode, UserId, WorkCycleId, WorkItemId};
use crate::domain::workitem::{InactiveReason, WorkItem};
use crate::ports::{
    ReconciliationDirective, ReconciliationOutcome, ReconciliationStore, WorkAssignmentRepository,
    WorkItemRepository,
};

#[derive(Default)]
struct BoardState {
    items: HashMap<WorkItemId, WorkItem>,
    assignments: Vec<WorkAssignment>,
}

#[derive(Default)]
pub struct InMemoryWorkBoard {
    state: Mutex<BoardState>,
}

impl InMemoryWorkBoard {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WorkItemRepository for InMemoryWorkBoard {
    async fn find_by_id(&self, id: WorkItemId) -> Result<Option<WorkItem>, DomainError> {
        let state = self.state.lock().unwrap();
        Ok(state.items.get(&id).cloned())
    }

    async fn find_by_cycle_and_owner(
        &self,
        cycle_id: WorkCycleId,
        owner: &UserId,
    ) -> Result<Option<WorkItem>, DomainError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .items
            .values()
            .find(|i| i.cycle_id() == cycle_id && i.owner() == owner)
            .cloned())
    }

    async fn list_for_cycle(&self, cycle_id: WorkCycleId) -> Result<Vec<WorkItem>, DomainError> {
        let state = self.state.lock().unwrap();
        let mut items: Vec<WorkItem> = state
            .items
            .values()
            .filter(|i| i.cycle_id() == cycle_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| a.owner().cmp(b.owner()));
        Ok(items)
    }

    async fn list_active_for_cycle(
        &self,
        cycle_id: WorkCycleId,
    ) -> Result<Vec<WorkItem>, DomainError> {
        let mut items = WorkItemRepository::list_for_cycle(self, cycle_id).await?;
        items.retain(|i| i.is_active());
        Ok(items)
    }

    async fn list_active_for_owner(&self, owner: &UserId) -> Result<Vec<WorkItem>, DomainError> {
        let state = self.state.lock().unwrap();
        let mut items: Vec<WorkItem> = state
            .items
            .values()
            .filter(|i| i.owner() == owner && i.is_active())
            .cloned()
            .collect();
        items.sort_by_key(|i| i.created_at());
        Ok(items)
    }

    async fn save(&self, item: &WorkItem) -> Result<(), DomainError> {
        let mut state = self.state.lock().unwrap();
        state.items.insert(item.id(), item.clone());
        Ok(())
    }

    async fn update(&self, item: &WorkItem) -> Result<(), DomainError> {
        let mut state = self.state.lock().unwrap();
        if !state.items.contains_key(&item.id()) {
            return Err(DomainError::new(
                ErrorCode::ItemNotFound,
                format!("No work item with id {}", item.id()),
            ));
        }
        state.items.insert(item.id(), item.clone());
        Ok(())
    }
}

#[async_trait]
impl ReconciliationStore for InMemoryWorkBoard {
    async fn reconcile(
        &self,
        directive: ReconciliationDirective,
    ) -> Result<ReconciliationOutcome, DomainError> {
        let mut state = self.state.lock().unwrap();

        let existing: BTreeSet<UserId> = state
            .items
            .values()
            .filter(|i| i.cycle_id() == directive.cycle_id && i.is_active())
            .map(|i| i.owner().clone())
            .collect();

        let plan = ReconciliationPlan::compute(&existing, directive.targets.clone())?;

        let mut outcome = ReconciliationOutcome::default();

        // Archive items of removed owners.
        for item in state
            .items
            .values_mut()
            .filter(|i| i.cycle_id() == directive.cycle_id && i.is_active())
        {
            if plan.removed().contains(item.owner()) {
                let stored = item.clone();
                item.deactivate(
                    InactiveReason::Reassigned,
                    directive.note.clone().unwrap_or_default(),
                    Some(directive.performed_by.clone()),
                );
                item.apply_audit_rules(&stored, directive.now);
                outcome.removed.insert(item.owner().clone());
            }
        }

        // Reactivate archived items or create fresh ones for new owners.
        for owner in plan.newly_added() {
            let archived_id = state
                .items
                .values()
                .find(|i| i.cycle_id() == directive.cycle_id && i.owner() == owner)
                .map(|i| i.id());
            if let Some(id) = archived_id {
                if let Some(item) = state.items.get_mut(&id) {
                    let stored = item.clone();
                    item.reactivate();
                    item.apply_audit_rules(&stored, directive.now);
                    outcome.reactivated.insert(owner.clone());
                }
            } else {
                let item = WorkItem::new(directive.cycle_id, owner.clone(), directive.now);
                state.items.insert(item.id(), item);
                outcome.newly_added.insert(owner.clone());
            }
        }

        // Replace the cycle's assignment records.
        state
            .assignments
            .retain(|a| a.cycle_id() != directive.cycle_id);
        for user in &directive.explicit_users {
            state.assignments.push(WorkAssignment::for_user(
                directive.cycle_id,
                user.clone(),
                directive.now,
            ));
        }
        if let Some(team) = directive.team {
            state
                .assignments
                .push(WorkAssignment::for_team(directive.cycle_id, team, directive.now));
        }

        Ok(outcome)
    }
}

#[async_trait]
impl WorkAssignmentRepository for InMemoryWorkBoard {
    async fn list_for_cycle(
        &self,
        cycle_id: WorkCycleId,
    ) -> Result<Vec<WorkAssignment>, DomainError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .assignments
            .iter()
            .filter(|a| a.cycle_id() == cycle_id)
            .cloned()
            .collect())
    }
}
