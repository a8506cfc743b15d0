//! In-memory work cycle repository.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ErrorCode, WorkCycleId};
use crate::domain::workcycle::WorkCycle;
use crate::ports::WorkCycleRepository;

#[derive(Default)]
struct CycleState {
    cycles: HashMap<WorkCycleId, WorkCycle>,
    protected: HashSet<WorkCycleId>,
}

#[derive(Default)]
pub struct InMemoryWorkCycleRepository {
    state: Mutex<CycleState>,
}

impl InMemoryWorkCycleRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a cycle as having protected dependents, blocking deletion.
    pub fn mark_protected(&self, id: WorkCycleId) {
        self.state.lock().unwrap().protected.insert(id);
    }
}

#[async_trait]
impl WorkCycleRepository for InMemoryWorkCycleRepository {
    async fn save(&self, cycle: &WorkCycle) -> Result<(), DomainError> {
        let mut state = self.state.lock().unwrap();
        state.cycles.insert(cycle.id(), cycle.clone());
        Ok(())
    }

    async fn update(&self, cycle: &WorkCycle) -> Result<(), DomainError> {
        let mut state = self.state.lock().unwrap();
        if !state.cycles.contains_key(&cycle.id()) {
            return Err(cycle_not_found(cycle.id()));
        }
        state.cycles.insert(cycle.id(), cycle.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: WorkCycleId) -> Result<Option<WorkCycle>, DomainError> {
        let state = self.state.lock().unwrap();
        Ok(state.cycles.get(&id).cloned())
    }

    async fn list_active(&self) -> Result<Vec<WorkCycle>, DomainError> {
        let state = self.state.lock().unwrap();
        let mut cycles: Vec<WorkCycle> = state
            .cycles
            .values()
            .filter(|c| c.is_active())
            .cloned()
            .collect();
        cycles.sort_by_key(|c| c.created_at());
        Ok(cycles)
    }

    async fn list_all(&self) -> Result<Vec<WorkCycle>, DomainError> {
        let state = self.state.lock().unwrap();
        let mut cycles: Vec<WorkCycle> = state.cycles.values().cloned().collect();
        cycles.sort_by_key(|c| c.created_at());
        Ok(cycles)
    }

    async fn has_protected_dependents(&self, id: WorkCycleId) -> Result<bool, DomainError> {
        let state = self.state.lock().unwrap();
        Ok(state.protected.contains(&id))
    }

    async fn delete(&self, id: WorkCycleId) -> Result<(), DomainError> {
        let mut state = self.state.lock().unwrap();
        if !state.cycles.contains_key(&id) {
            return Err(cycle_not_found(id));
        }
        if state.protected.contains(&id) {
            return Err(DomainError::deletion_blocked(format!("Work cycle {id}")));
        }
        state.cycles.remove(&id);
        Ok(())
    }
}

fn cycle_not_found(id: WorkCycleId) -> DomainError {
    DomainError::new(ErrorCode::CycleNotFound, format!("No work cycle with id {id}"))
}
