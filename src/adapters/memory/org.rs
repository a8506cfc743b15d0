//! In-memory organization directory.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ErrorCode, TeamId, UserId};
use crate::domain::org::{OrgAssignment, Team};
use crate::ports::{OrgDirectory, UserProfile};

#[derive(Default)]
struct DirectoryState {
    profiles: HashMap<UserId, UserProfile>,
    assignments: HashMap<UserId, OrgAssignment>,
    teams: HashMap<TeamId, Team>,
}

/// Directory backed by hash maps, populated by test setup.
#[derive(Default)]
pub struct InMemoryOrgDirectory {
    state: Mutex<DirectoryState>,
}

impl InMemoryOrgDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_profile(&self, profile: UserProfile) {
        let mut state = self.state.lock().unwrap();
        state.profiles.insert(profile.id.clone(), profile);
    }

    pub fn register_team(&self, team: Team) {
        let mut state = self.state.lock().unwrap();
        state.teams.insert(team.id(), team);
    }

    pub fn place(&self, assignment: OrgAssignment) {
        let mut state = self.state.lock().unwrap();
        state.assignments.insert(assignment.user().clone(), assignment);
    }
}

#[async_trait]
impl OrgDirectory for InMemoryOrgDirectory {
    async fn assignment_for(&self, user: &UserId) -> Result<Option<OrgAssignment>, DomainError> {
        let state = self.state.lock().unwrap();
        Ok(state.assignments.get(user).cloned())
    }

    async fn members_of(&self, team: TeamId) -> Result<Vec<UserId>, DomainError> {
        let state = self.state.lock().unwrap();
        let mut members: Vec<UserId> = state
            .assignments
            .values()
            .filter(|a| a.touches(team))
            .filter(|a| {
                state
                    .profiles
                    .get(a.user())
                    .map(|p| p.is_active)
                    .unwrap_or(false)
            })
            .map(|a| a.user().clone())
            .collect();
        members.sort();
        Ok(members)
    }

    async fn team(&self, id: TeamId) -> Result<Team, DomainError> {
        let state = self.state.lock().unwrap();
        state.teams.get(&id).cloned().ok_or_else(|| {
            DomainError::new(ErrorCode::TeamNotFound, format!("No team with id {id}"))
        })
    }

    async fn profile(&self, user: &UserId) -> Result<UserProfile, DomainError> {
        let state = self.state.lock().unwrap();
        state.profiles.get(user).cloned().ok_or_else(|| {
            DomainError::new(ErrorCode::UserNotFound, format!("No user with id {user}"))
        })
    }

    async fn profiles(&self, users: &[UserId]) -> Result<Vec<UserProfile>, DomainError> {
        let state = self.state.lock().unwrap();
        Ok(users
            .iter()
            .filter_map(|u| state.profiles.get(u).cloned())
            .collect())
    }
}
