//! Assignment records linking a work cycle to a user or a team.

use uuid::Uuid;

use crate::domain::foundation::{TeamId, Timestamp, UserId, WorkCycleId};

/// A membership record for a work cycle.
///
/// Either `user` or `team` is set; a team assignment stands for the team's
/// current members and is expanded at reconciliation time.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkAssignment {
    id: Uuid,
    cycle_id: WorkCycleId,
    user: Option<UserId>,
    team: Option<TeamId>,
    created_at: Timestamp,
}

impl WorkAssignment {
    pub fn for_user(cycle_id: WorkCycleId, user: UserId, now: Timestamp) -> Self {
        Self {
            id: Uuid::new_v4(),
            cycle_id,
            user: Some(user),
            team: None,
            created_at: now,
        }
    }

    pub fn for_team(cycle_id: WorkCycleId, team: TeamId, now: Timestamp) -> Self {
        Self {
            id: Uuid::new_v4(),
            cycle_id,
            user: None,
            team: Some(team),
            created_at: now,
        }
    }

    pub fn reconstitute(
        id: Uuid,
        cycle_id: WorkCycleId,
        user: Option<UserId>,
        team: Option<TeamId>,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            cycle_id,
            user,
            team,
            created_at,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn cycle_id(&self) -> WorkCycleId {
        self.cycle_id
    }

    pub fn user(&self) -> Option<&UserId> {
        self.user.as_ref()
    }

    pub fn team(&self) -> Option<TeamId> {
        self.team
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }
}
