//! Read-only access to the organization: users, teams, and placements.
//!
//! The engine never writes to the directory; user and team management lives
//! upstream. This port resolves assignment targets to concrete user sets and
//! looks up profiles for email delivery.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, TeamId, UserId};
use crate::domain::org::{OrgAssignment, Role, Team};

/// Directory view of one user.
#[derive(Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub id: UserId,
    pub display_name: String,
    pub role: Role,
    /// Absent when the account has no address on file; such users still get
    /// in-app notifications.
    pub email: Option<String>,
    pub is_active: bool,
}

#[async_trait]
pub trait OrgDirectory: Send + Sync {
    /// The org placement of a user, if they have one.
    async fn assignment_for(&self, user: &UserId) -> Result<Option<OrgAssignment>, DomainError>;

    /// Active users whose placement touches the given team at any level.
    async fn members_of(&self, team: TeamId) -> Result<Vec<UserId>, DomainError>;

    /// Looks up a team.
    ///
    /// # Errors
    ///
    /// - `TeamNotFound` if no such team exists
    async fn team(&self, id: TeamId) -> Result<Team, DomainError>;

    /// Looks up one profile.
    ///
    /// # Errors
    ///
    /// - `UserNotFound` if no such user exists
    async fn profile(&self, user: &UserId) -> Result<UserProfile, DomainError>;

    /// Batch profile lookup. Unknown ids are silently skipped.
    async fn profiles(&self, users: &[UserId]) -> Result<Vec<UserProfile>, DomainError>;
}
