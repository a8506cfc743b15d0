//! Resolution of assignment targets to a concrete owner set.

use std::collections::BTreeSet;

use crate::domain::foundation::{DomainError, ErrorCode, TeamId, UserId};
use crate::ports::OrgDirectory;

/// A resolved target set, ready for reconciliation.
#[derive(Debug, Clone)]
pub struct TargetResolution {
    /// Union of explicit users and current team members.
    pub targets: BTreeSet<UserId>,
    pub explicit_users: BTreeSet<UserId>,
    pub team: Option<TeamId>,
}

/// Expands explicit users plus an optional team into the full owner set.
///
/// The team is expanded to its members at this moment; later team changes do
/// not ripple until the next reconciliation. Resolving to nobody is an
/// error, whether because nothing was selected or because the selected team
/// is empty.
pub async fn resolve_targets(
    directory: &dyn OrgDirectory,
    users: &[UserId],
    team: Option<TeamId>,
) -> Result<TargetResolution, DomainError> {
    let explicit_users: BTreeSet<UserId> = users.iter().cloned().collect();
    let mut targets = explicit_users.clone();

    if let Some(team_id) = team {
        // Fails with TeamNotFound for a dangling reference.
        directory.team(team_id).await?;
        targets.extend(directory.members_of(team_id).await?);
    }

    if targets.is_empty() {
        return Err(DomainError::new(
            ErrorCode::EmptyAssignmentTarget,
            "A work cycle must be assigned to at least one user or team",
        ));
    }

    Ok(TargetResolution {
        targets,
        explicit_users,
        team,
    })
}
