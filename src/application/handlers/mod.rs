//! Command handlers. One file per operation, mirroring the ports they drive.

pub mod discussion;
pub mod workcycle;
pub mod workitem;

use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::ports::OrgDirectory;

/// Cycle management and review are staff operations.
pub(crate) async fn require_staff(
    directory: &dyn OrgDirectory,
    user: &UserId,
) -> Result<(), DomainError> {
    let profile = directory.profile(user).await?;
    if !profile.role.is_staff() {
        return Err(DomainError::new(
            ErrorCode::Forbidden,
            "This operation requires a manager or admin role",
        ));
    }
    Ok(())
}
