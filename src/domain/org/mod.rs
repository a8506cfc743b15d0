//! Organizational directory types.
//!
//! A strict four-level team hierarchy (division → section → service → unit)
//! plus the one-to-one assignment linking a user to a path through it. This
//! core only reads membership facts; the directory itself is maintained
//! elsewhere.

mod assignment;
mod team;

pub use assignment::OrgAssignment;
pub use team::{Team, TeamKind};

use serde::{Deserialize, Serialize};

/// Permission role of an acting user, captured from the identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Manager,
    User,
}

impl Role {
    /// Returns the storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::User => "user",
        }
    }

    /// Parses a stored role string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Role::Admin),
            "manager" => Some(Role::Manager),
            "user" => Some(Role::User),
            _ => None,
        }
    }

    /// Whether this role may review submissions and manage cycles.
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Admin | Role::Manager)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_storage_form() {
        for role in [Role::Admin, Role::Manager, Role::User] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("root"), None);
    }

    #[test]
    fn only_admin_and_manager_are_staff() {
        assert!(Role::Admin.is_staff());
        assert!(Role::Manager.is_staff());
        assert!(!Role::User.is_staff());
    }
}
