//! Team nodes of the organizational hierarchy.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DomainError, ErrorCode, TeamId, Timestamp, ValidationError};

/// Level of a team node in the four-level hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamKind {
    Division,
    Section,
    Service,
    Unit,
}

impl TeamKind {
    /// Kinds a parent node may have. Empty for divisions (roots).
    pub fn allowed_parents(&self) -> &'static [TeamKind] {
        match self {
            TeamKind::Division => &[],
            TeamKind::Section => &[TeamKind::Division],
            TeamKind::Service => &[TeamKind::Section],
            // A unit hangs off its deepest selected ancestor.
            TeamKind::Unit => &[TeamKind::Section, TeamKind::Service],
        }
    }

    /// Returns the storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            TeamKind::Division => "division",
            TeamKind::Section => "section",
            TeamKind::Service => "service",
            TeamKind::Unit => "unit",
        }
    }

    /// Parses a stored kind string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "division" => Some(TeamKind::Division),
            "section" => Some(TeamKind::Section),
            "service" => Some(TeamKind::Service),
            "unit" => Some(TeamKind::Unit),
            _ => None,
        }
    }
}

/// A node in the organizational hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    id: TeamId,
    name: String,
    kind: TeamKind,
    parent_id: Option<TeamId>,
    created_at: Timestamp,
}

impl Team {
    /// Creates a new team node, validating the parentage rule for its kind.
    ///
    /// Divisions must have no parent; every other kind requires a parent of
    /// an allowed kind. Sibling-name uniqueness is a storage concern.
    pub fn new(
        name: impl Into<String>,
        kind: TeamKind,
        parent: Option<&Team>,
        now: Timestamp,
    ) -> Result<Self, DomainError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::empty_field("name").into());
        }

        match (kind, parent) {
            (TeamKind::Division, Some(_)) => {
                return Err(DomainError::new(
                    ErrorCode::InvalidParentage,
                    "A division is a root node and cannot have a parent",
                ));
            }
            (TeamKind::Division, None) => {}
            (_, None) => {
                return Err(DomainError::new(
                    ErrorCode::InvalidParentage,
                    format!("A {} requires a parent team", kind.as_str()),
                ));
            }
            (_, Some(p)) => {
                if !kind.allowed_parents().contains(&p.kind) {
                    return Err(DomainError::new(
                        ErrorCode::InvalidParentage,
                        format!(
                            "A {} cannot be parented to a {}",
                            kind.as_str(),
                            p.kind.as_str()
                        ),
                    ));
                }
            }
        }

        Ok(Self {
            id: TeamId::new(),
            name,
            kind,
            parent_id: parent.map(|p| p.id),
            created_at: now,
        })
    }

    /// Reconstitutes a team from persisted data without re-validation.
    pub fn reconstitute(
        id: TeamId,
        name: String,
        kind: TeamKind,
        parent_id: Option<TeamId>,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            name,
            kind,
            parent_id,
            created_at,
        }
    }

    pub fn id(&self) -> TeamId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> TeamKind {
        self.kind
    }

    pub fn parent_id(&self) -> Option<TeamId> {
        self.parent_id
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> Timestamp {
        Timestamp::now()
    }

    #[test]
    fn division_is_a_root_node() {
        let division = Team::new("Operations", TeamKind::Division, None, now()).unwrap();
        assert_eq!(division.kind(), TeamKind::Division);
        assert!(division.parent_id().is_none());
    }

    #[test]
    fn division_rejects_a_parent() {
        let other = Team::new("Operations", TeamKind::Division, None, now()).unwrap();
        let err = Team::new("Planning", TeamKind::Division, Some(&other), now()).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidParentage);
    }

    #[test]
    fn section_requires_a_division_parent() {
        let err = Team::new("Field Ops", TeamKind::Section, None, now()).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidParentage);

        let division = Team::new("Operations", TeamKind::Division, None, now()).unwrap();
        let section = Team::new("Field Ops", TeamKind::Section, Some(&division), now()).unwrap();
        assert_eq!(section.parent_id(), Some(division.id()));
    }

    #[test]
    fn service_cannot_be_parented_to_a_division() {
        let division = Team::new("Operations", TeamKind::Division, None, now()).unwrap();
        let err = Team::new("Survey", TeamKind::Service, Some(&division), now()).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidParentage);
    }

    #[test]
    fn unit_accepts_section_or_service_parent() {
        let division = Team::new("Operations", TeamKind::Division, None, now()).unwrap();
        let section = Team::new("Field Ops", TeamKind::Section, Some(&division), now()).unwrap();
        let service = Team::new("Survey", TeamKind::Service, Some(&section), now()).unwrap();

        assert!(Team::new("North Crew", TeamKind::Unit, Some(&section), now()).is_ok());
        assert!(Team::new("South Crew", TeamKind::Unit, Some(&service), now()).is_ok());
        assert!(Team::new("Stray Crew", TeamKind::Unit, Some(&division), now()).is_err());
    }

    #[test]
    fn blank_name_is_rejected() {
        let err = Team::new("  ", TeamKind::Division, None, now()).unwrap_err();
        assert_eq!(err.code, ErrorCode::EmptyField);
    }
}
