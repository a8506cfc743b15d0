//! Organizational assignment of a user to a hierarchy path.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DomainError, ErrorCode, TeamId, UserId};

use super::{Team, TeamKind};

/// One-to-one link from a user to a (division, section, service?, unit?) path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrgAssignment {
    user: UserId,
    division: TeamId,
    section: TeamId,
    service: Option<TeamId>,
    unit: Option<TeamId>,
}

impl OrgAssignment {
    /// Creates an assignment, validating that every selected level is of the
    /// right kind and actually parented to the previous selected level.
    ///
    /// The unit must hang off the deepest selected level: the service when one
    /// is chosen, otherwise the section.
    pub fn new(
        user: UserId,
        division: &Team,
        section: &Team,
        service: Option<&Team>,
        unit: Option<&Team>,
    ) -> Result<Self, DomainError> {
        expect_kind(division, TeamKind::Division)?;
        expect_kind(section, TeamKind::Section)?;

        if section.parent_id() != Some(division.id()) {
            return Err(parentage_error(section, division));
        }

        if let Some(service) = service {
            expect_kind(service, TeamKind::Service)?;
            if service.parent_id() != Some(section.id()) {
                return Err(parentage_error(service, section));
            }
        }

        if let Some(unit) = unit {
            expect_kind(unit, TeamKind::Unit)?;
            let deepest = service.unwrap_or(section);
            if unit.parent_id() != Some(deepest.id()) {
                return Err(parentage_error(unit, deepest));
            }
        }

        Ok(Self {
            user,
            division: division.id(),
            section: section.id(),
            service: service.map(Team::id),
            unit: unit.map(Team::id),
        })
    }

    /// Reconstitutes an assignment from persisted data without re-validation.
    pub fn reconstitute(
        user: UserId,
        division: TeamId,
        section: TeamId,
        service: Option<TeamId>,
        unit: Option<TeamId>,
    ) -> Self {
        Self {
            user,
            division,
            section,
            service,
            unit,
        }
    }

    pub fn user(&self) -> &UserId {
        &self.user
    }

    pub fn division(&self) -> TeamId {
        self.division
    }

    pub fn section(&self) -> TeamId {
        self.section
    }

    pub fn service(&self) -> Option<TeamId> {
        self.service
    }

    pub fn unit(&self) -> Option<TeamId> {
        self.unit
    }

    /// Whether this assignment's path touches the given team at any level.
    ///
    /// This is the membership test used when a work cycle is assigned to a
    /// team: assigning to a division reaches everyone underneath it.
    pub fn touches(&self, team: TeamId) -> bool {
        self.division == team
            || self.section == team
            || self.service == Some(team)
            || self.unit == Some(team)
    }
}

fn expect_kind(team: &Team, kind: TeamKind) -> Result<(), DomainError> {
    if team.kind() != kind {
        return Err(DomainError::new(
            ErrorCode::InvalidParentage,
            format!(
                "Expected a {} but '{}' is a {}",
                kind.as_str(),
                team.name(),
                team.kind().as_str()
            ),
        ));
    }
    Ok(())
}

fn parentage_error(child: &Team, expected_parent: &Team) -> DomainError {
    DomainError::new(
        ErrorCode::InvalidParentage,
        format!(
            "'{}' is not parented to '{}'",
            child.name(),
            expected_parent.name()
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::Timestamp;

    struct Org {
        division: Team,
        section: Team,
        service: Team,
        unit_under_service: Team,
        unit_under_section: Team,
    }

    fn org() -> Org {
        let now = Timestamp::now();
        let division = Team::new("Operations", TeamKind::Division, None, now).unwrap();
        let section = Team::new("Field Ops", TeamKind::Section, Some(&division), now).unwrap();
        let service = Team::new("Survey", TeamKind::Service, Some(&section), now).unwrap();
        let unit_under_service = Team::new("North Crew", TeamKind::Unit, Some(&service), now).unwrap();
        let unit_under_section = Team::new("East Crew", TeamKind::Unit, Some(&section), now).unwrap();
        Org {
            division,
            section,
            service,
            unit_under_service,
            unit_under_section,
        }
    }

    fn user() -> UserId {
        UserId::new("user-1").unwrap()
    }

    #[test]
    fn full_path_validates() {
        let o = org();
        let a = OrgAssignment::new(
            user(),
            &o.division,
            &o.section,
            Some(&o.service),
            Some(&o.unit_under_service),
        )
        .unwrap();
        assert_eq!(a.unit(), Some(o.unit_under_service.id()));
    }

    #[test]
    fn unit_may_hang_off_section_when_no_service_selected() {
        let o = org();
        assert!(OrgAssignment::new(
            user(),
            &o.division,
            &o.section,
            None,
            Some(&o.unit_under_section),
        )
        .is_ok());
    }

    #[test]
    fn unit_under_section_is_rejected_when_service_is_selected() {
        let o = org();
        let err = OrgAssignment::new(
            user(),
            &o.division,
            &o.section,
            Some(&o.service),
            Some(&o.unit_under_section),
        )
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidParentage);
    }

    #[test]
    fn section_must_belong_to_division() {
        let o = org();
        let now = Timestamp::now();
        let other_division = Team::new("Planning", TeamKind::Division, None, now).unwrap();
        let err =
            OrgAssignment::new(user(), &other_division, &o.section, None, None).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidParentage);
    }

    #[test]
    fn touches_matches_any_level_of_the_path() {
        let o = org();
        let a = OrgAssignment::new(
            user(),
            &o.division,
            &o.section,
            Some(&o.service),
            Some(&o.unit_under_service),
        )
        .unwrap();

        assert!(a.touches(o.division.id()));
        assert!(a.touches(o.section.id()));
        assert!(a.touches(o.service.id()));
        assert!(a.touches(o.unit_under_service.id()));
        assert!(!a.touches(o.unit_under_section.id()));
    }
}
