//! WorkCycle aggregate - a recurring reporting period.

use crate::domain::foundation::{Timestamp, UserId, ValidationError, WorkCycleId};

use super::{lifecycle, LifecycleState};

/// A reporting period to which users or teams are assigned.
///
/// Carries no stored lifecycle field; display state is always derived from
/// `is_active`, `due_at`, and the current time.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkCycle {
    id: WorkCycleId,
    title: String,
    description: String,
    due_at: Timestamp,
    is_active: bool,
    /// Nullable: the creator account may have been deleted.
    created_by: Option<UserId>,
    created_at: Timestamp,
}

impl WorkCycle {
    /// Creates a new active work cycle.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        due_at: Timestamp,
        created_by: UserId,
        now: Timestamp,
    ) -> Result<Self, ValidationError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(ValidationError::empty_field("title"));
        }

        Ok(Self {
            id: WorkCycleId::new(),
            title,
            description: description.into(),
            due_at,
            is_active: true,
            created_by: Some(created_by),
            created_at: now,
        })
    }

    /// Reconstitutes a cycle from persisted data.
    pub fn reconstitute(
        id: WorkCycleId,
        title: String,
        description: String,
        due_at: Timestamp,
        is_active: bool,
        created_by: Option<UserId>,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            title,
            description,
            due_at,
            is_active,
            created_by,
            created_at,
        }
    }

    pub fn id(&self) -> WorkCycleId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn due_at(&self) -> Timestamp {
        self.due_at
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn created_by(&self) -> Option<&UserId> {
        self.created_by.as_ref()
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Derived lifecycle state at the given instant.
    pub fn lifecycle(&self, now: Timestamp) -> LifecycleState {
        lifecycle(self.is_active, self.due_at, now)
    }

    /// Edits title, description, and due instant.
    ///
    /// Returns the previous due instant so callers can detect a change.
    pub fn edit(
        &mut self,
        title: impl Into<String>,
        description: impl Into<String>,
        due_at: Timestamp,
    ) -> Result<Timestamp, ValidationError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(ValidationError::empty_field("title"));
        }
        let old_due = self.due_at;
        self.title = title;
        self.description = description.into();
        self.due_at = due_at;
        Ok(old_due)
    }

    /// Flips the archive flag. Returns `true` when the cycle is now active.
    pub fn toggle_archive(&mut self) -> bool {
        self.is_active = !self.is_active;
        self.is_active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creator() -> UserId {
        UserId::new("admin-1").unwrap()
    }

    fn cycle() -> WorkCycle {
        let now = Timestamp::now();
        WorkCycle::new("Q3 report", "Quarterly report", now.plus_days(10), creator(), now)
            .unwrap()
    }

    #[test]
    fn new_cycle_starts_active() {
        let wc = cycle();
        assert!(wc.is_active());
        assert_eq!(wc.created_by().map(|u| u.as_str()), Some("admin-1"));
    }

    #[test]
    fn blank_title_is_rejected() {
        let now = Timestamp::now();
        assert!(WorkCycle::new(" ", "", now, creator(), now).is_err());
    }

    #[test]
    fn edit_returns_previous_due_instant() {
        let mut wc = cycle();
        let old_due = wc.due_at();
        let new_due = old_due.plus_days(5);
        let returned = wc.edit("Q3 report (revised)", "Updated", new_due).unwrap();
        assert_eq!(returned, old_due);
        assert_eq!(wc.due_at(), new_due);
        assert_eq!(wc.title(), "Q3 report (revised)");
    }

    #[test]
    fn toggle_archive_flips_the_flag() {
        let mut wc = cycle();
        assert!(!wc.toggle_archive());
        assert!(!wc.is_active());
        assert!(wc.toggle_archive());
        assert!(wc.is_active());
    }

    #[test]
    fn lifecycle_derives_from_flag_and_due_date() {
        let mut wc = cycle();
        let now = Timestamp::now();
        assert_eq!(wc.lifecycle(now), LifecycleState::Ongoing);
        wc.toggle_archive();
        assert_eq!(wc.lifecycle(now), LifecycleState::Archived);
    }
}
