//! Pure derivation of a work cycle's display lifecycle.
//!
//! Lifecycle is never stored. It is recomputed on every read from the admin
//! intent flag, the due instant, and the current time, so stored state can
//! never drift from the truth.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::Timestamp;

/// Days before the due instant at which a cycle counts as due soon.
pub const DUE_SOON_WINDOW_DAYS: i64 = 3;

/// Derived display state of a work cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    Ongoing,
    DueSoon,
    Lapsed,
    Archived,
}

impl LifecycleState {
    /// Returns the storage/query representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleState::Ongoing => "ongoing",
            LifecycleState::DueSoon => "due_soon",
            LifecycleState::Lapsed => "lapsed",
            LifecycleState::Archived => "archived",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            LifecycleState::Ongoing => "Ongoing",
            LifecycleState::DueSoon => "Due Soon",
            LifecycleState::Lapsed => "Lapsed",
            LifecycleState::Archived => "Archived",
        }
    }
}

/// Derives the lifecycle state of a cycle.
///
/// Admin intent always wins: an archived cycle is `Archived` no matter where
/// its due date sits. Exactly `DUE_SOON_WINDOW_DAYS` days before the due
/// instant already counts as `DueSoon`; one second more is `Ongoing`.
pub fn lifecycle(is_active: bool, due_at: Timestamp, now: Timestamp) -> LifecycleState {
    if !is_active {
        return LifecycleState::Archived;
    }
    if now >= due_at {
        return LifecycleState::Lapsed;
    }
    if due_at.duration_since(&now) <= chrono::Duration::days(DUE_SOON_WINDOW_DAYS) {
        return LifecycleState::DueSoon;
    }
    LifecycleState::Ongoing
}
