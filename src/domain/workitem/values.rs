//! Closed value enums for the work item state machine.
//!
//! The original system branched on status strings; these enums make every
//! branch exhaustively checked.

use serde::{Deserialize, Serialize};

/// Completion status of a work item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    NotStarted,
    WorkingOnIt,
    Done,
}

impl ItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::NotStarted => "not_started",
            ItemStatus::WorkingOnIt => "working_on_it",
            ItemStatus::Done => "done",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "not_started" => Some(ItemStatus::NotStarted),
            "working_on_it" => Some(ItemStatus::WorkingOnIt),
            "done" => Some(ItemStatus::Done),
            _ => None,
        }
    }

    /// Human-readable label used in notification copy.
    pub fn label(&self) -> &'static str {
        match self {
            ItemStatus::NotStarted => "Not Started",
            ItemStatus::WorkingOnIt => "Working On It",
            ItemStatus::Done => "Done",
        }
    }
}

/// Review decision of a submitted work item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDecision {
    Pending,
    Approved,
    Revision,
}

impl ReviewDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewDecision::Pending => "pending",
            ReviewDecision::Approved => "approved",
            ReviewDecision::Revision => "revision",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(ReviewDecision::Pending),
            "approved" => Some(ReviewDecision::Approved),
            "revision" => Some(ReviewDecision::Revision),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ReviewDecision::Pending => "Pending",
            ReviewDecision::Approved => "Approved",
            ReviewDecision::Revision => "Needs Revision",
        }
    }
}

/// Why a work item was deactivated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InactiveReason {
    Reassigned,
    Duplicate,
    Invalid,
    Superseded,
    Archived,
}

impl InactiveReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            InactiveReason::Reassigned => "reassigned",
            InactiveReason::Duplicate => "duplicate",
            InactiveReason::Invalid => "invalid",
            InactiveReason::Superseded => "superseded",
            InactiveReason::Archived => "archived",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "reassigned" => Some(InactiveReason::Reassigned),
            "duplicate" => Some(InactiveReason::Duplicate),
            "invalid" => Some(InactiveReason::Invalid),
            "superseded" => Some(InactiveReason::Superseded),
            "archived" => Some(InactiveReason::Archived),
            _ => None,
        }
    }
}
