//! WorkItem aggregate - the unit of work for one (cycle, owner) pair.
//!
//! Audit timestamps (`submitted_at`, `reviewed_at`, `inactive_at`) are a
//! deterministic function of field transitions. Mutation methods change the
//! intent fields only; [`WorkItem::apply_audit_rules`] diffs against the
//! previously persisted item before every save and stamps or clears the
//! timestamps accordingly.

use crate::domain::foundation::{DomainError, ErrorCode, Timestamp, UserId, WorkCycleId, WorkItemId};

use super::{InactiveReason, ItemStatus, ReviewDecision};

/// Derived classification of a submission against its cycle's due instant.
///
/// Never stored; recomputed from `submitted_at` and `due_at`. Submission at
/// the exact due instant counts as on time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionTiming {
    OnTime,
    Late,
}

/// The unit of work one owner must complete for one work cycle.
///
/// Unique per (cycle, owner) pair. Archived on removal from the cycle, never
/// hard-deleted.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkItem {
    id: WorkItemId,
    cycle_id: WorkCycleId,
    owner: UserId,
    status: ItemStatus,
    review_decision: ReviewDecision,
    is_active: bool,
    inactive_reason: Option<InactiveReason>,
    inactive_note: String,
    inactive_at: Option<Timestamp>,
    inactive_by: Option<UserId>,
    submitted_at: Option<Timestamp>,
    reviewed_at: Option<Timestamp>,
    created_at: Timestamp,
}

impl WorkItem {
    /// Creates a fresh active item in its default state.
    pub fn new(cycle_id: WorkCycleId, owner: UserId, now: Timestamp) -> Self {
        Self {
            id: WorkItemId::new(),
            cycle_id,
            owner,
            status: ItemStatus::NotStarted,
            review_decision: ReviewDecision::Pending,
            is_active: true,
            inactive_reason: None,
            inactive_note: String::new(),
            inactive_at: None,
            inactive_by: None,
            submitted_at: None,
            reviewed_at: None,
            created_at: now,
        }
    }

    /// Reconstitutes an item from persisted data.
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: WorkItemId,
        cycle_id: WorkCycleId,
        owner: UserId,
        status: ItemStatus,
        review_decision: ReviewDecision,
        is_active: bool,
        inactive_reason: Option<InactiveReason>,
        inactive_note: String,
        inactive_at: Option<Timestamp>,
        inactive_by: Option<UserId>,
        submitted_at: Option<Timestamp>,
        reviewed_at: Option<Timestamp>,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            cycle_id,
            owner,
            status,
            review_decision,
            is_active,
            inactive_reason,
            inactive_note,
            inactive_at,
            inactive_by,
            submitted_at,
            reviewed_at,
            created_at,
        }
    }

    // ───────────────────────────────────────────────────────────────
    // Accessors
    // ───────────────────────────────────────────────────────────────

    pub fn id(&self) -> WorkItemId {
        self.id
    }

    pub fn cycle_id(&self) -> WorkCycleId {
        self.cycle_id
    }

    pub fn owner(&self) -> &UserId {
        &self.owner
    }

    pub fn status(&self) -> ItemStatus {
        self.status
    }

    pub fn review_decision(&self) -> ReviewDecision {
        self.review_decision
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn inactive_reason(&self) -> Option<InactiveReason> {
        self.inactive_reason
    }

    pub fn inactive_note(&self) -> &str {
        &self.inactive_note
    }

    pub fn inactive_at(&self) -> Option<Timestamp> {
        self.inactive_at
    }

    pub fn inactive_by(&self) -> Option<&UserId> {
        self.inactive_by.as_ref()
    }

    pub fn submitted_at(&self) -> Option<Timestamp> {
        self.submitted_at
    }

    pub fn reviewed_at(&self) -> Option<Timestamp> {
        self.reviewed_at
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    // ───────────────────────────────────────────────────────────────
    // Mutations
    // ───────────────────────────────────────────────────────────────

    /// Ordinary status toggle by the owner.
    ///
    /// A `done` item is locked: status can only leave `done` through
    /// [`WorkItem::undo_submission`]. Owners may only toggle between
    /// `not_started` and `working_on_it` here.
    pub fn set_status(&mut self, new_status: ItemStatus) -> Result<(), DomainError> {
        self.require_active()?;
        if self.status == ItemStatus::Done {
            return Err(DomainError::new(
                ErrorCode::ItemLocked,
                "Completed work items cannot be modified",
            ));
        }
        if new_status == ItemStatus::Done {
            return Err(DomainError::new(
                ErrorCode::InvalidStatusTransition,
                "Use the submit action to complete a work item",
            ));
        }
        self.status = new_status;
        Ok(())
    }

    /// Submits the item: marks it done and resets review to pending.
    pub fn submit(&mut self) -> Result<(), DomainError> {
        self.require_active()?;
        if self.status == ItemStatus::Done {
            return Err(DomainError::new(
                ErrorCode::AlreadySubmitted,
                "This work item has already been submitted",
            ));
        }
        self.status = ItemStatus::Done;
        self.review_decision = ReviewDecision::Pending;
        Ok(())
    }

    /// Reverts a submission, permitted only while review is still pending.
    pub fn undo_submission(&mut self) -> Result<(), DomainError> {
        self.require_active()?;
        if self.status != ItemStatus::Done {
            return Err(DomainError::new(
                ErrorCode::UndoNotAllowed,
                "Only a submitted work item can be reverted",
            ));
        }
        if self.review_decision != ReviewDecision::Pending {
            return Err(DomainError::new(
                ErrorCode::UndoNotAllowed,
                "A reviewed work item can no longer be reverted",
            ));
        }
        self.status = ItemStatus::WorkingOnIt;
        Ok(())
    }

    /// Records a review decision on a submitted item.
    pub fn review(&mut self, decision: ReviewDecision) -> Result<(), DomainError> {
        if self.status != ItemStatus::Done {
            return Err(DomainError::new(
                ErrorCode::InvalidStatusTransition,
                "Only submitted work items can be reviewed",
            ));
        }
        self.review_decision = decision;
        Ok(())
    }

    /// Deactivates the item, recording why and by whom.
    pub fn deactivate(
        &mut self,
        reason: InactiveReason,
        note: impl Into<String>,
        by: Option<UserId>,
    ) {
        self.is_active = false;
        self.inactive_reason = Some(reason);
        self.inactive_note = note.into();
        self.inactive_by = by;
    }

    /// Reactivates an archived item, resetting it to a fresh state.
    ///
    /// Archival fields are cleared by the audit rules on save.
    pub fn reactivate(&mut self) {
        self.is_active = true;
        self.status = ItemStatus::NotStarted;
        self.review_decision = ReviewDecision::Pending;
    }

    fn require_active(&self) -> Result<(), DomainError> {
        if !self.is_active {
            return Err(DomainError::new(
                ErrorCode::ItemInactive,
                "This work item is no longer active",
            ));
        }
        Ok(())
    }

    // ───────────────────────────────────────────────────────────────
    // Save-time audit rules
    // ───────────────────────────────────────────────────────────────

    /// Applies the audit timestamp rules before persisting.
    ///
    /// `stored` must be the previously persisted item, not the in-memory
    /// proposal; the rules fire on actual transitions only.
    pub fn apply_audit_rules(&mut self, stored: &WorkItem, now: Timestamp) {
        // Submission timestamp follows the done flag.
        if self.status == ItemStatus::Done {
            if self.submitted_at.is_none() {
                self.submitted_at = Some(now);
            }
        } else {
            self.submitted_at = None;
        }

        // Review timestamp stamps on a real decision change, clears on revert.
        match self.review_decision {
            ReviewDecision::Approved | ReviewDecision::Revision => {
                if self.review_decision != stored.review_decision {
                    self.reviewed_at = Some(now);
                }
            }
            ReviewDecision::Pending => {
                self.reviewed_at = None;
            }
        }

        // Archival timestamp follows the active flag.
        if !self.is_active {
            if self.inactive_at.is_none() {
                self.inactive_at = Some(now);
            }
        } else {
            self.inactive_at = None;
            self.inactive_reason = None;
            self.inactive_note.clear();
            self.inactive_by = None;
        }
    }

    // ───────────────────────────────────────────────────────────────
    // Derived facts
    // ───────────────────────────────────────────────────────────────

    /// Classifies the submission against the cycle's due instant.
    ///
    /// `None` until the item has been submitted.
    pub fn submission_timing(&self, due_at: Timestamp) -> Option<SubmissionTiming> {
        self.submitted_at.map(|submitted| {
            if submitted <= due_at {
                SubmissionTiming::OnTime
            } else {
                SubmissionTiming::Late
            }
        })
    }
}
