//! Work item commands: status toggle, submit, undo, review.

mod review_item;
mod submit_item;
mod undo_submission;
mod update_status;

pub use review_item::{ReviewItemCommand, ReviewItemHandler, ReviewItemResult};
pub use submit_item::{SubmitItemCommand, SubmitItemHandler, SubmitItemResult};
pub use undo_submission::{UndoSubmissionCommand, UndoSubmissionHandler, UndoSubmissionResult};
pub use update_status::{UpdateStatusCommand, UpdateStatusHandler, UpdateStatusResult};

use crate::domain::foundation::{DomainError, ErrorCode, WorkCycleId, WorkItemId};
use crate::domain::workcycle::WorkCycle;
use crate::domain::workitem::WorkItem;
use crate::ports::{WorkCycleRepository, WorkItemRepository};

pub(crate) async fn load_item(
    items: &dyn WorkItemRepository,
    id: WorkItemId,
) -> Result<WorkItem, DomainError> {
    items.find_by_id(id).await?.ok_or_else(|| {
        DomainError::new(ErrorCode::ItemNotFound, format!("No work item with id {id}"))
    })
}

pub(crate) async fn load_cycle(
    cycles: &dyn WorkCycleRepository,
    id: WorkCycleId,
) -> Result<WorkCycle, DomainError> {
    cycles.find_by_id(id).await?.ok_or_else(|| {
        DomainError::new(ErrorCode::CycleNotFound, format!("No work cycle with id {id}"))
    })
}
