//! Cycle membership: assignment records and the reconciliation plan.

mod plan;
mod work_assignment;

pub use plan::ReconciliationPlan;
pub use work_assignment::WorkAssignment;
