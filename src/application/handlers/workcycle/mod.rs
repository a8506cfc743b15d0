//! Work cycle commands: create, reassign, edit, archive toggle, delete.

mod create_cycle;
mod delete_cycle;
mod edit_cycle;
mod reassign_cycle;
mod targets;
mod toggle_archive;

pub use create_cycle::{CreateCycleCommand, CreateCycleHandler, CreateCycleResult};
pub use delete_cycle::{DeleteCycleCommand, DeleteCycleHandler, DeleteCycleResult};
pub use edit_cycle::{EditCycleCommand, EditCycleHandler, EditCycleResult};
pub use reassign_cycle::{ReassignCycleCommand, ReassignCycleHandler, ReassignCycleResult};
pub use targets::{resolve_targets, TargetResolution};
pub use toggle_archive::{ToggleArchiveCommand, ToggleArchiveHandler, ToggleArchiveResult};
