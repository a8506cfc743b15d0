//! Domain layer - entities, value objects, and pure business rules.

pub mod assignment;
pub mod discussion;
pub mod foundation;
pub mod notification;
pub mod org;
pub mod workcycle;
pub mod workitem;
