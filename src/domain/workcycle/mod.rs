//! Work cycle aggregate and its derived lifecycle.

mod aggregate;
mod lifecycle;

pub use aggregate::WorkCycle;
pub use lifecycle::{lifecycle, LifecycleState, DUE_SOON_WINDOW_DAYS};
