//! Adapters - concrete implementations of the ports.

pub mod email;
pub mod memory;
pub mod postgres;
pub mod scheduler;
