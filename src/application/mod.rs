//! Application layer - command handlers, notification services, queries.

pub mod handlers;
pub mod notify;
pub mod queries;
