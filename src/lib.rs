//! Worktrack - Work-Cycle Reconciliation & Notification Engine
//!
//! Tracks recurring work cycles assigned to users or organizational teams,
//! the work items each assignee must complete, their review lifecycle, and
//! the notifications that keep participants informed.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
