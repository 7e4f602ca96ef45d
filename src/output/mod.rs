//! Output module for administrative reports
//!
//! This module handles:
//! - Loading per-server fleet statistics from the task log
//! - Printing statistics and the task log for operators

pub mod stats;

pub use stats::{load_fleet_statistics, print_fleet_statistics, print_task_log, FleetStatistics};
