//! Attendance tracker CLI library.
//!
//! This crate provides the CLI interface for the attendance engine.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands, EmployeesAction, RangeArgs, ScheduleArgs, SettingsAction};
pub use config::Config;
