//! Command-line argument definitions.

use std::path::PathBuf;

use attend_core::{ClockTime, ShiftType};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

/// Employee attendance tracker.
///
/// Records badge or QR scans into AM/PM or night in/out slots, classifies
/// punctuality against the configured schedule and reports worked hours.
#[derive(Debug, Parser)]
#[command(name = "attend", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Record a scan for an employee.
    Scan {
        /// Employee ID as printed on the badge.
        employee: String,

        /// Shift type (day or night). Defaults to the configured shift.
        #[arg(long)]
        shift: Option<ShiftType>,

        /// Scan time: RFC 3339 or relative ("10 minutes ago"). Defaults to now.
        #[arg(long)]
        at: Option<String>,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show an employee's current work-day.
    Status {
        employee: String,

        #[arg(long)]
        shift: Option<ShiftType>,

        /// Evaluate as of this time instead of now.
        #[arg(long)]
        at: Option<String>,

        #[arg(long)]
        json: bool,
    },

    /// Manage employees.
    #[command(subcommand)]
    Employees(EmployeesAction),

    /// Show or change the schedule.
    #[command(subcommand)]
    Settings(SettingsAction),

    /// List attendance records.
    Records {
        #[command(flatten)]
        range: RangeArgs,

        #[arg(long)]
        shift: Option<ShiftType>,

        #[arg(long)]
        json: bool,
    },

    /// Summarize attendance over a period.
    Report {
        #[command(flatten)]
        range: RangeArgs,

        #[arg(long)]
        json: bool,
    },
}

/// Employee management actions.
#[derive(Debug, Subcommand)]
pub enum EmployeesAction {
    /// Register an employee.
    Add {
        id: String,

        #[arg(long)]
        name: String,

        #[arg(long)]
        department: Option<String>,

        #[arg(long)]
        position: Option<String>,
    },

    /// List registered employees.
    List {
        #[arg(long)]
        json: bool,
    },
}

/// Schedule settings actions.
#[derive(Debug, Subcommand)]
pub enum SettingsAction {
    /// Print the current schedule.
    Show {
        #[arg(long)]
        json: bool,
    },

    /// Change schedule values; omitted values are kept.
    Set(ScheduleArgs),
}

/// Schedule fields, all optional.
#[derive(Debug, Args)]
pub struct ScheduleArgs {
    /// AM session start (HH:MM).
    #[arg(long)]
    pub am_start: Option<ClockTime>,
    #[arg(long)]
    pub am_end: Option<ClockTime>,
    #[arg(long)]
    pub pm_start: Option<ClockTime>,
    #[arg(long)]
    pub pm_end: Option<ClockTime>,
    #[arg(long)]
    pub night_start: Option<ClockTime>,
    #[arg(long)]
    pub night_end: Option<ClockTime>,

    /// Grace period in minutes.
    #[arg(long)]
    pub am_grace: Option<u32>,
    #[arg(long)]
    pub pm_grace: Option<u32>,
    #[arg(long)]
    pub night_grace: Option<u32>,

    /// Minutes late at which an arrival counts as a half-day.
    #[arg(long)]
    pub half_day_threshold: Option<u32>,

    /// Minimum seconds between two scans.
    #[arg(long)]
    pub scan_cooldown: Option<u32>,
}

/// Employee and date-range filter shared by listing commands.
#[derive(Debug, Args)]
pub struct RangeArgs {
    /// Only this employee.
    #[arg(long)]
    pub employee: Option<String>,

    /// First anchor date, inclusive (YYYY-MM-DD).
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Last anchor date, inclusive (YYYY-MM-DD).
    #[arg(long)]
    pub to: Option<NaiveDate>,
}
