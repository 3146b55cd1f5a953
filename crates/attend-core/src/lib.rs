//! Core domain logic for attendance tracking.
//!
//! This crate contains the fundamental types and logic for:
//! - Scans: deciding which in/out slot a scan fills and the resulting status
//! - Punctuality: grace periods, lateness and half-day classification
//! - Work-days: anchor dates for night shifts and worked-hours calculation
//! - Reporting: attendance summaries over record sets
//!
//! Storage is abstracted behind [`AttendanceStore`]; see `attend-db` for the
//! `SQLite` implementation.

pub mod anchor;
pub mod classify;
pub mod cooldown;
mod engine;
pub mod hours;
mod record;
pub mod schedule;
mod shift;
pub mod slot;
mod stats;
mod store;
pub mod types;

pub use engine::{
    AttendanceEngine, EngineError, ScanEvent, ScanOutcome, StatusReport, WorkDayState,
};
pub use record::{AttendanceRecord, Employee, RecordPatch, Timestamp, WriteResult};
pub use schedule::{ScheduleConfig, Session};
pub use shift::{AttendanceStatus, NextSlot, SessionKind, ShiftType, Slot};
pub use stats::{AttendanceStats, summarize};
pub use store::{AttendanceStore, MemoryStore};
pub use types::{ClockTime, EmployeeId, RecordId, ValidationError, WorkHours};
