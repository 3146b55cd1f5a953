//! The attendance engine: turns scans into record mutations.
//!
//! # Flow of `record_scan`
//!
//! 1. Resolve the anchor date (night shifts may belong to yesterday).
//! 2. Load the record for (employee, anchor date, shift).
//! 3. Reject scans inside the cooldown window.
//! 4. Resolve the slot; refuse if the work-day is complete.
//! 5. Classify arrivals and set or upgrade the status.
//! 6. Write the slot, creating the record on the first scan.
//! 7. On the closing slot, compute worked hours.
//!
//! Steps 2-7 run against a snapshot. Writes are conditional, so a scan that
//! raced another one sees [`WriteResult::Conflict`] and is decided again from a
//! fresh read, once.

use chrono::{NaiveDate, SubsecRound};
use serde::Serialize;
use thiserror::Error;

use crate::anchor;
use crate::classify::{self, Punctuality};
use crate::cooldown;
use crate::hours;
use crate::record::{AttendanceRecord, RecordPatch, Timestamp, WriteResult};
use crate::schedule::ScheduleConfig;
use crate::shift::{AttendanceStatus, NextSlot, ShiftType, Slot};
use crate::slot::{self, SlotResolution};
use crate::store::AttendanceStore;
use crate::types::{EmployeeId, ValidationError, WorkHours};

/// Attempts per scan: the first try plus one retry after a write conflict.
const MAX_ATTEMPTS: usize = 2;

/// Scan instants are kept to millisecond precision, as stored.
const TIMESTAMP_DIGITS: u16 = 3;

/// Engine errors.
///
/// Cooldown, already-complete and unknown-employee scans are not errors; see
/// [`ScanOutcome`].
#[derive(Debug, Error)]
pub enum EngineError<E>
where
    E: std::error::Error + 'static,
{
    /// Caller supplied malformed input.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Unknown employee on a read-only query.
    #[error("employee not found: {0}")]
    NotFound(EmployeeId),

    /// Concurrent scans kept racing for the same work-day.
    #[error("concurrent scans for {employee_id} on {date} ({shift}); try again")]
    Conflict {
        employee_id: EmployeeId,
        date: NaiveDate,
        shift: ShiftType,
    },

    /// The store failed.
    #[error("store error: {0}")]
    Store(#[source] E),
}

/// A badge or QR scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanEvent {
    pub employee_id: EmployeeId,
    pub shift: ShiftType,
    /// Server-observed instant of the scan.
    pub occurred_at: Timestamp,
}

impl ScanEvent {
    pub const fn new(employee_id: EmployeeId, shift: ShiftType, occurred_at: Timestamp) -> Self {
        Self {
            employee_id,
            shift,
            occurred_at,
        }
    }

    /// Builds an event from raw caller input.
    pub fn parse(
        employee_id: &str,
        shift: &str,
        occurred_at: Timestamp,
    ) -> Result<Self, ValidationError> {
        Ok(Self::new(
            EmployeeId::new(employee_id)?,
            shift.parse()?,
            occurred_at,
        ))
    }
}

/// Result of a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ScanOutcome {
    /// The scan filled a slot.
    Recorded {
        record: AttendanceRecord,
        slot: Slot,
        status: AttendanceStatus,
        #[serde(rename = "nextSlot")]
        next: NextSlot,
        #[serde(skip_serializing_if = "Option::is_none")]
        work_hours: Option<WorkHours>,
        /// Set for arrival slots.
        #[serde(skip_serializing_if = "Option::is_none")]
        minutes_late: Option<i64>,
    },
    /// Every slot of the work-day is already filled; nothing changed.
    AlreadyComplete { record: Option<AttendanceRecord> },
    /// Too soon after the previous scan; nothing changed.
    Cooldown {
        #[serde(rename = "waitSeconds")]
        wait_secs: u32,
    },
    /// No such employee; nothing changed.
    NotFound { employee_id: EmployeeId },
}

impl ScanOutcome {
    /// Whether the scan changed a record.
    pub const fn is_recorded(&self) -> bool {
        matches!(self, Self::Recorded { .. })
    }

    /// Friendly message addressed to `name`.
    pub fn message(&self, name: &str) -> String {
        match self {
            Self::Recorded { record, slot, .. } => {
                let time = record
                    .slot(*slot)
                    .map(|at| at.format("%H:%M:%S").to_string())
                    .unwrap_or_default();
                let label = slot.label();
                match slot {
                    Slot::AmIn => format!("Good morning, {name}! {label} recorded at {time}."),
                    Slot::AmOut => format!("See you later, {name}! {label} recorded at {time}."),
                    Slot::PmIn => format!("Welcome back, {name}! {label} recorded at {time}."),
                    Slot::PmOut => format!(
                        "Goodbye, {name}! {label} recorded at {time}. Have a great evening!"
                    ),
                    Slot::NightIn => format!("Good evening, {name}! {label} recorded at {time}."),
                    Slot::NightOut => {
                        format!("Thanks for tonight, {name}! {label} recorded at {time}.")
                    }
                }
            }
            Self::AlreadyComplete { .. } => {
                format!("{name} has already completed all attendance for today.")
            }
            Self::Cooldown { wait_secs } => {
                format!("Please wait {wait_secs} seconds before scanning again.")
            }
            Self::NotFound { employee_id } => format!("Employee not found: {employee_id}"),
        }
    }
}

/// Progress of one work-day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkDayState {
    NotStarted,
    InProgress,
    Complete,
}

/// Read-only view of an employee's current work-day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub employee_id: EmployeeId,
    pub shift: ShiftType,
    /// Anchor date the next scan would be filed under.
    pub date: NaiveDate,
    pub record: Option<AttendanceRecord>,
    pub next: NextSlot,
}

impl StatusReport {
    pub fn state(&self) -> WorkDayState {
        match (&self.record, self.next) {
            (_, NextSlot::Complete) => WorkDayState::Complete,
            (Some(record), _) if record.filled_count() > 0 => WorkDayState::InProgress,
            _ => WorkDayState::NotStarted,
        }
    }
}

enum Attempt {
    Done(ScanOutcome),
    Conflict { date: NaiveDate },
}

/// Orchestrates scans against a store.
///
/// The engine holds its store exclusively, so calls through one engine never
/// interleave. Separate processes sharing a database are kept apart by the
/// store's conditional writes.
#[derive(Debug)]
pub struct AttendanceEngine<S> {
    store: S,
}

impl<S: AttendanceStore> AttendanceEngine<S> {
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    pub const fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Records a scan.
    pub fn record_scan(&mut self, event: &ScanEvent) -> Result<ScanOutcome, EngineError<S::Error>> {
        if !self
            .store
            .employee_exists(&event.employee_id)
            .map_err(EngineError::Store)?
        {
            tracing::debug!(employee_id = %event.employee_id, "scan for unknown employee");
            return Ok(ScanOutcome::NotFound {
                employee_id: event.employee_id.clone(),
            });
        }

        // Read once per call so a concurrent settings change cannot split a decision.
        let config = self.store.schedule_config().map_err(EngineError::Store)?;

        let mut conflict_date = None;
        for attempt in 1..=MAX_ATTEMPTS {
            match self.attempt(event, &config).map_err(EngineError::Store)? {
                Attempt::Done(outcome) => return Ok(outcome),
                Attempt::Conflict { date } => {
                    tracing::warn!(
                        employee_id = %event.employee_id,
                        %date,
                        shift = %event.shift,
                        attempt,
                        "scan lost a write race"
                    );
                    conflict_date = Some(date);
                }
            }
        }

        Err(EngineError::Conflict {
            employee_id: event.employee_id.clone(),
            date: conflict_date.unwrap_or_else(|| event.occurred_at.date_naive()),
            shift: event.shift,
        })
    }

    /// Reports the current work-day of an employee without changing anything.
    pub fn today_status(
        &self,
        employee_id: &EmployeeId,
        shift: ShiftType,
        now: Timestamp,
    ) -> Result<StatusReport, EngineError<S::Error>> {
        if !self
            .store
            .employee_exists(employee_id)
            .map_err(EngineError::Store)?
        {
            return Err(EngineError::NotFound(employee_id.clone()));
        }
        let config = self.store.schedule_config().map_err(EngineError::Store)?;
        let (date, record) = self
            .locate(employee_id, shift, now)
            .map_err(EngineError::Store)?;
        let next = slot::resolve(shift, record.as_ref(), now, &config).next_slot();

        Ok(StatusReport {
            employee_id: employee_id.clone(),
            shift,
            date,
            record,
            next,
        })
    }

    /// Finds the anchor date and the record filed under it.
    fn locate(
        &self,
        employee_id: &EmployeeId,
        shift: ShiftType,
        now: Timestamp,
    ) -> Result<(NaiveDate, Option<AttendanceRecord>), S::Error> {
        let unclosed = match anchor::previous_night_lookup(shift, now) {
            Some(previous) => self.store.find_unclosed_night_record(employee_id, previous)?,
            None => None,
        };
        let date = anchor::resolve(shift, now, unclosed.is_some());
        let record = match unclosed {
            Some(record) => Some(record),
            None => self.store.find_record(employee_id, date, shift)?,
        };
        Ok((date, record))
    }

    fn attempt(&mut self, event: &ScanEvent, config: &ScheduleConfig) -> Result<Attempt, S::Error> {
        let now = event.occurred_at.trunc_subsecs(TIMESTAMP_DIGITS);
        let shift = event.shift;
        let (date, existing) = self.locate(&event.employee_id, shift, now)?;

        let guard = cooldown::check(
            existing.as_ref().and_then(AttendanceRecord::last_scan),
            now,
            config.scan_cooldown_secs,
        );
        if !guard.allowed {
            tracing::debug!(
                employee_id = %event.employee_id,
                wait_secs = guard.wait_secs,
                "scan rejected by cooldown"
            );
            return Ok(Attempt::Done(ScanOutcome::Cooldown {
                wait_secs: guard.wait_secs,
            }));
        }

        let (slot, forced_status) = match slot::resolve(shift, existing.as_ref(), now, config) {
            SlotResolution::Fill {
                slot,
                forced_status,
                ..
            } => (slot, forced_status),
            SlotResolution::Terminal => {
                tracing::debug!(employee_id = %event.employee_id, %date, "work-day already complete");
                return Ok(Attempt::Done(ScanOutcome::AlreadyComplete { record: existing }));
            }
        };

        let punctuality = slot.is_arrival().then(|| {
            classify::classify_session(
                now,
                &config.session(slot.session()),
                config.half_day_threshold,
            )
        });
        let current_status = existing.as_ref().map(|record| record.status);
        let new_status = decide_status(slot, current_status, forced_status, punctuality);

        let work_hours = existing
            .as_ref()
            .filter(|_| slot == shift.closing_slot())
            .map(|record| hours::compute(record, now));

        let patch = RecordPatch {
            slot,
            at: now,
            last_filled: existing.as_ref().and_then(AttendanceRecord::last_filled),
            status: new_status,
            work_hours,
        };

        let record = match existing {
            None => {
                let mut record = AttendanceRecord::new(
                    event.employee_id.clone(),
                    date,
                    shift,
                    new_status.unwrap_or(AttendanceStatus::Present),
                );
                record.apply(&patch);
                if self.store.create_record(&record)? == WriteResult::Conflict {
                    return Ok(Attempt::Conflict { date });
                }
                record
            }
            Some(mut record) => {
                if self.store.update_record(&record.id, &patch)? == WriteResult::Conflict {
                    return Ok(Attempt::Conflict { date });
                }
                record.apply(&patch);
                record
            }
        };

        tracing::info!(
            employee_id = %record.employee_id,
            %date,
            %shift,
            %slot,
            status = %record.status,
            "scan recorded"
        );

        Ok(Attempt::Done(ScanOutcome::Recorded {
            status: record.status,
            slot,
            next: slot.next(),
            work_hours,
            minutes_late: punctuality.map(|p| p.minutes_late),
            record,
        }))
    }
}

/// Status written by a scan filling `slot`, or `None` to leave it alone.
///
/// - A policy-forced status (missed morning) always wins.
/// - The opening arrival of a work-day sets the status from punctuality; an
///   `ABSENT` placeholder is upgraded the same way.
/// - A PM arrival is only judged when the morning was `PRESENT`, and can only
///   turn it into `LATE`.
fn decide_status(
    slot: Slot,
    current: Option<AttendanceStatus>,
    forced: Option<AttendanceStatus>,
    punctuality: Option<Punctuality>,
) -> Option<AttendanceStatus> {
    if forced.is_some() {
        return forced;
    }
    let punctuality = punctuality?;
    match slot {
        Slot::AmIn | Slot::NightIn => match current {
            None | Some(AttendanceStatus::Absent) => Some(status_for(punctuality)),
            Some(_) => None,
        },
        Slot::PmIn => match current {
            Some(AttendanceStatus::Present) if !punctuality.on_time => {
                Some(AttendanceStatus::Late)
            }
            _ => None,
        },
        Slot::AmOut | Slot::PmOut | Slot::NightOut => None,
    }
}

const fn status_for(punctuality: Punctuality) -> AttendanceStatus {
    if punctuality.on_time {
        AttendanceStatus::Present
    } else if punctuality.half_day {
        AttendanceStatus::HalfDay
    } else {
        AttendanceStatus::Late
    }
}
