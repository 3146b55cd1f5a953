//! Slot resolution: which in/out field a scan fills.
//!
//! # Rules
//!
//! - Slots fill in sequence order (`am_in, am_out, pm_in, pm_out` or
//!   `night_in, night_out`). A slot skipped earlier stays empty; the next scan
//!   always lands after the last filled slot.
//! - Missed morning: a day-shift scan with no AM activity at or after
//!   `pm_start - 90 min` fills `pm_in` and forces `HALF_DAY`.
//! - Lunch without an out scan: `am_in` set, `am_out`/`pm_in` empty, scan at or
//!   after `pm_start` fills `pm_in` directly.
//! - Once the closing slot is filled the work-day is terminal.

use chrono::Duration;

use crate::record::{AttendanceRecord, Timestamp};
use crate::schedule::ScheduleConfig;
use crate::shift::{AttendanceStatus, NextSlot, ShiftType, Slot};

/// How early before `pm_start` an arrival with no morning activity counts as PM.
pub const PM_EARLY_ARRIVAL_WINDOW_MINUTES: i64 = 90;

/// Outcome of slot resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotResolution {
    /// The scan fills `slot`.
    Fill {
        slot: Slot,
        /// No slot of this work-day has been filled yet.
        first_of_day: bool,
        /// Status imposed by policy regardless of punctuality.
        forced_status: Option<AttendanceStatus>,
    },
    /// Every slot is filled; the scan must be refused.
    Terminal,
}

impl SlotResolution {
    /// The slot the next scan would fill, or `Complete`.
    #[must_use]
    pub const fn next_slot(&self) -> NextSlot {
        match self {
            Self::Fill { slot, .. } => NextSlot::Slot(*slot),
            Self::Terminal => NextSlot::Complete,
        }
    }
}

/// Resolves the slot a scan at `now` fills for `shift`.
///
/// `existing` must be the record for the same employee, shift and anchor date.
pub fn resolve(
    shift: ShiftType,
    existing: Option<&AttendanceRecord>,
    now: Timestamp,
    config: &ScheduleConfig,
) -> SlotResolution {
    // Only the slots of the requested shift count.
    let last_filled = existing.and_then(|record| {
        shift
            .slots()
            .iter()
            .rev()
            .copied()
            .find(|slot| record.slot(*slot).is_some())
    });

    match shift {
        ShiftType::Day => resolve_day(last_filled, now, config),
        ShiftType::Night => resolve_night(last_filled),
    }
}

fn resolve_day(last_filled: Option<Slot>, now: Timestamp, config: &ScheduleConfig) -> SlotResolution {
    let local = now.naive_local();
    let pm_start = local.date().and_time(config.pm_start.time());

    match last_filled {
        None | Some(Slot::NightIn | Slot::NightOut) => {
            let early_pm = pm_start - Duration::minutes(PM_EARLY_ARRIVAL_WINDOW_MINUTES);
            if local >= early_pm {
                SlotResolution::Fill {
                    slot: Slot::PmIn,
                    first_of_day: true,
                    forced_status: Some(AttendanceStatus::HalfDay),
                }
            } else {
                SlotResolution::Fill {
                    slot: Slot::AmIn,
                    first_of_day: true,
                    forced_status: None,
                }
            }
        }
        Some(Slot::AmIn) if local >= pm_start => fill(Slot::PmIn),
        Some(Slot::AmIn) => fill(Slot::AmOut),
        Some(Slot::AmOut) => fill(Slot::PmIn),
        Some(Slot::PmIn) => fill(Slot::PmOut),
        Some(Slot::PmOut) => SlotResolution::Terminal,
    }
}

fn resolve_night(last_filled: Option<Slot>) -> SlotResolution {
    match last_filled {
        None | Some(Slot::AmIn | Slot::AmOut | Slot::PmIn | Slot::PmOut) => {
            SlotResolution::Fill {
                slot: Slot::NightIn,
                first_of_day: true,
                forced_status: None,
            }
        }
        Some(Slot::NightIn) => fill(Slot::NightOut),
        Some(Slot::NightOut) => SlotResolution::Terminal,
    }
}

const fn fill(slot: Slot) -> SlotResolution {
    SlotResolution::Fill {
        slot,
        first_of_day: false,
        forced_status: None,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, NaiveDate};

    use super::*;
    use crate::types::EmployeeId;

    fn at(s: &str) -> Timestamp {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    fn record(shift: ShiftType) -> AttendanceRecord {
        AttendanceRecord::new(
            EmployeeId::new("emp-1").unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 3).unwrap(),
            shift,
            AttendanceStatus::Present,
        )
    }

    fn slot_of(resolution: SlotResolution) -> Option<Slot> {
        match resolution {
            SlotResolution::Fill { slot, .. } => Some(slot),
            SlotResolution::Terminal => None,
        }
    }

    #[test]
    fn first_morning_scan_fills_am_in() {
        let config = ScheduleConfig::default();
        let resolution = resolve(ShiftType::Day, None, at("2025-03-03T08:05:00+08:00"), &config);
        assert_eq!(
            resolution,
            SlotResolution::Fill {
                slot: Slot::AmIn,
                first_of_day: true,
                forced_status: None,
            }
        );
    }

    #[test]
    fn missed_morning_boundary_is_ninety_minutes_before_pm_start() {
        let config = ScheduleConfig::default();
        let before = resolve(ShiftType::Day, None, at("2025-03-03T11:29:59+08:00"), &config);
        assert_eq!(slot_of(before), Some(Slot::AmIn));

        let at_boundary = resolve(ShiftType::Day, None, at("2025-03-03T11:30:00+08:00"), &config);
        assert_eq!(
            at_boundary,
            SlotResolution::Fill {
                slot: Slot::PmIn,
                first_of_day: true,
                forced_status: Some(AttendanceStatus::HalfDay),
            }
        );
    }

    #[test]
    fn empty_existing_record_follows_first_scan_rules() {
        let config = ScheduleConfig::default();
        let mut absent = record(ShiftType::Day);
        absent.status = AttendanceStatus::Absent;
        let resolution = resolve(
            ShiftType::Day,
            Some(&absent),
            at("2025-03-03T13:10:00+08:00"),
            &config,
        );
        assert_eq!(slot_of(resolution), Some(Slot::PmIn));
    }

    #[test]
    fn day_sequence_in_order() {
        let config = ScheduleConfig::default();
        let mut r = record(ShiftType::Day);
        r.am_in = Some(at("2025-03-03T08:00:00+08:00"));
        let noon = at("2025-03-03T12:00:00+08:00");
        assert_eq!(
            slot_of(resolve(ShiftType::Day, Some(&r), noon, &config)),
            Some(Slot::AmOut)
        );

        r.am_out = Some(noon);
        let back = at("2025-03-03T12:55:00+08:00");
        assert_eq!(
            slot_of(resolve(ShiftType::Day, Some(&r), back, &config)),
            Some(Slot::PmIn)
        );

        r.pm_in = Some(back);
        let evening = at("2025-03-03T17:00:00+08:00");
        assert_eq!(
            slot_of(resolve(ShiftType::Day, Some(&r), evening, &config)),
            Some(Slot::PmOut)
        );

        r.pm_out = Some(evening);
        assert_eq!(
            resolve(ShiftType::Day, Some(&r), evening, &config),
            SlotResolution::Terminal
        );
    }

    #[test]
    fn afternoon_scan_after_am_in_skips_am_out() {
        let config = ScheduleConfig::default();
        let mut r = record(ShiftType::Day);
        r.am_in = Some(at("2025-03-03T08:00:00+08:00"));

        let before_pm = at("2025-03-03T12:59:59+08:00");
        assert_eq!(
            slot_of(resolve(ShiftType::Day, Some(&r), before_pm, &config)),
            Some(Slot::AmOut)
        );

        let after_pm = at("2025-03-03T13:00:00+08:00");
        assert_eq!(
            resolve(ShiftType::Day, Some(&r), after_pm, &config),
            fill(Slot::PmIn)
        );
    }

    #[test]
    fn missed_morning_record_continues_with_pm_out() {
        let config = ScheduleConfig::default();
        let mut r = record(ShiftType::Day);
        r.pm_in = Some(at("2025-03-03T13:10:00+08:00"));
        assert_eq!(
            slot_of(resolve(
                ShiftType::Day,
                Some(&r),
                at("2025-03-03T17:00:00+08:00"),
                &config
            )),
            Some(Slot::PmOut)
        );
    }

    #[test]
    fn night_sequence_and_terminal() {
        let config = ScheduleConfig::default();
        let mut r = record(ShiftType::Night);
        let late = at("2025-03-03T23:50:00+08:00");
        assert_eq!(
            slot_of(resolve(ShiftType::Night, None, late, &config)),
            Some(Slot::NightIn)
        );

        r.night_in = Some(late);
        let morning = at("2025-03-04T05:10:00+08:00");
        assert_eq!(
            slot_of(resolve(ShiftType::Night, Some(&r), morning, &config)),
            Some(Slot::NightOut)
        );

        r.night_out = Some(morning);
        assert_eq!(
            resolve(ShiftType::Night, Some(&r), morning, &config).next_slot(),
            NextSlot::Complete
        );
    }
}
