//! Anchor date resolution.
//!
//! A record is filed under the date its shift started. For day shifts that is
//! simply the scan date. A night shift scanned in the morning may still belong
//! to the previous evening, which needs one store lookup to decide.

use chrono::{Duration, NaiveDate, Timelike};

use crate::record::Timestamp;
use crate::shift::ShiftType;

/// Hour before which a night scan may close the previous evening's shift.
pub const NIGHT_CARRYOVER_CUTOFF_HOUR: u32 = 12;

/// Returns the date whose unfinished night record must be checked, if any.
///
/// Only night scans before noon can belong to the previous day.
pub fn previous_night_lookup(shift: ShiftType, now: Timestamp) -> Option<NaiveDate> {
    match shift {
        ShiftType::Day => None,
        ShiftType::Night => {
            if now.hour() < NIGHT_CARRYOVER_CUTOFF_HOUR {
                Some(now.date_naive() - Duration::days(1))
            } else {
                None
            }
        }
    }
}

/// Resolves the anchor date.
///
/// `previous_night_unclosed` says whether the store holds a night record for
/// the date returned by [`previous_night_lookup`] with `night_in` set and
/// `night_out` empty.
pub fn resolve(shift: ShiftType, now: Timestamp, previous_night_unclosed: bool) -> NaiveDate {
    match previous_night_lookup(shift, now) {
        Some(previous) if previous_night_unclosed => previous,
        _ => now.date_naive(),
    }
}
