//! Worked-hours calculation for a closed work-day.

use crate::record::{AttendanceRecord, Timestamp};
use crate::shift::ShiftType;
use crate::types::WorkHours;

/// Sums the closed intervals of a record, using `closing_at` as the final out.
///
/// Day shifts add the morning interval (when both ends exist) to the afternoon
/// interval ending at `closing_at`. Night shifts measure `night_in..closing_at`.
/// Intervals are true elapsed time, so offset changes across midnight are
/// accounted for.
pub fn compute(record: &AttendanceRecord, closing_at: Timestamp) -> WorkHours {
    let ms = match record.shift {
        ShiftType::Day => {
            let morning = match (record.am_in, record.am_out) {
                (Some(start), Some(end)) => interval_ms(start, end),
                _ => 0,
            };
            let afternoon = record
                .pm_in
                .map_or(0, |start| interval_ms(start, closing_at));
            morning + afternoon
        }
        ShiftType::Night => record
            .night_in
            .map_or(0, |start| interval_ms(start, closing_at)),
    };
    WorkHours::from_millis(ms)
}

fn interval_ms(start: Timestamp, end: Timestamp) -> i64 {
    (end - start).num_milliseconds().max(0)
}
