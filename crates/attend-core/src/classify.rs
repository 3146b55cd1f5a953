//! Punctuality classification of arrivals against a session start.

use chrono::{Duration, NaiveDateTime};
use serde::Serialize;

use crate::record::Timestamp;
use crate::schedule::Session;
use crate::types::ClockTime;

/// Punctuality of a single arrival.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Punctuality {
    /// Arrived no later than start + grace.
    pub on_time: bool,
    /// Late by at least the half-day threshold.
    pub half_day: bool,
    /// Whole minutes after the scheduled start, never negative.
    pub minutes_late: i64,
}

impl Punctuality {
    /// Whether the arrival was past grace but short of a half-day.
    #[must_use]
    pub const fn is_late(&self) -> bool {
        !self.on_time && !self.half_day
    }
}

/// Classifies an arrival against the session start on the arrival's own date.
///
/// The grace deadline is inclusive: arriving exactly at `start + grace` is on time.
pub fn classify(
    arrival: Timestamp,
    session_start: ClockTime,
    grace_minutes: u32,
    half_day_threshold: u32,
) -> Punctuality {
    let scheduled = arrival.date_naive().and_time(session_start.time());
    classify_from(arrival, scheduled, grace_minutes, half_day_threshold)
}

/// Classifies an arrival for a configured session.
///
/// For a session that crosses midnight, an arrival before the session end is
/// measured against the previous evening's start.
pub fn classify_session(
    arrival: Timestamp,
    session: &Session,
    half_day_threshold: u32,
) -> Punctuality {
    let local = arrival.naive_local();
    let mut scheduled = local.date().and_time(session.start.time());
    if session.crosses_midnight() && local.time() < session.end.time() {
        scheduled -= Duration::days(1);
    }
    classify_from(arrival, scheduled, session.grace_minutes, half_day_threshold)
}

fn classify_from(
    arrival: Timestamp,
    scheduled: NaiveDateTime,
    grace_minutes: u32,
    half_day_threshold: u32,
) -> Punctuality {
    // Wall-clock arithmetic in the arrival's own offset.
    let elapsed = arrival.naive_local() - scheduled;
    let minutes_late = elapsed.num_seconds().div_euclid(60).max(0);
    let deadline = scheduled + Duration::minutes(i64::from(grace_minutes));

    if arrival.naive_local() <= deadline {
        return Punctuality {
            on_time: true,
            half_day: false,
            minutes_late,
        };
    }

    Punctuality {
        on_time: false,
        half_day: minutes_late >= i64::from(half_day_threshold),
        minutes_late,
    }
}
