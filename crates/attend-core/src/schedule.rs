//! Organization-wide schedule configuration.

use serde::{Deserialize, Serialize};

use crate::shift::SessionKind;
use crate::types::ClockTime;

/// Minutes late at which an arrival counts as a half-day.
pub const DEFAULT_HALF_DAY_THRESHOLD_MINUTES: u32 = 120;

/// Minimum seconds between two scans of the same work-day.
pub const DEFAULT_SCAN_COOLDOWN_SECS: u32 = 3;

/// Snapshot of session boundaries and grace periods.
///
/// Fetched once per engine call and passed down explicitly; nothing in the
/// engine reads configuration from anywhere else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub am_start: ClockTime,
    pub am_end: ClockTime,
    pub pm_start: ClockTime,
    pub pm_end: ClockTime,
    pub night_start: ClockTime,
    pub night_end: ClockTime,

    /// Grace periods in minutes.
    pub am_grace: u32,
    pub pm_grace: u32,
    pub night_grace: u32,

    /// Minutes late at which an arrival becomes a half-day.
    pub half_day_threshold: u32,

    /// Minimum spacing between scans, in seconds.
    pub scan_cooldown_secs: u32,
}

/// Start, end and grace of one configured session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    pub start: ClockTime,
    pub end: ClockTime,
    pub grace_minutes: u32,
}

impl Session {
    /// Whether the session starts on one calendar day and ends on the next.
    #[must_use]
    pub fn crosses_midnight(&self) -> bool {
        self.start > self.end
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            am_start: hm(8, 0),
            am_end: hm(12, 0),
            pm_start: hm(13, 0),
            pm_end: hm(17, 0),
            night_start: hm(22, 0),
            night_end: hm(6, 0),
            am_grace: 15,
            pm_grace: 15,
            night_grace: 15,
            half_day_threshold: DEFAULT_HALF_DAY_THRESHOLD_MINUTES,
            scan_cooldown_secs: DEFAULT_SCAN_COOLDOWN_SECS,
        }
    }
}

impl ScheduleConfig {
    /// Returns the configured window for a session.
    #[must_use]
    pub const fn session(&self, kind: SessionKind) -> Session {
        match kind {
            SessionKind::Am => Session {
                start: self.am_start,
                end: self.am_end,
                grace_minutes: self.am_grace,
            },
            SessionKind::Pm => Session {
                start: self.pm_start,
                end: self.pm_end,
                grace_minutes: self.pm_grace,
            },
            SessionKind::Night => Session {
                start: self.night_start,
                end: self.night_end,
                grace_minutes: self.night_grace,
            },
        }
    }

    /// Whether the night shift crosses midnight.
    #[must_use]
    pub fn night_crosses_midnight(&self) -> bool {
        self.session(SessionKind::Night).crosses_midnight()
    }
}

fn hm(hour: u32, minute: u32) -> ClockTime {
    ClockTime::from_hm(hour, minute).unwrap_or_default()
}
