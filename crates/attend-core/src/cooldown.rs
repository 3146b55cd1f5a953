//! Duplicate-scan guard.

use serde::Serialize;

use crate::record::Timestamp;

/// Result of a cooldown check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Cooldown {
    pub allowed: bool,
    /// Whole seconds to wait before the next scan is accepted. Zero when allowed.
    pub wait_secs: u32,
}

impl Cooldown {
    const ALLOWED: Self = Self {
        allowed: true,
        wait_secs: 0,
    };
}

/// Checks whether a scan at `now` is far enough from the previous one.
///
/// A clock that moved backwards counts as zero elapsed time.
pub fn check(last_scan: Option<Timestamp>, now: Timestamp, cooldown_secs: u32) -> Cooldown {
    let Some(last) = last_scan else {
        return Cooldown::ALLOWED;
    };

    let window_ms = i64::from(cooldown_secs) * 1000;
    let elapsed_ms = (now - last).num_milliseconds().max(0);
    if elapsed_ms >= window_ms {
        return Cooldown::ALLOWED;
    }

    let remaining_ms = window_ms - elapsed_ms;
    let wait_secs = u32::try_from((remaining_ms + 999) / 1000).unwrap_or(cooldown_secs);
    Cooldown {
        allowed: false,
        wait_secs,
    }
}
