//! Shared utilities for CLI commands.

use std::sync::LazyLock;

use anyhow::Context;
use attend_core::Timestamp;
use chrono::{DateTime, Duration, Local};
use regex::Regex;

/// Pre-compiled regex for relative time parsing.
static RELATIVE_TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)\s+(second|minute|hour|day)s?\s+ago$").expect("static regex is valid")
});

/// Conservative bound for relative times (~one year in seconds).
const MAX_RELATIVE_SECONDS: i64 = 366 * 24 * 60 * 60;

/// Current local time with its UTC offset.
pub fn now() -> Timestamp {
    Local::now().fixed_offset()
}

/// Parses `--at` values, defaulting to now.
pub fn resolve_at(at: Option<&str>) -> anyhow::Result<Timestamp> {
    at.map_or_else(|| Ok(now()), parse_datetime)
}

/// Parse a datetime string as either RFC 3339 or relative time.
///
/// RFC 3339 values keep their offset, which decides the wall-clock time a scan
/// is judged against. Relative values are taken from the local clock.
///
/// Supports:
/// - RFC 3339: "2025-03-03T08:00:00+08:00"
/// - Relative: "30 seconds ago", "10 minutes ago", "2 hours ago", "1 day ago"
pub fn parse_datetime(s: &str) -> anyhow::Result<Timestamp> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt);
    }

    let Some(caps) = RELATIVE_TIME_RE.captures(s.trim()) else {
        anyhow::bail!(
            "Invalid datetime: {s}. Use RFC 3339 (e.g., 2025-03-03T08:00:00+08:00) or relative (e.g., '10 minutes ago')"
        );
    };

    let n: i64 = caps[1]
        .parse()
        .context("failed to parse number in relative time")?;

    let seconds_per_unit = match &caps[2] {
        "second" => 1,
        "minute" => 60,
        "hour" => 60 * 60,
        "day" => 24 * 60 * 60,
        unit => anyhow::bail!("Unknown time unit: {unit}"),
    };

    if n > MAX_RELATIVE_SECONDS / seconds_per_unit {
        anyhow::bail!("Relative time value too large: {n} {}", &caps[2]);
    }

    Ok(now() - Duration::seconds(n * seconds_per_unit))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rfc3339_keeps_offset() {
        let parsed = parse_datetime("2025-03-03T08:00:00+08:00").unwrap();
        assert_eq!(parsed.offset().local_minus_utc(), 8 * 3600);
        assert_eq!(parsed.format("%H:%M").to_string(), "08:00");
    }

    #[test]
    fn relative_time_is_in_the_past() {
        let before = now();
        let parsed = parse_datetime("10 minutes ago").unwrap();
        let elapsed = before - parsed;
        assert!(elapsed >= Duration::minutes(9) && elapsed <= Duration::minutes(11));
    }

    #[test]
    fn rejects_garbage_and_huge_values() {
        assert!(parse_datetime("yesterday-ish").is_err());
        assert!(parse_datetime("99999 days ago").is_err());
    }
}
