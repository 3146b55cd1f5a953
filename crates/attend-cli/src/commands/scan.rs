//! Scan command: records one badge or QR scan.
//!
//! Scans on one machine are serialized with an exclusive lock file next to
//! the database. Scans from other machines are kept apart by the store's
//! conditional writes.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use attend_core::{AttendanceEngine, EmployeeId, ScanEvent, ScanOutcome, ShiftType, Timestamp};
use attend_db::Database;
use fs2::FileExt;

/// Runs the scan command.
pub fn run<W: Write>(
    writer: &mut W,
    db: Database,
    lock_path: &Path,
    employee: &str,
    shift: ShiftType,
    at: Timestamp,
    json: bool,
) -> Result<()> {
    let employee_id = EmployeeId::new(employee)?;

    let lock_file = File::create(lock_path).context("failed to create lock file")?;
    lock_file
        .lock_exclusive()
        .context("failed to acquire scan lock")?;

    let name = db
        .get_employee(&employee_id)?
        .map_or_else(|| employee_id.to_string(), |e| e.name);

    let mut engine = AttendanceEngine::new(db);
    let outcome = engine
        .record_scan(&ScanEvent::new(employee_id, shift, at))
        .context("failed to record scan")?;

    // Unlocks on drop as well; explicit so the lock never outlives the write.
    lock_file.unlock().context("failed to release scan lock")?;

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&outcome)?)?;
    } else {
        write_outcome(writer, &outcome, &name)?;
    }
    Ok(())
}

fn write_outcome<W: Write>(writer: &mut W, outcome: &ScanOutcome, name: &str) -> Result<()> {
    writeln!(writer, "{}", outcome.message(name))?;
    if let ScanOutcome::Recorded {
        status,
        next,
        work_hours,
        minutes_late,
        ..
    } = outcome
    {
        writeln!(writer, "Status: {status}")?;
        if let Some(minutes) = minutes_late.filter(|m| *m > 0) {
            writeln!(writer, "Minutes late: {minutes}")?;
        }
        if let Some(hours) = work_hours {
            writeln!(writer, "Work hours: {hours}")?;
        }
        writeln!(writer, "Next: {next}")?;
    }
    Ok(())
}
