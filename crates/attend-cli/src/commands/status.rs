//! Status command for showing an employee's current work-day.

use std::io::Write;

use anyhow::{Context, Result};
use attend_core::{
    AttendanceEngine, EmployeeId, EngineError, ShiftType, StatusReport, Timestamp, WorkDayState,
};
use attend_db::Database;
use serde::Serialize;

use super::records::format_slot;

#[derive(Debug, Serialize)]
struct JsonStatus<'a> {
    name: &'a str,
    state: WorkDayState,
    #[serde(flatten)]
    report: &'a StatusReport,
}

pub fn run<W: Write>(
    writer: &mut W,
    db: Database,
    employee: &str,
    shift: ShiftType,
    now: Timestamp,
    json: bool,
) -> Result<()> {
    let employee_id = EmployeeId::new(employee)?;
    let name = db
        .get_employee(&employee_id)?
        .map_or_else(|| employee_id.to_string(), |e| e.name);

    let engine = AttendanceEngine::new(db);
    let report = match engine.today_status(&employee_id, shift, now) {
        Ok(report) => report,
        Err(EngineError::NotFound(id)) => anyhow::bail!("employee not found: {id}"),
        Err(err) => return Err(err).context("failed to load status"),
    };

    if json {
        let status = JsonStatus {
            name: &name,
            state: report.state(),
            report: &report,
        };
        writeln!(writer, "{}", serde_json::to_string_pretty(&status)?)?;
        return Ok(());
    }

    writeln!(
        writer,
        "{name} ({employee_id}) - {shift} shift, {}",
        report.date
    )?;
    match &report.record {
        Some(record) if record.filled_count() > 0 => {
            writeln!(writer, "Status: {}", record.status)?;
            for slot in shift.slots() {
                writeln!(
                    writer,
                    "{:<10} {}",
                    format!("{}:", slot.label()),
                    format_slot(record.slot(*slot))
                )?;
            }
            if let Some(hours) = record.work_hours {
                writeln!(writer, "Work hours: {hours}")?;
            }
        }
        _ => writeln!(writer, "No scans yet.")?,
    }
    writeln!(writer, "Next: {}", report.next)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use attend_core::{Employee, ScanEvent};
    use chrono::DateTime;
    use insta::assert_snapshot;

    fn at(s: &str) -> Timestamp {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    fn seeded_db() -> Database {
        let mut db = Database::open_in_memory().unwrap();
        db.add_employee(&Employee {
            id: EmployeeId::new("ana").unwrap(),
            name: "Ana".to_string(),
            department: None,
            position: None,
        })
        .unwrap();
        db
    }

    #[test]
    fn status_command_before_any_scan() {
        let mut output = Vec::new();
        run(
            &mut output,
            seeded_db(),
            "ana",
            ShiftType::Day,
            at("2025-03-03T07:30:00+08:00"),
            false,
        )
        .unwrap();
        assert_snapshot!(String::from_utf8(output).unwrap(), @r"
        Ana (ana) - DAY shift, 2025-03-03
        No scans yet.
        Next: am_in
        ");
    }

    #[test]
    fn status_command_shows_open_night_shift() {
        let mut engine = AttendanceEngine::new(seeded_db());
        engine
            .record_scan(&ScanEvent::new(
                EmployeeId::new("ana").unwrap(),
                ShiftType::Night,
                at("2025-03-03T22:05:00+08:00"),
            ))
            .unwrap();

        let mut output = Vec::new();
        run(
            &mut output,
            engine.into_store(),
            "ana",
            ShiftType::Night,
            at("2025-03-04T03:00:00+08:00"),
            false,
        )
        .unwrap();
        assert_snapshot!(String::from_utf8(output).unwrap(), @r"
        Ana (ana) - NIGHT shift, 2025-03-03
        Status: PRESENT
        Night In:  22:05
        Night Out: -
        Next: night_out
        ");
    }

    #[test]
    fn status_command_unknown_employee_fails() {
        let mut output = Vec::new();
        let err = run(
            &mut output,
            seeded_db(),
            "ghost",
            ShiftType::Day,
            at("2025-03-03T08:00:00+08:00"),
            false,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "employee not found: ghost");
    }

    #[test]
    fn status_command_json_includes_state() {
        let mut output = Vec::new();
        run(
            &mut output,
            seeded_db(),
            "ana",
            ShiftType::Day,
            at("2025-03-03T07:30:00+08:00"),
            true,
        )
        .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(value["state"], "NOT_STARTED");
        assert_eq!(value["next"], "am_in");
        assert_eq!(value["date"], "2025-03-03");
        assert!(value["record"].is_null());
    }
}
