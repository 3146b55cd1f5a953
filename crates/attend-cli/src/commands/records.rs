//! Records command for listing attendance records.

use std::io::Write;

use anyhow::Result;
use attend_core::{AttendanceRecord, ShiftType, Timestamp};
use attend_db::{Database, RecordFilter};

/// Formats a slot as wall-clock `HH:MM` in the offset it was scanned in.
pub fn format_slot(at: Option<Timestamp>) -> String {
    at.map_or_else(|| "-".to_string(), |at| at.format("%H:%M").to_string())
}

/// Formats the in/out pairs of a record as `in-out` spans.
fn format_spans(record: &AttendanceRecord) -> String {
    let span = |start, end| format!("{}-{}", format_slot(start), format_slot(end));
    match record.shift {
        ShiftType::Day => format!(
            "{}  {}",
            span(record.am_in, record.am_out),
            span(record.pm_in, record.pm_out)
        ),
        ShiftType::Night => span(record.night_in, record.night_out),
    }
}

pub fn run<W: Write>(writer: &mut W, db: &Database, filter: &RecordFilter, json: bool) -> Result<()> {
    let records = db.list_records(filter)?;

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&records)?)?;
        return Ok(());
    }

    if records.is_empty() {
        writeln!(writer, "No attendance records.")?;
        return Ok(());
    }

    writeln!(
        writer,
        "{:<10}  {:<12}  {:<5}  {:<8}  {:<24}  {:>5}",
        "Date", "Employee", "Shift", "Status", "Scans", "Hours"
    )?;
    for record in &records {
        let hours = record
            .work_hours
            .map_or_else(|| "-".to_string(), |h| h.to_string());
        writeln!(
            writer,
            "{:<10}  {:<12}  {:<5}  {:<8}  {:<24}  {:>5}",
            record.date.to_string(),
            record.employee_id.to_string(),
            record.shift.to_string(),
            record.status.to_string(),
            format_spans(record),
            hours
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use attend_core::{AttendanceStatus, AttendanceStore, EmployeeId, Employee, WorkHours};
    use chrono::{DateTime, NaiveDate};
    use insta::assert_snapshot;

    fn at(s: &str) -> Timestamp {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    fn seeded_db() -> Database {
        let mut db = Database::open_in_memory().unwrap();
        for id in ["ana", "ben"] {
            db.add_employee(&Employee {
                id: EmployeeId::new(id).unwrap(),
                name: id.to_uppercase(),
                department: None,
                position: None,
            })
            .unwrap();
        }

        let mut day = AttendanceRecord::new(
            EmployeeId::new("ana").unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 3).unwrap(),
            ShiftType::Day,
            AttendanceStatus::Present,
        );
        day.am_in = Some(at("2025-03-03T08:00:00+08:00"));
        day.am_out = Some(at("2025-03-03T12:00:00+08:00"));
        day.pm_in = Some(at("2025-03-03T13:00:00+08:00"));
        day.pm_out = Some(at("2025-03-03T17:00:00+08:00"));
        day.work_hours = Some(WorkHours::from_centihours(800));
        db.create_record(&day).unwrap();

        let mut night = AttendanceRecord::new(
            EmployeeId::new("ben").unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 4).unwrap(),
            ShiftType::Night,
            AttendanceStatus::Late,
        );
        night.night_in = Some(at("2025-03-04T22:30:00+08:00"));
        db.create_record(&night).unwrap();
        db
    }

    #[test]
    fn records_command_lists_day_and_night_records() {
        let db = seeded_db();
        let mut output = Vec::new();
        run(&mut output, &db, &RecordFilter::default(), false).unwrap();
        assert_snapshot!(String::from_utf8(output).unwrap(), @r"
        Date        Employee      Shift  Status    Scans                     Hours
        2025-03-03  ana           DAY    PRESENT   08:00-12:00  13:00-17:00   8.00
        2025-03-04  ben           NIGHT  LATE      22:30--                       -
        ");
    }

    #[test]
    fn records_command_filters_by_employee() {
        let db = seeded_db();
        let filter = RecordFilter {
            employee_id: Some(EmployeeId::new("ben").unwrap()),
            ..RecordFilter::default()
        };
        let mut output = Vec::new();
        run(&mut output, &db, &filter, true).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&output).unwrap();
        let records = value.as_array().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["shift"], "NIGHT");
        assert_eq!(records[0]["night_in"], "2025-03-04T22:30:00+08:00");
    }

    #[test]
    fn records_command_empty() {
        let db = Database::open_in_memory().unwrap();
        let mut output = Vec::new();
        run(&mut output, &db, &RecordFilter::default(), false).unwrap();
        assert_snapshot!(String::from_utf8(output).unwrap(), @"No attendance records.");
    }
}
