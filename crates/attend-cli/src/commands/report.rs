//! Report command for attendance summaries.

use std::io::Write;

use anyhow::Result;
use attend_core::{AttendanceStats, summarize};
use attend_db::{Database, RecordFilter};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    employee_id: Option<String>,
    from: Option<String>,
    to: Option<String>,
    #[serde(flatten)]
    stats: &'a AttendanceStats,
}

pub fn run<W: Write>(writer: &mut W, db: &Database, filter: &RecordFilter, json: bool) -> Result<()> {
    let records = db.list_records(filter)?;
    let stats = summarize(&records);
    tracing::debug!(records = records.len(), "summarized attendance");

    if json {
        let report = JsonReport {
            employee_id: filter.employee_id.as_ref().map(ToString::to_string),
            from: filter.from.map(|d| d.to_string()),
            to: filter.to.map(|d| d.to_string()),
            stats: &stats,
        };
        writeln!(writer, "{}", serde_json::to_string_pretty(&report)?)?;
        return Ok(());
    }

    let employee = filter
        .employee_id
        .as_ref()
        .map_or_else(|| "all employees".to_string(), ToString::to_string);
    let period = match (filter.from, filter.to) {
        (None, None) => "all dates".to_string(),
        (Some(from), None) => format!("from {from}"),
        (None, Some(to)) => format!("through {to}"),
        (Some(from), Some(to)) => format!("{from} to {to}"),
    };

    writeln!(writer, "ATTENDANCE REPORT: {employee}, {period}")?;
    writeln!(writer)?;
    writeln!(writer, "Days recorded    {:>6}", stats.total_days)?;
    writeln!(writer, "Present          {:>6}", stats.present_days)?;
    writeln!(writer, "  late           {:>6}", stats.late_days)?;
    writeln!(writer, "  half-day       {:>6}", stats.half_days)?;
    writeln!(writer, "Absent           {:>6}", stats.absent_days)?;
    writeln!(writer, "Total hours      {:>6}", stats.total_work_hours.to_string())?;
    writeln!(writer, "Average hours    {:>6}", stats.average_work_hours.to_string())?;
    Ok(())
}
