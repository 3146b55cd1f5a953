//! Attendance summaries over a set of records.

use serde::Serialize;

use crate::record::AttendanceRecord;
use crate::shift::AttendanceStatus;
use crate::types::WorkHours;

/// Aggregate counts for a report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AttendanceStats {
    pub total_days: usize,
    /// Days with any attendance (present, late or half-day).
    pub present_days: usize,
    pub absent_days: usize,
    pub late_days: usize,
    pub half_days: usize,
    pub total_work_hours: WorkHours,
    /// Mean over records that have computed hours.
    pub average_work_hours: WorkHours,
}

/// Summarizes `records`.
pub fn summarize(records: &[AttendanceRecord]) -> AttendanceStats {
    let mut stats = AttendanceStats {
        total_days: records.len(),
        ..AttendanceStats::default()
    };
    let mut closed = 0_i64;

    for record in records {
        match record.status {
            AttendanceStatus::Present => stats.present_days += 1,
            AttendanceStatus::Late => {
                stats.present_days += 1;
                stats.late_days += 1;
            }
            AttendanceStatus::HalfDay => {
                stats.present_days += 1;
                stats.half_days += 1;
            }
            AttendanceStatus::Absent => stats.absent_days += 1,
        }
        if let Some(hours) = record.work_hours {
            stats.total_work_hours = stats.total_work_hours + hours;
            closed += 1;
        }
    }

    if closed > 0 {
        let total = stats.total_work_hours.centihours();
        // Round half up to the nearest hundredth.
        stats.average_work_hours = WorkHours::from_centihours((total * 2 + closed) / (closed * 2));
    }
    stats
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::shift::ShiftType;
    use crate::types::EmployeeId;

    fn record(day: u32, status: AttendanceStatus, centihours: Option<i64>) -> AttendanceRecord {
        let mut r = AttendanceRecord::new(
            EmployeeId::new("emp-1").unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, day).unwrap(),
            ShiftType::Day,
            status,
        );
        r.work_hours = centihours.map(WorkHours::from_centihours);
        r
    }

    #[test]
    fn empty_set_is_all_zero() {
        assert_eq!(summarize(&[]), AttendanceStats::default());
    }

    #[test]
    fn counts_by_status_and_averages_closed_days() {
        let records = [
            record(3, AttendanceStatus::Present, Some(800)),
            record(4, AttendanceStatus::Late, Some(750)),
            record(5, AttendanceStatus::HalfDay, Some(400)),
            record(6, AttendanceStatus::Absent, None),
            // Still open: counted, but not averaged.
            record(7, AttendanceStatus::Present, None),
        ];
        let stats = summarize(&records);
        assert_eq!(stats.total_days, 5);
        assert_eq!(stats.present_days, 4);
        assert_eq!(stats.late_days, 1);
        assert_eq!(stats.half_days, 1);
        assert_eq!(stats.absent_days, 1);
        assert_eq!(stats.total_work_hours.to_string(), "19.50");
        assert_eq!(stats.average_work_hours.to_string(), "6.50");
    }

    #[test]
    fn average_rounds_half_up() {
        let records = [
            record(3, AttendanceStatus::Present, Some(1)),
            record(4, AttendanceStatus::Present, Some(0)),
        ];
        assert_eq!(summarize(&records).average_work_hours.centihours(), 1);
    }
}
