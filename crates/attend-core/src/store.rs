//! Persistence seam for the engine.

use std::collections::HashMap;
use std::convert::Infallible;

use chrono::NaiveDate;

use crate::record::{AttendanceRecord, Employee, RecordPatch, WriteResult};
use crate::schedule::ScheduleConfig;
use crate::shift::ShiftType;
use crate::types::{EmployeeId, RecordId};

/// Storage the engine reads from and writes to.
///
/// Writes are conditional so that concurrent scans for the same work-day
/// cannot both win:
/// - `create_record` must report [`WriteResult::Conflict`] when a record for
///   the same (employee, date, shift) already exists.
/// - `update_record` must report [`WriteResult::Conflict`] when any of
///   [`RecordPatch::guarded_slots`] has been filled since the patch's snapshot
///   (or the record is gone).
pub trait AttendanceStore {
    /// Error type of the backing store; propagated unchanged to callers.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Returns the current schedule, or the default when none is saved.
    fn schedule_config(&self) -> Result<ScheduleConfig, Self::Error>;

    fn employee_exists(&self, employee_id: &EmployeeId) -> Result<bool, Self::Error>;

    fn find_record(
        &self,
        employee_id: &EmployeeId,
        date: NaiveDate,
        shift: ShiftType,
    ) -> Result<Option<AttendanceRecord>, Self::Error>;

    /// Returns the night record for `date` that has `night_in` but no `night_out`.
    fn find_unclosed_night_record(
        &self,
        employee_id: &EmployeeId,
        date: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, Self::Error>;

    fn create_record(&mut self, record: &AttendanceRecord) -> Result<WriteResult, Self::Error>;

    fn update_record(
        &mut self,
        id: &RecordId,
        patch: &RecordPatch,
    ) -> Result<WriteResult, Self::Error>;
}

/// In-memory store.
///
/// Handy for embedding the engine without a database and for tests.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    config: Option<ScheduleConfig>,
    employees: HashMap<EmployeeId, Employee>,
    records: Vec<AttendanceRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_schedule_config(&mut self, config: ScheduleConfig) {
        self.config = Some(config);
    }

    pub fn add_employee(&mut self, employee: Employee) {
        self.employees.insert(employee.id.clone(), employee);
    }

    /// All records, in insertion order.
    pub fn records(&self) -> &[AttendanceRecord] {
        &self.records
    }
}

impl AttendanceStore for MemoryStore {
    type Error = Infallible;

    fn schedule_config(&self) -> Result<ScheduleConfig, Self::Error> {
        Ok(self.config.clone().unwrap_or_default())
    }

    fn employee_exists(&self, employee_id: &EmployeeId) -> Result<bool, Self::Error> {
        Ok(self.employees.contains_key(employee_id))
    }

    fn find_record(
        &self,
        employee_id: &EmployeeId,
        date: NaiveDate,
        shift: ShiftType,
    ) -> Result<Option<AttendanceRecord>, Self::Error> {
        Ok(self
            .records
            .iter()
            .find(|r| &r.employee_id == employee_id && r.date == date && r.shift == shift)
            .cloned())
    }

    fn find_unclosed_night_record(
        &self,
        employee_id: &EmployeeId,
        date: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, Self::Error> {
        Ok(self
            .find_record(employee_id, date, ShiftType::Night)?
            .filter(|r| r.night_in.is_some() && r.night_out.is_none()))
    }

    fn create_record(&mut self, record: &AttendanceRecord) -> Result<WriteResult, Self::Error> {
        if self
            .find_record(&record.employee_id, record.date, record.shift)?
            .is_some()
        {
            return Ok(WriteResult::Conflict);
        }
        self.records.push(record.clone());
        Ok(WriteResult::Written)
    }

    fn update_record(
        &mut self,
        id: &RecordId,
        patch: &RecordPatch,
    ) -> Result<WriteResult, Self::Error> {
        let Some(record) = self.records.iter_mut().find(|r| &r.id == id) else {
            return Ok(WriteResult::Conflict);
        };
        if record.apply(patch) {
            Ok(WriteResult::Written)
        } else {
            Ok(WriteResult::Conflict)
        }
    }
}
