//! Storage layer for attendance tracking.
//!
//! Provides persistence for employees, schedule settings and attendance
//! records using `rusqlite`, and implements [`AttendanceStore`] so the engine
//! can run directly against it.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! Processes that share one database file are kept consistent by the conditional
//! writes described below, not by the connection.
//!
//! # Schema
//!
//! ## Timestamp Format
//!
//! Scan timestamps are stored as RFC 3339 TEXT with millisecond precision and
//! the original UTC offset (e.g. `2025-03-03T08:00:00.000+08:00`). Keeping the
//! offset preserves the wall-clock time the scan was judged against.
//! Anchor dates are stored as `YYYY-MM-DD`.
//!
//! ## Conditional Writes
//!
//! - `attendance` has a `UNIQUE (employee_id, date, shift)` key; creating a
//!   record that already exists is reported as [`WriteResult::Conflict`].
//! - Slot updates only apply while the target column, and every slot column
//!   of the shift after the last one the writer saw filled, is still `NULL`.
//!
//! ## Settings
//!
//! The schedule is a single JSON row in `settings` (`id = 1`). A missing row
//! means the default schedule.

use std::path::Path;

use attend_core::{
    AttendanceRecord, AttendanceStatus, AttendanceStore, Employee, EmployeeId, RecordId,
    RecordPatch, ScheduleConfig, ShiftType, Slot, Timestamp, WorkHours, WriteResult,
};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter};
use thiserror::Error;

const DATE_FORMAT: &str = "%Y-%m-%d";

const RECORD_COLUMNS: &str = "id, employee_id, date, shift, am_in, am_out, pm_in, pm_out, \
                              night_in, night_out, status, work_centihours";

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// Failed to parse a stored timestamp or date.
    #[error("invalid timestamp for record {record_id}: {value}")]
    TimestampParse {
        record_id: String,
        value: String,
        #[source]
        source: chrono::ParseError,
    },
    /// A stored row holds a value the domain types reject.
    #[error("invalid attendance record {record_id}: {message}")]
    InvalidRecord { record_id: String, message: String },
    /// The settings row is not valid JSON for the schedule.
    #[error("invalid settings: {0}")]
    Json(#[from] serde_json::Error),
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

/// Filter for [`Database::list_records`]. Date bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    pub employee_id: Option<EmployeeId>,
    pub shift: Option<ShiftType>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema. Idempotent.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS employees (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                department TEXT,
                position TEXT,
                created_at TEXT NOT NULL
            );

            -- Single-row schedule settings; data is the JSON schedule
            CREATE TABLE IF NOT EXISTS settings (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                data TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            -- One row per employee, anchor date and shift type
            -- slot columns: RFC 3339 with offset, NULL until scanned
            -- work_centihours: hundredths of an hour, set on the closing scan
            CREATE TABLE IF NOT EXISTS attendance (
                id TEXT PRIMARY KEY,
                employee_id TEXT NOT NULL,
                date TEXT NOT NULL,
                shift TEXT NOT NULL,
                am_in TEXT,
                am_out TEXT,
                pm_in TEXT,
                pm_out TEXT,
                night_in TEXT,
                night_out TEXT,
                status TEXT NOT NULL,
                work_centihours INTEGER,
                UNIQUE (employee_id, date, shift),
                FOREIGN KEY (employee_id) REFERENCES employees(id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_attendance_date ON attendance(date);
            ",
        )?;
        Ok(())
    }

    /// Adds an employee. Returns `false` if the ID is already taken.
    pub fn add_employee(&mut self, employee: &Employee) -> Result<bool, DbError> {
        let inserted = self.conn.execute(
            "
            INSERT OR IGNORE INTO employees (id, name, department, position, created_at)
            VALUES (?, ?, ?, ?, ?)
            ",
            params![
                employee.id.as_str(),
                employee.name,
                employee.department,
                employee.position,
                format_utc(Utc::now()),
            ],
        )?;
        if inserted > 0 {
            tracing::debug!(employee_id = %employee.id, "employee added");
        }
        Ok(inserted > 0)
    }

    pub fn get_employee(&self, id: &EmployeeId) -> Result<Option<Employee>, DbError> {
        let raw = self
            .conn
            .query_row(
                "SELECT id, name, department, position FROM employees WHERE id = ?",
                [id.as_str()],
                RawEmployee::from_row,
            )
            .optional()?;
        raw.map(RawEmployee::into_employee).transpose()
    }

    /// Lists employees ordered by ID.
    pub fn list_employees(&self) -> Result<Vec<Employee>, DbError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, department, position FROM employees ORDER BY id ASC")?;
        let rows = stmt.query_map([], RawEmployee::from_row)?;
        let mut employees = Vec::new();
        for row in rows {
            employees.push(row?.into_employee()?);
        }
        Ok(employees)
    }

    /// Loads the schedule, falling back to the default when none is saved.
    pub fn load_schedule_config(&self) -> Result<ScheduleConfig, DbError> {
        let data: Option<String> = self
            .conn
            .query_row("SELECT data FROM settings WHERE id = 1", [], |row| row.get(0))
            .optional()?;
        match data {
            Some(data) => Ok(serde_json::from_str(&data)?),
            None => Ok(ScheduleConfig::default()),
        }
    }

    /// Replaces the saved schedule.
    pub fn save_schedule_config(&mut self, config: &ScheduleConfig) -> Result<(), DbError> {
        let data = serde_json::to_string(config)?;
        self.conn.execute(
            "
            INSERT INTO settings (id, data, updated_at) VALUES (1, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                data = excluded.data,
                updated_at = excluded.updated_at
            ",
            params![data, format_utc(Utc::now())],
        )?;
        tracing::debug!("schedule settings saved");
        Ok(())
    }

    /// Lists records matching `filter`, ordered by date, employee then shift.
    pub fn list_records(&self, filter: &RecordFilter) -> Result<Vec<AttendanceRecord>, DbError> {
        let mut clauses = Vec::new();
        let mut values = Vec::new();
        if let Some(employee_id) = &filter.employee_id {
            clauses.push("employee_id = ?");
            values.push(employee_id.to_string());
        }
        if let Some(shift) = filter.shift {
            clauses.push("shift = ?");
            values.push(shift.to_string());
        }
        if let Some(from) = filter.from {
            clauses.push("date >= ?");
            values.push(format_date(from));
        }
        if let Some(to) = filter.to {
            clauses.push("date <= ?");
            values.push(format_date(to));
        }
        let where_clause = if clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", clauses.join(" AND "))
        };

        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM attendance {where_clause} \
             ORDER BY date ASC, employee_id ASC, shift ASC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(values.iter()), RawRecord::from_row)?;
        let mut records = Vec::new();
        for row in rows {
            records.push(row?.into_record()?);
        }
        Ok(records)
    }

    fn query_record(
        &self,
        sql_filter: &str,
        params: impl rusqlite::Params,
    ) -> Result<Option<AttendanceRecord>, DbError> {
        let sql = format!("SELECT {RECORD_COLUMNS} FROM attendance WHERE {sql_filter}");
        let raw = self
            .conn
            .query_row(&sql, params, RawRecord::from_row)
            .optional()?;
        raw.map(RawRecord::into_record).transpose()
    }
}

impl AttendanceStore for Database {
    type Error = DbError;

    fn schedule_config(&self) -> Result<ScheduleConfig, DbError> {
        self.load_schedule_config()
    }

    fn employee_exists(&self, employee_id: &EmployeeId) -> Result<bool, DbError> {
        let exists = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM employees WHERE id = ?)",
            [employee_id.as_str()],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    fn find_record(
        &self,
        employee_id: &EmployeeId,
        date: NaiveDate,
        shift: ShiftType,
    ) -> Result<Option<AttendanceRecord>, DbError> {
        self.query_record(
            "employee_id = ? AND date = ? AND shift = ?",
            params![employee_id.as_str(), format_date(date), shift.as_str()],
        )
    }

    fn find_unclosed_night_record(
        &self,
        employee_id: &EmployeeId,
        date: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, DbError> {
        self.query_record(
            "employee_id = ? AND date = ? AND shift = ? \
             AND night_in IS NOT NULL AND night_out IS NULL",
            params![
                employee_id.as_str(),
                format_date(date),
                ShiftType::Night.as_str()
            ],
        )
    }

    fn create_record(&mut self, record: &AttendanceRecord) -> Result<WriteResult, DbError> {
        let inserted = self.conn.execute(
            "
            INSERT INTO attendance
            (id, employee_id, date, shift, am_in, am_out, pm_in, pm_out,
             night_in, night_out, status, work_centihours)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(employee_id, date, shift) DO NOTHING
            ",
            params![
                record.id.as_str(),
                record.employee_id.as_str(),
                format_date(record.date),
                record.shift.as_str(),
                record.am_in.map(format_timestamp),
                record.am_out.map(format_timestamp),
                record.pm_in.map(format_timestamp),
                record.pm_out.map(format_timestamp),
                record.night_in.map(format_timestamp),
                record.night_out.map(format_timestamp),
                record.status.as_str(),
                record.work_hours.map(WorkHours::centihours),
            ],
        )?;
        if inserted == 0 {
            tracing::debug!(
                employee_id = %record.employee_id,
                date = %record.date,
                shift = %record.shift,
                "attendance record already exists"
            );
            return Ok(WriteResult::Conflict);
        }
        Ok(WriteResult::Written)
    }

    fn update_record(&mut self, id: &RecordId, patch: &RecordPatch) -> Result<WriteResult, DbError> {
        // Column names come from a closed enum, never from input.
        let column = patch.slot.as_str();
        let guard: String = patch
            .guarded_slots()
            .map(|slot| format!(" AND {slot} IS NULL"))
            .collect();
        let sql = format!(
            "
            UPDATE attendance SET
                {column} = ?1,
                status = COALESCE(?2, status),
                work_centihours = COALESCE(?3, work_centihours)
            WHERE id = ?4{guard}
            "
        );
        let updated = self.conn.execute(
            &sql,
            params![
                format_timestamp(patch.at),
                patch.status.map(|s| s.as_str()),
                patch.work_hours.map(WorkHours::centihours),
                id.as_str(),
            ],
        )?;
        if updated == 0 {
            tracing::debug!(
                record_id = %id,
                slot = %patch.slot,
                last_filled = ?patch.last_filled,
                "record changed since it was read"
            );
            return Ok(WriteResult::Conflict);
        }
        Ok(WriteResult::Written)
    }
}

struct RawEmployee {
    id: String,
    name: String,
    department: Option<String>,
    position: Option<String>,
}

impl RawEmployee {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            department: row.get(2)?,
            position: row.get(3)?,
        })
    }

    fn into_employee(self) -> Result<Employee, DbError> {
        let id = EmployeeId::new(self.id.clone()).map_err(|err| DbError::InvalidRecord {
            record_id: self.id.clone(),
            message: err.to_string(),
        })?;
        Ok(Employee {
            id,
            name: self.name,
            department: self.department,
            position: self.position,
        })
    }
}

struct RawRecord {
    id: String,
    employee_id: String,
    date: String,
    shift: String,
    slots: [Option<String>; 6],
    status: String,
    work_centihours: Option<i64>,
}

impl RawRecord {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            employee_id: row.get(1)?,
            date: row.get(2)?,
            shift: row.get(3)?,
            slots: [
                row.get(4)?,
                row.get(5)?,
                row.get(6)?,
                row.get(7)?,
                row.get(8)?,
                row.get(9)?,
            ],
            status: row.get(10)?,
            work_centihours: row.get(11)?,
        })
    }

    fn into_record(self) -> Result<AttendanceRecord, DbError> {
        let invalid = |message: String| DbError::InvalidRecord {
            record_id: self.id.clone(),
            message,
        };

        let id = RecordId::new(self.id.clone()).map_err(|e| invalid(e.to_string()))?;
        let employee_id =
            EmployeeId::new(self.employee_id.clone()).map_err(|e| invalid(e.to_string()))?;
        let shift: ShiftType = self.shift.parse().map_err(|e: attend_core::ValidationError| {
            invalid(e.to_string())
        })?;
        let status: AttendanceStatus = self
            .status
            .parse()
            .map_err(|e: attend_core::ValidationError| invalid(e.to_string()))?;
        let date = NaiveDate::parse_from_str(&self.date, DATE_FORMAT).map_err(|source| {
            DbError::TimestampParse {
                record_id: self.id.clone(),
                value: self.date.clone(),
                source,
            }
        })?;

        let mut record = AttendanceRecord::new(employee_id, date, shift, status);
        record.id = id;
        record.work_hours = self.work_centihours.map(WorkHours::from_centihours);
        let slots = [
            Slot::AmIn,
            Slot::AmOut,
            Slot::PmIn,
            Slot::PmOut,
            Slot::NightIn,
            Slot::NightOut,
        ];
        for (slot, value) in slots.into_iter().zip(&self.slots) {
            let Some(value) = value else { continue };
            let at = parse_timestamp(value, &self.id)?;
            let patch = RecordPatch {
                slot,
                at,
                last_filled: record.last_filled(),
                status: None,
                work_hours: None,
            };
            record.apply(&patch);
        }
        Ok(record)
    }
}

fn parse_timestamp(value: &str, record_id: &str) -> Result<Timestamp, DbError> {
    DateTime::parse_from_rfc3339(value).map_err(|source| DbError::TimestampParse {
        record_id: record_id.to_string(),
        value: value.to_string(),
        source,
    })
}

fn format_timestamp(timestamp: Timestamp) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, false)
}

fn format_utc(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use attend_core::{AttendanceEngine, ClockTime, NextSlot, ScanEvent, ScanOutcome};

    fn ts(s: &str) -> Timestamp {
        DateTime::parse_from_rfc3339(s).expect("valid timestamp")
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn employee(id: &str, name: &str) -> Employee {
        Employee {
            id: EmployeeId::new(id).expect("valid id"),
            name: name.to_string(),
            department: Some("Ops".to_string()),
            position: None,
        }
    }

    fn seeded() -> Database {
        let mut db = Database::open_in_memory().expect("open in-memory db");
        db.add_employee(&employee("ana", "Ana")).expect("add ana");
        db.add_employee(&employee("ben", "Ben")).expect("add ben");
        db
    }

    fn table_columns(conn: &Connection, table: &str) -> Vec<String> {
        let mut stmt = conn
            .prepare(&format!("PRAGMA table_info({table})"))
            .expect("prepare table_info");
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(1))
            .expect("query table_info");
        rows.map(|row| row.expect("table_info row")).collect()
    }

    #[test]
    fn open_in_memory_database() {
        let db = Database::open_in_memory();
        assert!(db.is_ok());
    }

    #[test]
    fn schema_matches_data_model() {
        let db = Database::open_in_memory().expect("open in-memory db");
        assert_eq!(
            table_columns(&db.conn, "attendance"),
            vec![
                "id",
                "employee_id",
                "date",
                "shift",
                "am_in",
                "am_out",
                "pm_in",
                "pm_out",
                "night_in",
                "night_out",
                "status",
                "work_centihours",
            ]
        );
        assert_eq!(
            table_columns(&db.conn, "employees"),
            vec!["id", "name", "department", "position", "created_at"]
        );
        assert_eq!(
            table_columns(&db.conn, "settings"),
            vec!["id", "data", "updated_at"]
        );
    }

    #[test]
    fn employees_round_trip() {
        let mut db = seeded();
        assert!(!db.add_employee(&employee("ana", "Other")).expect("add dup"));

        let ana = db
            .get_employee(&EmployeeId::new("ana").expect("id"))
            .expect("get")
            .expect("exists");
        assert_eq!(ana.name, "Ana");
        assert_eq!(ana.department.as_deref(), Some("Ops"));

        let ids: Vec<String> = db
            .list_employees()
            .expect("list")
            .into_iter()
            .map(|e| e.id.to_string())
            .collect();
        assert_eq!(ids, vec!["ana", "ben"]);

        assert!(db.employee_exists(&ana.id).expect("exists"));
        assert!(!db
            .employee_exists(&EmployeeId::new("zoe").expect("id"))
            .expect("exists"));
    }

    #[test]
    fn schedule_defaults_until_saved() {
        let mut db = Database::open_in_memory().expect("open in-memory db");
        assert_eq!(
            db.load_schedule_config().expect("load"),
            ScheduleConfig::default()
        );

        let config = ScheduleConfig {
            am_start: ClockTime::from_hm(7, 30).expect("time"),
            am_grace: 10,
            ..ScheduleConfig::default()
        };
        db.save_schedule_config(&config).expect("save");
        db.save_schedule_config(&config).expect("save again");
        assert_eq!(db.schedule_config().expect("load"), config);
    }

    #[test]
    fn create_record_enforces_unique_work_day() {
        let mut db = seeded();
        let ana = EmployeeId::new("ana").expect("id");
        let mut record = AttendanceRecord::new(
            ana.clone(),
            date(2025, 3, 3),
            ShiftType::Day,
            AttendanceStatus::Late,
        );
        record.am_in = Some(ts("2025-03-03T08:20:00.250+08:00"));
        assert_eq!(db.create_record(&record).expect("create"), WriteResult::Written);

        let duplicate = AttendanceRecord::new(
            ana.clone(),
            date(2025, 3, 3),
            ShiftType::Day,
            AttendanceStatus::Present,
        );
        assert_eq!(
            db.create_record(&duplicate).expect("create"),
            WriteResult::Conflict
        );

        // The other shift type is a separate work-day.
        let night = AttendanceRecord::new(
            ana.clone(),
            date(2025, 3, 3),
            ShiftType::Night,
            AttendanceStatus::Present,
        );
        assert_eq!(db.create_record(&night).expect("create"), WriteResult::Written);

        let stored = db
            .find_record(&ana, date(2025, 3, 3), ShiftType::Day)
            .expect("find")
            .expect("exists");
        assert_eq!(stored, record);
    }

    #[test]
    fn conditional_update_reports_filled_slot() {
        let mut db = seeded();
        let record = AttendanceRecord::new(
            EmployeeId::new("ana").expect("id"),
            date(2025, 3, 3),
            ShiftType::Day,
            AttendanceStatus::Present,
        );
        db.create_record(&record).expect("create");

        let patch = RecordPatch {
            slot: Slot::AmIn,
            at: ts("2025-03-03T08:00:00+08:00"),
            last_filled: None,
            status: Some(AttendanceStatus::Present),
            work_hours: None,
        };
        assert_eq!(
            db.update_record(&record.id, &patch).expect("update"),
            WriteResult::Written
        );

        let racing = RecordPatch {
            at: ts("2025-03-03T08:00:01+08:00"),
            status: Some(AttendanceStatus::Late),
            ..patch
        };
        assert_eq!(
            db.update_record(&record.id, &racing).expect("update"),
            WriteResult::Conflict
        );

        let stored = db
            .find_record(&record.employee_id, record.date, ShiftType::Day)
            .expect("find")
            .expect("exists");
        assert_eq!(stored.am_in, Some(ts("2025-03-03T08:00:00+08:00")));
        assert_eq!(stored.status, AttendanceStatus::Present);

        let missing = RecordId::new("missing").expect("id");
        assert_eq!(
            db.update_record(&missing, &patch).expect("update"),
            WriteResult::Conflict
        );
    }

    #[test]
    fn unclosed_night_lookup_ignores_closed_shifts() {
        let mut db = seeded();
        let ana = EmployeeId::new("ana").expect("id");
        let mut record = AttendanceRecord::new(
            ana.clone(),
            date(2025, 3, 3),
            ShiftType::Night,
            AttendanceStatus::Present,
        );
        record.night_in = Some(ts("2025-03-03T22:00:00+08:00"));
        db.create_record(&record).expect("create");

        assert!(db
            .find_unclosed_night_record(&ana, date(2025, 3, 3))
            .expect("find")
            .is_some());

        let close = RecordPatch {
            slot: Slot::NightOut,
            at: ts("2025-03-04T06:00:00+08:00"),
            last_filled: Some(Slot::NightIn),
            status: None,
            work_hours: Some(WorkHours::from_centihours(800)),
        };
        db.update_record(&record.id, &close).expect("update");
        assert!(db
            .find_unclosed_night_record(&ana, date(2025, 3, 3))
            .expect("find")
            .is_none());
    }

    #[test]
    fn list_records_filters_by_employee_and_range() {
        let mut db = seeded();
        for (id, day) in [("ana", 3), ("ana", 4), ("ben", 4), ("ana", 5)] {
            let record = AttendanceRecord::new(
                EmployeeId::new(id).expect("id"),
                date(2025, 3, day),
                ShiftType::Day,
                AttendanceStatus::Present,
            );
            db.create_record(&record).expect("create");
        }

        let all = db.list_records(&RecordFilter::default()).expect("list");
        assert_eq!(all.len(), 4);

        let filter = RecordFilter {
            employee_id: Some(EmployeeId::new("ana").expect("id")),
            from: Some(date(2025, 3, 4)),
            to: Some(date(2025, 3, 5)),
            ..RecordFilter::default()
        };
        let days: Vec<NaiveDate> = db
            .list_records(&filter)
            .expect("list")
            .into_iter()
            .map(|r| r.date)
            .collect();
        assert_eq!(days, vec![date(2025, 3, 4), date(2025, 3, 5)]);
    }

    #[test]
    fn engine_runs_against_database_file() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("attend.db");
        {
            let mut db = Database::open(&path).expect("open db");
            db.add_employee(&employee("ana", "Ana")).expect("add");
            let mut engine = AttendanceEngine::new(db);
            let evening = ScanEvent::new(
                EmployeeId::new("ana").expect("id"),
                ShiftType::Night,
                ts("2025-03-03T23:50:00+08:00"),
            );
            assert!(engine.record_scan(&evening).expect("scan").is_recorded());
        }

        // A fresh connection continues the same night shift.
        let db = Database::open(&path).expect("reopen db");
        let mut engine = AttendanceEngine::new(db);
        let morning = ScanEvent::new(
            EmployeeId::new("ana").expect("id"),
            ShiftType::Night,
            ts("2025-03-04T05:10:00+08:00"),
        );
        let (record, next, work_hours) = match engine.record_scan(&morning).expect("scan") {
            ScanOutcome::Recorded {
                record,
                next,
                work_hours,
                ..
            } => (record, next, work_hours),
            other => panic!("expected recorded scan, got {other:?}"),
        };
        assert_eq!(record.date, date(2025, 3, 3));
        assert_eq!(next, NextSlot::Complete);
        assert_eq!(work_hours.map(|h| h.to_string()).as_deref(), Some("5.33"));

        let stored = engine
            .store()
            .list_records(&RecordFilter::default())
            .expect("list");
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].work_hours, work_hours);
    }

    #[test]
    fn update_from_stale_snapshot_conflicts_across_connections() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("attend.db");
        let mut first = Database::open(&path).expect("open first");
        first.add_employee(&employee("ana", "Ana")).expect("add");
        let mut second = Database::open(&path).expect("open second");

        let ana = EmployeeId::new("ana").expect("id");
        let mut record = AttendanceRecord::new(
            ana.clone(),
            date(2025, 3, 3),
            ShiftType::Day,
            AttendanceStatus::Present,
        );
        record.am_in = Some(ts("2025-03-03T08:00:00+08:00"));
        first.create_record(&record).expect("create");

        // Both scanners read the record with only am_in filled.
        let snapshot = second
            .find_record(&ana, date(2025, 3, 3), ShiftType::Day)
            .expect("find")
            .expect("exists");
        let am_out = RecordPatch {
            slot: Slot::AmOut,
            at: ts("2025-03-03T12:59:59+08:00"),
            last_filled: snapshot.last_filled(),
            status: None,
            work_hours: None,
        };
        let pm_in = RecordPatch {
            slot: Slot::PmIn,
            at: ts("2025-03-03T13:00:01+08:00"),
            ..am_out.clone()
        };

        assert_eq!(
            first.update_record(&record.id, &am_out).expect("update"),
            WriteResult::Written
        );
        assert_eq!(
            second.update_record(&record.id, &pm_in).expect("update"),
            WriteResult::Conflict
        );

        let stored = first
            .find_record(&ana, date(2025, 3, 3), ShiftType::Day)
            .expect("find")
            .expect("exists");
        assert_eq!(stored.am_out, Some(ts("2025-03-03T12:59:59+08:00")));
        assert_eq!(stored.pm_in, None);
    }
}
