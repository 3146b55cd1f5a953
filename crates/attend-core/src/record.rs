//! Attendance records and the patches the engine writes to them.

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::shift::{AttendanceStatus, ShiftType, Slot};
use crate::types::{EmployeeId, RecordId, WorkHours};

/// A scan instant as observed by the server, with its local UTC offset.
pub type Timestamp = DateTime<FixedOffset>;

/// An employee known to the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
}

/// One work-day of one employee for one shift type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub id: RecordId,
    pub employee_id: EmployeeId,
    /// Anchor date: the day the shift started.
    pub date: NaiveDate,
    pub shift: ShiftType,
    pub am_in: Option<Timestamp>,
    pub am_out: Option<Timestamp>,
    pub pm_in: Option<Timestamp>,
    pub pm_out: Option<Timestamp>,
    pub night_in: Option<Timestamp>,
    pub night_out: Option<Timestamp>,
    pub status: AttendanceStatus,
    pub work_hours: Option<WorkHours>,
}

impl AttendanceRecord {
    /// Creates an empty record with a fresh ID.
    pub fn new(
        employee_id: EmployeeId,
        date: NaiveDate,
        shift: ShiftType,
        status: AttendanceStatus,
    ) -> Self {
        Self {
            id: RecordId::generate(),
            employee_id,
            date,
            shift,
            am_in: None,
            am_out: None,
            pm_in: None,
            pm_out: None,
            night_in: None,
            night_out: None,
            status,
            work_hours: None,
        }
    }

    /// Returns the timestamp stored in a slot.
    pub fn slot(&self, slot: Slot) -> Option<Timestamp> {
        match slot {
            Slot::AmIn => self.am_in,
            Slot::AmOut => self.am_out,
            Slot::PmIn => self.pm_in,
            Slot::PmOut => self.pm_out,
            Slot::NightIn => self.night_in,
            Slot::NightOut => self.night_out,
        }
    }

    fn slot_mut(&mut self, slot: Slot) -> &mut Option<Timestamp> {
        match slot {
            Slot::AmIn => &mut self.am_in,
            Slot::AmOut => &mut self.am_out,
            Slot::PmIn => &mut self.pm_in,
            Slot::PmOut => &mut self.pm_out,
            Slot::NightIn => &mut self.night_in,
            Slot::NightOut => &mut self.night_out,
        }
    }

    /// The last filled slot of this record's shift, in sequence order.
    pub fn last_filled(&self) -> Option<Slot> {
        self.shift
            .slots()
            .iter()
            .rev()
            .copied()
            .find(|slot| self.slot(*slot).is_some())
    }

    /// Timestamp of the most recent scan, found in reverse slot order.
    pub fn last_scan(&self) -> Option<Timestamp> {
        self.last_filled().and_then(|slot| self.slot(slot))
    }

    /// Number of filled slots for this record's shift.
    pub fn filled_count(&self) -> usize {
        self.shift
            .slots()
            .iter()
            .filter(|slot| self.slot(**slot).is_some())
            .count()
    }

    /// Whether the shift's final closing slot has been written.
    pub fn is_complete(&self) -> bool {
        self.slot(self.shift.closing_slot()).is_some()
    }

    /// Applies a patch in memory, mirroring what a store does on update.
    ///
    /// Returns `false` without changing anything if any slot the patch expects
    /// to be empty has been filled since its snapshot was taken.
    pub fn apply(&mut self, patch: &RecordPatch) -> bool {
        if patch
            .guarded_slots()
            .any(|slot| self.slot(slot).is_some())
        {
            return false;
        }
        *self.slot_mut(patch.slot) = Some(patch.at);
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(hours) = patch.work_hours {
            self.work_hours = Some(hours);
        }
        true
    }
}

/// A single-slot update.
///
/// Stores must only apply it while every slot of the shift after
/// `last_filled` is still empty, so that two scans decided from the same
/// snapshot cannot both advance the work-day, whichever slots they picked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordPatch {
    pub slot: Slot,
    pub at: Timestamp,
    /// Last filled slot of the snapshot the patch was decided from.
    pub last_filled: Option<Slot>,
    /// New status, if the scan changed it.
    pub status: Option<AttendanceStatus>,
    /// Set only when `slot` is the shift's closing slot.
    pub work_hours: Option<WorkHours>,
}

impl RecordPatch {
    /// Slots that must still be empty for the patch to apply: the shift's
    /// slots after `last_filled`, plus the target slot itself.
    pub fn guarded_slots(&self) -> impl Iterator<Item = Slot> + '_ {
        let slots = self.slot.shift().slots();
        let pending = self
            .last_filled
            .and_then(|last| slots.iter().position(|slot| *slot == last))
            .map_or(slots, |index| &slots[index + 1..]);
        let target = (!pending.contains(&self.slot)).then_some(self.slot);
        pending.iter().copied().chain(target)
    }
}

/// Result of a conditional store write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteResult {
    Written,
    /// Another writer got there first; re-read and decide again.
    Conflict,
}
