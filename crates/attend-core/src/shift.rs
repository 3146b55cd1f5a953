//! Shift, slot and status enums as the single source of truth for their strings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::ValidationError;

/// The kind of work-day a scan belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ShiftType {
    /// Morning and afternoon sessions on one calendar day.
    #[default]
    Day,
    /// A single overnight session that may cross midnight.
    Night,
}

impl ShiftType {
    /// String representation for database storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "DAY",
            Self::Night => "NIGHT",
        }
    }

    /// The slots of this shift, in fill order.
    #[must_use]
    pub const fn slots(self) -> &'static [Slot] {
        match self {
            Self::Day => &[Slot::AmIn, Slot::AmOut, Slot::PmIn, Slot::PmOut],
            Self::Night => &[Slot::NightIn, Slot::NightOut],
        }
    }

    /// The slot whose write completes the work-day.
    #[must_use]
    pub const fn closing_slot(self) -> Slot {
        match self {
            Self::Day => Slot::PmOut,
            Self::Night => Slot::NightOut,
        }
    }
}

impl fmt::Display for ShiftType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ShiftType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DAY" => Ok(Self::Day),
            "NIGHT" => Ok(Self::Night),
            _ => Err(ValidationError::InvalidShiftType {
                value: s.to_string(),
            }),
        }
    }
}

/// Punctuality status of a work-day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttendanceStatus {
    Present,
    Late,
    HalfDay,
    Absent,
}

impl AttendanceStatus {
    /// String representation for database storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Present => "PRESENT",
            Self::Late => "LATE",
            Self::HalfDay => "HALF_DAY",
            Self::Absent => "ABSENT",
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AttendanceStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PRESENT" => Ok(Self::Present),
            "LATE" => Ok(Self::Late),
            "HALF_DAY" => Ok(Self::HalfDay),
            "ABSENT" => Ok(Self::Absent),
            _ => Err(ValidationError::InvalidStatus {
                value: s.to_string(),
            }),
        }
    }
}

/// Configured work session a slot belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionKind {
    Am,
    Pm,
    Night,
}

/// One of the nullable in/out timestamp fields on a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    AmIn,
    AmOut,
    PmIn,
    PmOut,
    NightIn,
    NightOut,
}

impl Slot {
    /// Column-style name, e.g. `am_in`.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AmIn => "am_in",
            Self::AmOut => "am_out",
            Self::PmIn => "pm_in",
            Self::PmOut => "pm_out",
            Self::NightIn => "night_in",
            Self::NightOut => "night_out",
        }
    }

    /// Human label, e.g. `AM In`.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::AmIn => "AM In",
            Self::AmOut => "AM Out",
            Self::PmIn => "PM In",
            Self::PmOut => "PM Out",
            Self::NightIn => "Night In",
            Self::NightOut => "Night Out",
        }
    }

    #[must_use]
    pub const fn shift(&self) -> ShiftType {
        match self {
            Self::AmIn | Self::AmOut | Self::PmIn | Self::PmOut => ShiftType::Day,
            Self::NightIn | Self::NightOut => ShiftType::Night,
        }
    }

    #[must_use]
    pub const fn session(&self) -> SessionKind {
        match self {
            Self::AmIn | Self::AmOut => SessionKind::Am,
            Self::PmIn | Self::PmOut => SessionKind::Pm,
            Self::NightIn | Self::NightOut => SessionKind::Night,
        }
    }

    /// Whether this slot opens a session (an arrival).
    #[must_use]
    pub const fn is_arrival(&self) -> bool {
        matches!(self, Self::AmIn | Self::PmIn | Self::NightIn)
    }

    /// The slot expected after this one within the same shift.
    #[must_use]
    pub const fn next(&self) -> NextSlot {
        match self {
            Self::AmIn => NextSlot::Slot(Self::AmOut),
            Self::AmOut => NextSlot::Slot(Self::PmIn),
            Self::PmIn => NextSlot::Slot(Self::PmOut),
            Self::NightIn => NextSlot::Slot(Self::NightOut),
            Self::PmOut | Self::NightOut => NextSlot::Complete,
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Slot {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "am_in" => Ok(Self::AmIn),
            "am_out" => Ok(Self::AmOut),
            "pm_in" => Ok(Self::PmIn),
            "pm_out" => Ok(Self::PmOut),
            "night_in" => Ok(Self::NightIn),
            "night_out" => Ok(Self::NightOut),
            _ => Err(ValidationError::InvalidSlot {
                value: s.to_string(),
            }),
        }
    }
}

/// What the next scan for a work-day will do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NextSlot {
    Slot(Slot),
    Complete,
}

impl fmt::Display for NextSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Slot(slot) => write!(f, "{}", slot.as_str()),
            Self::Complete => write!(f, "COMPLETE"),
        }
    }
}

/// Implements string-based serde for enums that already have `Display` + `FromStr`.
macro_rules! string_serde {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl Serialize for $ty {
                fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
                where
                    S: serde::Serializer,
                {
                    serializer.serialize_str(&self.to_string())
                }
            }

            impl<'de> Deserialize<'de> for $ty {
                fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
                where
                    D: serde::Deserializer<'de>,
                {
                    let s = String::deserialize(deserializer)?;
                    s.parse().map_err(serde::de::Error::custom)
                }
            }
        )+
    };
}

string_serde!(ShiftType, AttendanceStatus, Slot);

impl Serialize for NextSlot {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
