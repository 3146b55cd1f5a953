//! Core type definitions with validation.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for core types.
///
/// These are always the caller's fault and are raised before any store is touched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// Unknown shift type string.
    #[error("invalid shift type: {value}")]
    InvalidShiftType { value: String },

    /// Unknown attendance status string.
    #[error("invalid attendance status: {value}")]
    InvalidStatus { value: String },

    /// Unknown slot name.
    #[error("invalid slot: {value}")]
    InvalidSlot { value: String },

    /// A wall-clock time that is not `HH:MM`.
    #[error("invalid clock time (expected HH:MM): {value}")]
    InvalidClockTime { value: String },
}

/// Generates a validated string ID newtype with common trait implementations.
macro_rules! define_string_id {
    (
        $(#[$meta:meta])*
        $name:ident, $field_name:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a new ID after validation.
            ///
            /// Surrounding whitespace is trimmed; an empty result is rejected.
            pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
                let id = id.into();
                let trimmed = id.trim();
                if trimmed.is_empty() {
                    return Err(ValidationError::Empty { field: $field_name });
                }
                if trimmed.len() == id.len() {
                    Ok(Self(id))
                } else {
                    Ok(Self(trimmed.to_string()))
                }
            }

            /// Returns the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_string_id!(
    /// A validated employee identifier.
    ///
    /// This is whatever the badge or QR code carries (an email or a staff number).
    EmployeeId, "employee ID"
);

define_string_id!(
    /// A validated attendance record identifier.
    RecordId, "record ID"
);

impl RecordId {
    /// Generates a fresh random record ID.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

/// A wall-clock time of day in `HH:MM` form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime(NaiveTime);

impl ClockTime {
    /// Builds a clock time from hour and minute, if valid.
    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self)
    }

    /// Returns the underlying `NaiveTime`.
    #[must_use]
    pub const fn time(self) -> NaiveTime {
        self.0
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M"))
    }
}

impl FromStr for ClockTime {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidClockTime {
            value: s.to_string(),
        };
        let (hour, minute) = s.trim().split_once(':').ok_or_else(invalid)?;
        if hour.is_empty() || hour.len() > 2 || minute.len() != 2 {
            return Err(invalid());
        }
        let hour: u32 = hour.parse().map_err(|_| invalid())?;
        let minute: u32 = minute.parse().map_err(|_| invalid())?;
        Self::from_hm(hour, minute).ok_or_else(invalid)
    }
}

impl Serialize for ClockTime {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ClockTime {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Worked time in hundredths of an hour.
///
/// Stored as an integer so that the two-decimal rounding happens exactly once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WorkHours(i64);

impl WorkHours {
    /// Zero hours.
    pub const ZERO: Self = Self(0);

    const MS_PER_HOUR: i64 = 3_600_000;

    /// Builds a value from hundredths of an hour. Negative input becomes zero.
    #[must_use]
    pub const fn from_centihours(centihours: i64) -> Self {
        if centihours < 0 { Self(0) } else { Self(centihours) }
    }

    /// Converts a duration in milliseconds, rounding half up to two decimals.
    #[must_use]
    pub const fn from_millis(ms: i64) -> Self {
        if ms <= 0 {
            return Self(0);
        }
        Self((ms * 100 + Self::MS_PER_HOUR / 2) / Self::MS_PER_HOUR)
    }

    /// Returns the value in hundredths of an hour.
    #[must_use]
    pub const fn centihours(self) -> i64 {
        self.0
    }

    /// Returns the value as fractional hours.
    #[must_use]
    #[expect(
        clippy::cast_precision_loss,
        reason = "centihour totals stay far below 2^52"
    )]
    pub fn as_f64(self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl std::ops::Add for WorkHours {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl std::iter::Sum for WorkHours {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, h| acc + h)
    }
}

impl fmt::Display for WorkHours {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl Serialize for WorkHours {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.as_f64().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for WorkHours {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let hours = f64::deserialize(deserializer)?;
        if !hours.is_finite() || hours < 0.0 {
            return Err(serde::de::Error::custom(format!(
                "work hours must be a non-negative number, got {hours}"
            )));
        }
        #[expect(
            clippy::cast_possible_truncation,
            reason = "value is finite, non-negative and rounded"
        )]
        let centihours = (hours * 100.0).round() as i64;
        Ok(Self(centihours))
    }
}
