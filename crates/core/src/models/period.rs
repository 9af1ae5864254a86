use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::errors::CoreError;

/// Earliest representable year.
pub const MIN_YEAR: i32 = 0;
/// Latest representable year; keeps the `YYYY-MM` form four digits wide.
pub const MAX_YEAR: i32 = 9999;

/// A calendar month, the unit of expense accounting and archival.
///
/// Ordering is chronological (`year` first, then `month`), which is also the
/// lexicographic order of the `"YYYY-MM"` string form used on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PeriodKey {
    year: i32,
    month: u32,
}

impl PeriodKey {
    /// Build a period from a year and a 1-based month.
    pub fn new(year: i32, month: u32) -> Result<Self, CoreError> {
        if !(1..=12).contains(&month) {
            return Err(CoreError::ValidationError(format!(
                "Month must be between 1 and 12, got {month}"
            )));
        }
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(CoreError::ValidationError(format!(
                "Year must be between {MIN_YEAR} and {MAX_YEAR}, got {year}"
            )));
        }
        Ok(Self { year, month })
    }

    /// The period containing the given instant (UTC calendar).
    pub fn from_datetime(at: &DateTime<Utc>) -> Self {
        Self::from_date(at.date_naive())
    }

    /// Dates outside years 0..=9999 clamp to the nearest representable month.
    pub fn from_date(date: NaiveDate) -> Self {
        match date.year() {
            y if y < MIN_YEAR => Self { year: MIN_YEAR, month: 1 },
            y if y > MAX_YEAR => Self { year: MAX_YEAR, month: 12 },
            year => Self {
                year,
                month: date.month(),
            },
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// The following calendar month. Saturates at `9999-12`.
    #[must_use]
    pub fn next(&self) -> Self {
        if self.year >= MAX_YEAR && self.month == 12 {
            *self
        } else if self.month == 12 {
            Self { year: self.year + 1, month: 1 }
        } else {
            Self { year: self.year, month: self.month + 1 }
        }
    }

    /// The preceding calendar month. Saturates at `0000-01`.
    #[must_use]
    pub fn previous(&self) -> Self {
        if self.year <= MIN_YEAR && self.month == 1 {
            *self
        } else if self.month == 1 {
            Self { year: self.year - 1, month: 12 }
        } else {
            Self { year: self.year, month: self.month - 1 }
        }
    }

    /// Step back `months` calendar months. Saturates at `0000-01`.
    #[must_use]
    pub fn minus_months(&self, months: u32) -> Self {
        let index = (self.year as i64 * 12 + (self.month as i64 - 1) - months as i64)
            .max(MIN_YEAR as i64 * 12);
        Self {
            year: index.div_euclid(12) as i32,
            month: index.rem_euclid(12) as u32 + 1,
        }
    }

    /// Number of whole months from `self` to `later` (negative if `later` is earlier).
    pub fn months_until(&self, later: &PeriodKey) -> i64 {
        (later.year as i64 - self.year as i64) * 12 + (later.month as i64 - self.month as i64)
    }

    /// First day of the month.
    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    /// Does the instant fall inside this period?
    pub fn contains(&self, at: &DateTime<Utc>) -> bool {
        Self::from_datetime(at) == *self
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for PeriodKey {
    type Err = CoreError;

    /// Parses `"YYYY-MM"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CoreError::ValidationError(format!("Invalid period key '{s}': expected YYYY-MM"));
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Self::new(year, month)
    }
}

impl Serialize for PeriodKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for PeriodKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
