//! Calendar month used as the ledger bucket.

use core::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::value_object::ValueObject;

/// A year-month bucket (`2024-01`).
///
/// Ordering is chronological; serialized as `"YYYY-MM"`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Period {
    year: i32,
    month: u32,
}

impl ValueObject for Period {}

impl Period {
    /// Build a period; `None` if `month` is not in `1..=12`.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// The following month.
    pub fn next(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// The preceding month.
    pub fn prev(self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    /// Every period from `first` to `last`, inclusive. Empty if `first > last`.
    pub fn range(first: Period, last: Period) -> impl Iterator<Item = Period> {
        let mut cursor = Some(first).filter(|p| *p <= last);
        core::iter::from_fn(move || {
            let current = cursor?;
            cursor = Some(current.next()).filter(|p| *p <= last);
            Some(current)
        })
    }
}

impl core::fmt::Display for Period {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (y, m) = s
            .split_once('-')
            .ok_or_else(|| format!("period must look like YYYY-MM: {s}"))?;
        let year: i32 = y.parse().map_err(|_| format!("invalid period year: {s}"))?;
        let month: u32 = m.parse().map_err(|_| format!("invalid period month: {s}"))?;
        Period::new(year, month).ok_or_else(|| format!("month out of range: {s}"))
    }
}

impl TryFrom<String> for Period {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Period> for String {
    fn from(value: Period) -> Self {
        value.to_string()
    }
}
