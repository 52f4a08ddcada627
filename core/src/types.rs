//! Shared primitive types used across the entire engine.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A stable, unique identifier for a chapter member.
///
/// RULE: identity lives here, never in the display name. Two snapshots
/// showing different display names for the same id are the same person.
pub type MemberId = String;

/// The canonical chapter identifier.
pub type ChapterId = String;

/// A calendar month, the unit of snapshot capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MonthId {
    pub year: i32,
    /// 1-based calendar month, 1..=12.
    pub month: u32,
}

impl MonthId {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    /// First calendar day of this month, None for an out-of-range month value.
    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    /// The following calendar month.
    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self { year: self.year + 1, month: 1 }
        } else {
            Self { year: self.year, month: self.month + 1 }
        }
    }

    /// Human-readable label for table headings, e.g. "Mar 2025".
    pub fn label(&self) -> String {
        match self.first_day() {
            Some(day) => day.format("%b %Y").to_string(),
            None => self.to_string(),
        }
    }
}

impl fmt::Display for MonthId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid month '{0}', expected YYYY-MM")]
pub struct ParseMonthError(String);

impl FromStr for MonthId {
    type Err = ParseMonthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s
            .split_once('-')
            .ok_or_else(|| ParseMonthError(s.to_string()))?;
        let year: i32 = year.parse().map_err(|_| ParseMonthError(s.to_string()))?;
        let month: u32 = month.parse().map_err(|_| ParseMonthError(s.to_string()))?;
        MonthId::new(year, month).ok_or_else(|| ParseMonthError(s.to_string()))
    }
}

/// One chapter member as declared by a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub display_name: String,
}

impl Member {
    pub fn new(id: impl Into<MemberId>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_parses_and_round_trips() {
        let m: MonthId = "2025-03".parse().expect("parse");
        assert_eq!(m, MonthId { year: 2025, month: 3 });
        assert_eq!(m.to_string(), "2025-03");
    }

    #[test]
    fn month_rejects_garbage() {
        assert!("2025".parse::<MonthId>().is_err());
        assert!("2025-13".parse::<MonthId>().is_err());
        assert!("03-2025x".parse::<MonthId>().is_err());
    }

    #[test]
    fn month_next_rolls_over_december() {
        let dec = MonthId { year: 2024, month: 12 };
        assert_eq!(dec.next(), MonthId { year: 2025, month: 1 });
    }

    #[test]
    fn month_ordering_is_chronological() {
        let a = MonthId { year: 2024, month: 12 };
        let b = MonthId { year: 2025, month: 1 };
        assert!(a < b, "December 2024 must sort before January 2025");
    }
}
