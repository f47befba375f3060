//! Calendar month used as the reporting period.

use std::{fmt, str::FromStr};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

const MIN_YEAR: i32 = 1;
const MAX_YEAR: i32 = 9999;

/// A year and month (`YYYY-MM`) scoping every derived view.
///
/// Boundaries are plain calendar dates, so month membership never depends on a
/// timezone offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self, PeriodError> {
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(PeriodError::YearOutOfRange(year));
        }
        if !(1..=12).contains(&month) {
            return Err(PeriodError::InvalidMonth(month));
        }
        Ok(Self { year, month })
    }

    /// Returns the month containing `date`.
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year().clamp(MIN_YEAR, MAX_YEAR),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// First calendar day of the month.
    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or_default()
    }

    /// Last calendar day of the month.
    pub fn last_day(&self) -> NaiveDate {
        self.date(self.days())
    }

    /// Number of days in the month.
    pub fn days(&self) -> u32 {
        days_in_month(self.year, self.month)
    }

    /// Returns the date for `day`, clamped into `1..=days()`.
    pub fn date(&self, day: u32) -> NaiveDate {
        let day = day.clamp(1, self.days());
        NaiveDate::from_ymd_opt(self.year, self.month, day).unwrap_or_default()
    }

    /// Returns `true` when `date` falls within the month (inclusive bounds).
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.first_day() && date <= self.last_day()
    }

    /// Moves by whole months, rolling the year over as needed.
    ///
    /// Saturates at `0001-01` and `9999-12`.
    pub fn shift(&self, delta: i32) -> Self {
        let index = self.index() + i64::from(delta);
        let min = i64::from(MIN_YEAR) * 12;
        let max = i64::from(MAX_YEAR) * 12 + 11;
        let index = index.clamp(min, max);
        Self {
            year: index.div_euclid(12) as i32,
            month: index.rem_euclid(12) as u32 + 1,
        }
    }

    pub fn previous(&self) -> Self {
        self.shift(-1)
    }

    pub fn next(&self) -> Self {
        self.shift(1)
    }

    fn index(&self) -> i64 {
        i64::from(self.year) * 12 + i64::from(self.month) - 1
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = PeriodError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let (year, month) = trimmed
            .split_once('-')
            .ok_or_else(|| PeriodError::Malformed(trimmed.to_string()))?;
        let well_formed = year.len() == 4
            && month.len() == 2
            && year.chars().chain(month.chars()).all(|c| c.is_ascii_digit());
        if !well_formed {
            return Err(PeriodError::Malformed(trimmed.to_string()));
        }
        let year = year
            .parse()
            .map_err(|_| PeriodError::Malformed(trimmed.to_string()))?;
        let month = month
            .parse()
            .map_err(|_| PeriodError::Malformed(trimmed.to_string()))?;
        Self::new(year, month)
    }
}

impl TryFrom<String> for YearMonth {
    type Error = PeriodError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<YearMonth> for String {
    fn from(value: YearMonth) -> Self {
        value.to_string()
    }
}

/// Errors that can occur when constructing [`YearMonth`] values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeriodError {
    Malformed(String),
    InvalidMonth(u32),
    YearOutOfRange(i32),
}

impl fmt::Display for PeriodError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeriodError::Malformed(raw) => write!(f, "`{raw}` is not a YYYY-MM period"),
            PeriodError::InvalidMonth(month) => write!(f, "month {month} is not within 1-12"),
            PeriodError::YearOutOfRange(year) => {
                write!(f, "year {year} is outside {MIN_YEAR}-{MAX_YEAR}")
            }
        }
    }
}

impl std::error::Error for PeriodError {}

/// Number of days in the given month of `year`, or 0 for an invalid month.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let next_month_start = match month {
        12 => NaiveDate::from_ymd_opt(year + 1, 1, 1),
        1..=11 => NaiveDate::from_ymd_opt(year, month + 1, 1),
        _ => None,
    };
    next_month_start
        .and_then(|start| start.pred_opt())
        .map_or(0, |last| last.day())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ym(raw: &str) -> YearMonth {
        raw.parse().unwrap()
    }

    #[test]
    fn shift_rolls_over_year_boundaries() {
        assert_eq!(ym("2025-01").shift(-1), ym("2024-12"));
        assert_eq!(ym("2025-01").shift(1), ym("2025-02"));
        assert_eq!(ym("2025-11").shift(14), ym("2027-01"));
        assert_eq!(ym("2025-03").shift(-27), ym("2022-12"));
    }

    #[test]
    fn shift_back_and_forth_is_identity() {
        for year in [1999, 2000, 2024, 2025] {
            for month in 1..=12 {
                let period = YearMonth::new(year, month).unwrap();
                assert_eq!(period.shift(-1).shift(1), period);
                assert_eq!(period.shift(1).shift(-1), period);
            }
        }
    }

    #[test]
    fn days_follow_leap_years() {
        assert_eq!(ym("2024-02").days(), 29);
        assert_eq!(ym("2023-02").days(), 28);
        assert_eq!(ym("1900-02").days(), 28);
        assert_eq!(ym("2000-02").days(), 29);
        assert_eq!(ym("2025-04").days(), 30);
        assert_eq!(ym("9999-12").days(), 31);
        assert_eq!(days_in_month(2025, 13), 0);
        assert_eq!(days_in_month(2025, 0), 0);
    }

    #[test]
    fn contains_uses_inclusive_calendar_bounds() {
        let october = ym("2025-10");
        assert!(october.contains(NaiveDate::from_ymd_opt(2025, 10, 1).unwrap()));
        assert!(october.contains(NaiveDate::from_ymd_opt(2025, 10, 31).unwrap()));
        assert!(!october.contains(NaiveDate::from_ymd_opt(2025, 9, 30).unwrap()));
        assert!(!october.contains(NaiveDate::from_ymd_opt(2025, 11, 1).unwrap()));
    }

    #[test]
    fn date_clamps_to_month_length() {
        assert_eq!(
            ym("2025-02").date(31),
            NaiveDate::from_ymd_opt(2025, 2, 28).unwrap()
        );
        assert_eq!(ym("2025-02").date(0), ym("2025-02").first_day());
    }

    #[test]
    fn parse_rejects_malformed_periods() {
        assert!("2025-1".parse::<YearMonth>().is_err());
        assert!("2025-13".parse::<YearMonth>().is_err());
        assert!("25-10".parse::<YearMonth>().is_err());
        assert!("october".parse::<YearMonth>().is_err());
        assert_eq!(ym(" 2025-10 ").to_string(), "2025-10");
    }

    #[test]
    fn serializes_as_string() {
        let json = serde_json::to_string(&ym("2025-10")).unwrap();
        assert_eq!(json, "\"2025-10\"");
        let parsed: YearMonth = serde_json::from_str("\"2024-02\"").unwrap();
        assert_eq!(parsed, ym("2024-02"));
        assert!(serde_json::from_str::<YearMonth>("\"2024-2\"").is_err());
    }
}
