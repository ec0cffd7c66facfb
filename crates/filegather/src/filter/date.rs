//! Modification-date range parsing and matching.
//!
//! Dates have day granularity, taken in local time.
//!
//! ## Supported Syntax
//!
//! ### Keywords
//! - `any`, `today`, `yesterday`
//! - `thisweek`, `lastweek`, `thismonth`, `lastmonth`, `thisyear`, `lastyear`
//! - `last7days`, `last30days` (today minus N days through today)
//!
//! ### Absolute Dates
//! - `YYYY-MM-DD`, `YYYY/MM/DD`, `YYYY.MM.DD`
//! - `DD-MM-YYYY`, `DD/MM/YYYY`, `DD.MM.YYYY`
//! - `MM-DD-YYYY`, `MM/DD/YYYY`, `MM.DD.YYYY`
//!
//! ### Comparisons and Ranges
//! - `<2024-01-01`, `<=2024-01-01`, `>2024-01-01`, `>=2024-01-01`, `=2024-01-01`
//! - `2024-01-01..2024-12-31`, `..2024-12-31`, `2024-01-01..`

use chrono::{Datelike, Duration, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{GatherError, Result};

/// An inclusive date range. A missing side is unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    /// No date restriction.
    pub fn any() -> Self {
        Self::default()
    }

    pub fn between(start: NaiveDate, end: NaiveDate) -> Self {
        Self::new(Some(start), Some(end))
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        if let Some(start) = self.start {
            if date < start {
                return false;
            }
        }
        if let Some(end) = self.end {
            if date > end {
                return false;
            }
        }
        true
    }

    /// Parses a date range relative to the local current date.
    pub fn parse(raw: &str) -> Result<Self> {
        Self::parse_relative_to(raw, Local::now().date_naive())
    }

    /// Parses a date range, resolving keywords against `today`.
    pub fn parse_relative_to(raw: &str, today: NaiveDate) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(GatherError::Parse(
                "date filter requires a value".to_string(),
            ));
        }

        if let Some((op, value_raw)) = parse_date_comparison(trimmed) {
            let value = parse_date_value(value_raw, today)?;
            return Ok(match op {
                DateComparisonOp::Lt => Self::new(None, value.start.and_then(|d| d.pred_opt())),
                DateComparisonOp::Lte => Self::new(None, value.end),
                DateComparisonOp::Gt => Self::new(value.end.and_then(|d| d.succ_opt()), None),
                DateComparisonOp::Gte => Self::new(value.start, None),
                DateComparisonOp::Eq => value,
            });
        }

        if let Some((start_raw, end_raw)) = parse_date_range(trimmed) {
            let start = if start_raw.is_empty() {
                None
            } else {
                parse_date_value(start_raw, today)?.start
            };
            let end = if end_raw.is_empty() {
                None
            } else {
                parse_date_value(end_raw, today)?.end
            };
            if let (Some(s), Some(e)) = (start, end) {
                if s > e {
                    return Err(GatherError::Parse(
                        "date range start must be before or equal to end".to_string(),
                    ));
                }
            }
            return Ok(Self::new(start, end));
        }

        parse_date_value(trimmed, today)
    }
}

#[derive(Debug, Clone, Copy)]
enum DateComparisonOp {
    Lt,
    Lte,
    Gt,
    Gte,
    Eq,
}

fn parse_date_comparison(raw: &str) -> Option<(DateComparisonOp, &str)> {
    for (operator, kind) in [
        ("<=", DateComparisonOp::Lte),
        (">=", DateComparisonOp::Gte),
        ("<", DateComparisonOp::Lt),
        (">", DateComparisonOp::Gt),
        ("=", DateComparisonOp::Eq),
    ] {
        if let Some(value) = raw.strip_prefix(operator) {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                return None;
            }
            return Some((kind, trimmed));
        }
    }
    None
}

fn parse_date_range(raw: &str) -> Option<(&str, &str)> {
    let split = raw.find("..")?;
    let start = raw[..split].trim();
    let end = raw[split + 2..].trim();
    if start.is_empty() && end.is_empty() {
        return None;
    }
    Some((start, end))
}

/// Parses a keyword or absolute date into a range of whole days.
fn parse_date_value(raw: &str, today: NaiveDate) -> Result<DateRange> {
    let trimmed = raw.trim();

    if let Some(range) = keyword_range(trimmed, today) {
        return Ok(range);
    }

    if let Some(date) = parse_absolute_date(trimmed) {
        return Ok(DateRange::between(date, date));
    }

    Err(GatherError::Parse(format!(
        "unrecognized date value: {raw:?}"
    )))
}

fn keyword_range(keyword: &str, today: NaiveDate) -> Option<DateRange> {
    let lower = keyword.to_ascii_lowercase();
    let year = today.year();
    let month = today.month();

    match lower.as_str() {
        "any" | "all" => Some(DateRange::any()),
        "today" => Some(DateRange::between(today, today)),
        "yesterday" => {
            let date = today.checked_sub_signed(Duration::days(1))?;
            Some(DateRange::between(date, date))
        }
        "thisweek" => {
            // Monday-based week
            let weekday_offset = today.weekday().num_days_from_monday() as i64;
            let start = today.checked_sub_signed(Duration::days(weekday_offset))?;
            let end = start.checked_add_signed(Duration::days(6))?;
            Some(DateRange::between(start, end))
        }
        "lastweek" => {
            let weekday_offset = today.weekday().num_days_from_monday() as i64 + 7;
            let start = today.checked_sub_signed(Duration::days(weekday_offset))?;
            let end = start.checked_add_signed(Duration::days(6))?;
            Some(DateRange::between(start, end))
        }
        "thismonth" => month_range(year, month),
        "lastmonth" => {
            let (year, month) = if month == 1 {
                (year.checked_sub(1)?, 12)
            } else {
                (year, month - 1)
            };
            month_range(year, month)
        }
        "thisyear" => year_range(year),
        "lastyear" => year_range(year.checked_sub(1)?),
        "last7days" => trailing_range(today, 7),
        "last30days" => trailing_range(today, 30),
        _ => None,
    }
}

fn month_range(year: i32, month: u32) -> Option<DateRange> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)?;
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let end = NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()?;
    Some(DateRange::between(start, end))
}

fn year_range(year: i32) -> Option<DateRange> {
    let start = NaiveDate::from_ymd_opt(year, 1, 1)?;
    let end = NaiveDate::from_ymd_opt(year, 12, 31)?;
    Some(DateRange::between(start, end))
}

/// `days` days back from today, through today.
fn trailing_range(today: NaiveDate, days: i64) -> Option<DateRange> {
    let start = today.checked_sub_signed(Duration::days(days))?;
    Some(DateRange::between(start, today))
}

fn parse_absolute_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    let sep = trimmed.chars().find(|ch| matches!(ch, '-' | '/' | '.'))?;
    let year_first = trimmed.len() >= 4 && trimmed.as_bytes()[..4].iter().all(u8::is_ascii_digit);

    let formats: &[&str] = match (sep, year_first) {
        ('-', true) => &["%Y-%m-%d"],
        ('-', false) => &["%d-%m-%Y", "%m-%d-%Y"],
        ('/', true) => &["%Y/%m/%d"],
        ('/', false) => &["%m/%d/%Y", "%d/%m/%Y"],
        ('.', true) => &["%Y.%m.%d"],
        ('.', false) => &["%d.%m.%Y", "%m.%d.%Y"],
        _ => &[],
    };

    formats
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    fn reference_day() -> NaiveDate {
        // A Wednesday.
        date(2025, 3, 12)
    }

    #[test]
    fn unbounded_range_matches_everything() {
        let range = DateRange::any();
        assert!(range.is_unbounded());
        assert!(range.contains(date(1970, 1, 1)));
        assert!(range.contains(date(2999, 12, 31)));
    }

    #[test]
    fn bounds_are_inclusive() {
        let range = DateRange::between(date(2025, 1, 1), date(2025, 1, 31));
        assert!(range.contains(date(2025, 1, 1)));
        assert!(range.contains(date(2025, 1, 31)));
        assert!(!range.contains(date(2024, 12, 31)));
        assert!(!range.contains(date(2025, 2, 1)));
    }

    #[test]
    fn parse_today_and_yesterday() {
        let today = reference_day();
        assert_eq!(
            DateRange::parse_relative_to("today", today).unwrap(),
            DateRange::between(today, today)
        );
        assert_eq!(
            DateRange::parse_relative_to("Yesterday", today).unwrap(),
            DateRange::between(date(2025, 3, 11), date(2025, 3, 11))
        );
    }

    #[test]
    fn parse_trailing_windows() {
        let today = reference_day();
        assert_eq!(
            DateRange::parse_relative_to("last7days", today).unwrap(),
            DateRange::between(date(2025, 3, 5), today)
        );
        assert_eq!(
            DateRange::parse_relative_to("last30days", today).unwrap(),
            DateRange::between(date(2025, 2, 10), today)
        );
    }

    #[test]
    fn parse_calendar_keywords() {
        let today = reference_day();
        assert_eq!(
            DateRange::parse_relative_to("thisweek", today).unwrap(),
            DateRange::between(date(2025, 3, 10), date(2025, 3, 16))
        );
        assert_eq!(
            DateRange::parse_relative_to("lastmonth", today).unwrap(),
            DateRange::between(date(2025, 2, 1), date(2025, 2, 28))
        );
        assert_eq!(
            DateRange::parse_relative_to("lastyear", today).unwrap(),
            DateRange::between(date(2024, 1, 1), date(2024, 12, 31))
        );
    }

    #[test]
    fn parse_absolute_formats() {
        let today = reference_day();
        let expected = DateRange::between(date(2024, 6, 15), date(2024, 6, 15));
        assert_eq!(
            DateRange::parse_relative_to("2024-06-15", today).unwrap(),
            expected
        );
        assert_eq!(
            DateRange::parse_relative_to("2024/06/15", today).unwrap(),
            expected
        );
        assert_eq!(
            DateRange::parse_relative_to("15.06.2024", today).unwrap(),
            expected
        );
    }

    #[test]
    fn parse_comparisons() {
        let today = reference_day();
        assert_eq!(
            DateRange::parse_relative_to("<2024-01-01", today).unwrap(),
            DateRange::new(None, Some(date(2023, 12, 31)))
        );
        assert_eq!(
            DateRange::parse_relative_to(">2024-01-01", today).unwrap(),
            DateRange::new(Some(date(2024, 1, 2)), None)
        );
        assert_eq!(
            DateRange::parse_relative_to(">=2024-01-01", today).unwrap(),
            DateRange::new(Some(date(2024, 1, 1)), None)
        );
    }

    #[test]
    fn parse_ranges() {
        let today = reference_day();
        assert_eq!(
            DateRange::parse_relative_to("2024-01-01..2024-12-31", today).unwrap(),
            DateRange::between(date(2024, 1, 1), date(2024, 12, 31))
        );
        assert_eq!(
            DateRange::parse_relative_to("..2024-12-31", today).unwrap(),
            DateRange::new(None, Some(date(2024, 12, 31)))
        );
        assert_eq!(
            DateRange::parse_relative_to("last7days..", today).unwrap(),
            DateRange::new(Some(date(2025, 3, 5)), None)
        );
    }

    #[test]
    fn parse_errors() {
        let today = reference_day();
        assert!(DateRange::parse_relative_to("", today).is_err());
        assert!(DateRange::parse_relative_to("someday", today).is_err());
        assert!(DateRange::parse_relative_to("今天-1", today).is_err());
        assert!(DateRange::parse_relative_to("2024-12-31..2024-01-01", today).is_err());
    }
}
