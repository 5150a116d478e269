//! Shared date and timestamp helpers.
//!
//! The store keeps all values as text: dates as `YYYY-MM-DD` and timestamps
//! as local ISO-8601 strings. These helpers centralize that formatting.

use chrono::{Datelike, Local, NaiveDate};

use crate::error::{Result, SalonOpsError};
use crate::models::DateRange;

/// Current local timestamp as an ISO-8601 string (`created_at` style).
#[must_use]
pub fn now_iso() -> String {
    Local::now().naive_local().format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}

/// Current local date as `YYYY-MM-DD`.
#[must_use]
pub fn today_iso() -> String {
    today().format("%Y-%m-%d").to_string()
}

/// Current local date.
#[must_use]
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Reporting period used by the dashboard: first day of the current month
/// through today, inclusive.
#[must_use]
pub fn current_month_range() -> DateRange {
    let end = today();
    let start = end.with_day(1).unwrap_or(end);
    DateRange { start, end }
}

/// Parse a `YYYY-MM-DD` date string.
pub fn parse_iso_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| SalonOpsError::InvalidDate(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_iso_date() {
        let date = parse_iso_date("2025-04-01").expect("valid date");
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 4, 1).expect("valid ymd"));
        assert!(parse_iso_date("01/04/2025").is_err());
        assert!(parse_iso_date("").is_err());
    }

    #[test]
    fn test_current_month_range_starts_on_day_one() {
        let range = current_month_range();
        assert_eq!(range.start.day(), 1);
        assert!(range.start <= range.end);
    }
}
