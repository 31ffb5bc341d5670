use chrono::{DateTime, Months, NaiveDate};

use crate::error::BondYieldError;
use crate::BondYieldResult;

/// Advance `date` by `months` whole months, clamping the day-of-month to the
/// last valid day of the target month (Jan 31 + 1 month = Feb 28/29).
pub fn add_months(date: NaiveDate, months: u32) -> BondYieldResult<NaiveDate> {
    date.checked_add_months(Months::new(months)).ok_or_else(|| {
        BondYieldError::DateError(format!("{date} + {months} months is out of range"))
    })
}

/// Parse a settlement date. Accepts `YYYY-MM-DD` or an RFC 3339 timestamp,
/// in which case only the date part is kept.
pub fn parse_settlement_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(trimmed)
                .ok()
                .map(|dt| dt.date_naive())
        })
}
