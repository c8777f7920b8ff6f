//! # Working-Day Arithmetic
//!
//! Calendar computations for the dispute cooling-off window. A dispute
//! without a defense only becomes arbitrable after three working days
//! (Monday–Friday) have elapsed since it was opened, giving the respondent
//! a mandatory response window.
//!
//! Granularity is calendar days: the day the dispute was opened counts as
//! the first working day if it falls on a weekday.

use chrono::{DateTime, Datelike, Days, Utc, Weekday};

/// Whether the given instant falls on a working day (Monday–Friday).
pub fn is_working_day(at: DateTime<Utc>) -> bool {
    !matches!(at.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Count working days from `start` (inclusive) to `end` (exclusive),
/// stepping one calendar day at a time and skipping weekends.
///
/// Returns 0 when `end <= start`.
pub fn working_days_between(start: DateTime<Utc>, end: DateTime<Utc>) -> u32 {
    let mut days = 0;
    let mut cursor = start;
    while cursor < end {
        if is_working_day(cursor) {
            days += 1;
        }
        // Stepping by whole days keeps the original calendar-day
        // granularity: partial final days still count.
        cursor = match cursor.checked_add_days(Days::new(1)) {
            Some(next) => next,
            None => break,
        };
    }
    days
}
