#![forbid(unsafe_code)]

//! Weekday labels for ISO dates.
//!
//! Dates are resolved the way `Date.UTC(y, m - 1, d)` resolves them, so the
//! badge agrees with what the page showed before it ran in WASM:
//!
//! - only the leading `YYYY-MM-DD` is read; anything after it is ignored,
//! - month and day overflow roll over (`2024-02-30` is March 1st),
//! - day `00` is the last day of the previous month,
//! - four-digit years `0000`..`0099` mean 1900..1999.
//!
//! Evaluation is in UTC, so the label never drifts with the viewer's zone.

use chrono::{Datelike, Days, NaiveDate, Weekday};

/// Short English weekday names, Sunday first.
pub const WEEKDAY_LABELS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Split a leading `YYYY-MM-DD` into numeric parts.
fn leading_ymd(iso: &str) -> Option<(i32, u32, u32)> {
    let bytes = iso.as_bytes();
    if bytes.len() < 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return None;
    }
    let digits = |range: std::ops::Range<usize>| -> Option<u32> {
        let part = &bytes[range];
        if !part.iter().all(u8::is_ascii_digit) {
            return None;
        }
        part.iter()
            .try_fold(0u32, |acc, b| acc.checked_mul(10)?.checked_add(u32::from(b - b'0')))
    };
    let year = i32::try_from(digits(0..4)?).ok()?;
    Some((year, digits(5..7)?, digits(8..10)?))
}

/// Resolve a leading `YYYY-MM-DD` to a calendar date with `Date.UTC`
/// normalization.
#[must_use]
pub fn resolve_iso_date(iso: &str) -> Option<NaiveDate> {
    let (mut year, month, day) = leading_ymd(iso)?;
    if (0..=99).contains(&year) {
        year += 1900;
    }

    // Months are zero-based and may overflow into following years.
    let month_index = i64::from(month) - 1;
    let year = year + i32::try_from(month_index.div_euclid(12)).ok()?;
    let month0 = u32::try_from(month_index.rem_euclid(12)).ok()?;
    let first = NaiveDate::from_ymd_opt(year, month0 + 1, 1)?;

    if day == 0 {
        first.checked_sub_days(Days::new(1))
    } else {
        first.checked_add_days(Days::new(u64::from(day - 1)))
    }
}

/// Short weekday label for a leading `YYYY-MM-DD`, or `None` if the text
/// does not start with one.
#[must_use]
pub fn weekday_label(iso: &str) -> Option<&'static str> {
    let date = resolve_iso_date(iso)?;
    Some(label_for(date.weekday()))
}

/// Short label for a weekday.
#[must_use]
pub fn label_for(weekday: Weekday) -> &'static str {
    WEEKDAY_LABELS[weekday.num_days_from_sunday() as usize]
}
