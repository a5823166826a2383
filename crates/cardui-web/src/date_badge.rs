#![forbid(unsafe_code)]

//! Weekday badge next to event dates.
//!
//! Every target element carries an ISO date and a `.dow` descendant that
//! receives `(Wkd)`. The DOM walk lives in the wasm host; this module decides
//! which attribute wins and what text to write.

use cardui_core::calendar::weekday_label;

/// Legacy single-date element id.
pub const LEGACY_TARGET_ID: &str = "date-value";
/// Selector for the remaining targets, in document order.
pub const TARGET_SELECTOR: &str = ".js-date, time[datetime]";
/// Descendant that receives the label.
pub const DOW_SELECTOR: &str = ".dow";

/// Pick the ISO text of one target.
///
/// `data-date` wins when non-empty. `datetime` is consulted only for
/// `<time>` elements.
#[must_use]
pub fn iso_source<'a>(
    data_date: Option<&'a str>,
    datetime: Option<&'a str>,
    is_time_element: bool,
) -> Option<&'a str> {
    data_date
        .filter(|v| !v.is_empty())
        .or_else(|| datetime.filter(|_| is_time_element))
        .filter(|v| !v.is_empty())
}

/// Badge text for an ISO date, e.g. `"(Fri)"`.
#[must_use]
pub fn badge_text(iso: &str) -> Option<String> {
    weekday_label(iso).map(|label| format!("({label})"))
}

/// Badge text for one target's attributes, or `None` when the target should
/// be left untouched.
#[must_use]
pub fn badge_for(
    data_date: Option<&str>,
    datetime: Option<&str>,
    is_time_element: bool,
) -> Option<String> {
    badge_text(iso_source(data_date, datetime, is_time_element)?)
}

#[cfg(test)]
mod tests {
    use super::{badge_for, badge_text, iso_source};

    #[test]
    fn data_date_wins() {
        assert_eq!(iso_source(Some("2024-03-01"), Some("2024-03-02"), true), Some("2024-03-01"));
        assert_eq!(iso_source(Some(""), Some("2024-03-02"), true), Some("2024-03-02"));
        assert_eq!(iso_source(None, Some("2024-03-02"), false), None);
        assert_eq!(iso_source(None, None, true), None);
    }

    #[test]
    fn badge_wraps_label() {
        assert_eq!(badge_text("2024-03-01").as_deref(), Some("(Fri)"));
        assert_eq!(badge_text("2024-02-30").as_deref(), Some("(Fri)"));
        assert_eq!(badge_text("2024-03-01T18:30:00+09:00").as_deref(), Some("(Fri)"));
        assert_eq!(badge_text("abc"), None);
    }

    #[test]
    fn non_time_elements_ignore_datetime() {
        assert_eq!(badge_for(None, Some("2026-10-14"), true).as_deref(), Some("(Wed)"));
        assert_eq!(badge_for(None, Some("2026-10-14"), false), None);
    }
}
