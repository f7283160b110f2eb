use chrono::{Datelike, Days, NaiveDate, NaiveTime};

/// Parses a clock value in `HH:MM` form. Surrounding whitespace is tolerated,
/// anything else is not.
pub fn parse_clock(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").ok()
}

/// This is the standard way of converting a date to a string in hourbook.
pub fn format_day(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Month bucket key, `YYYY-MM`.
pub fn month_key(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

/// Week bucket key, `YYYY-Wnn`. Week numbering is `%W`: weeks start on Monday,
/// week 01 begins at the first Monday of the year and earlier days fall into
/// week 00. Zero padding keeps the keys sorting lexicographically.
pub fn week_key(date: NaiveDate) -> String {
    date.format("%Y-W%W").to_string()
}

/// Returns the Monday of the week `date` falls in. May land in the previous
/// year for early-January dates, and is `None` when that Monday falls off the
/// calendar entirely, which only happens within days of `NaiveDate::MIN`.
pub fn week_start(date: NaiveDate) -> Option<NaiveDate> {
    date.checked_sub_days(Days::new(date.weekday().num_days_from_monday() as u64))
}
