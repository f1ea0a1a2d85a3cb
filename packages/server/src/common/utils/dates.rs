//! Date normalization shared by every source adapter.
//!
//! Listing sites publish dates in whatever shape their frontend happens to
//! render: ISO timestamps, "Jun 23 - 25, 2025" ranges, "5 days left"
//! countdowns. Everything in here reduces those strings to a calendar
//! [`NaiveDate`] or `None`. Nothing panics on bad input.
//!
//! Every function is idempotent on `YYYY-MM-DD` input.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, Timelike, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

lazy_static! {
    static ref DAYS_LEFT_REGEX: Regex = Regex::new(r"(?i)\b(\d+)\s+days?\s+left\b").unwrap();

    // "June 23", "Jun 23, 2025", "25", "2nd 2025"
    static ref SEGMENT_REGEX: Regex = Regex::new(
        r"(?i)^(?:([a-z]+)\.?\s+)?(\d{1,2})(?:st|nd|rd|th)?(?:,?\s+(\d{4}))?$"
    ).unwrap();

    // A "Month Day[, Year]" fragment buried in free text
    static ref MONTH_DAY_REGEX: Regex = Regex::new(
        r"(?i)\b([a-z]{3,9})\.?\s+(\d{1,2})(?:st|nd|rd|th)?\b(?:,?\s+(\d{4})\b)?"
    ).unwrap();

    static ref YEAR_REGEX: Regex = Regex::new(r"\b(\d{4})\b").unwrap();
}

const MONTH_NAMES: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

const DATE_FORMATS: [&str; 8] = [
    "%b %d, %Y",
    "%b %d %Y",
    "%d %b %Y",
    "%d %b, %Y",
    "%A, %b %d, %Y",
    "%a, %b %d, %Y",
    "%m/%d/%Y",
    "%Y/%m/%d",
];

const NAIVE_DATETIME_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

const OFFSET_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%z"];

/// Today's calendar date in UTC.
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Resolve an English month name or abbreviation ("Jun", "june", "Sept") to 1..=12.
pub fn month_from_name(name: &str) -> Option<u32> {
    let name = name.trim().trim_end_matches('.').to_ascii_lowercase();
    if name.len() < 3 {
        return None;
    }

    MONTH_NAMES
        .iter()
        .position(|month| month.starts_with(&name))
        .map(|index| index as u32 + 1)
}

/// Parse any free-form date or timestamp into a calendar date.
///
/// Timestamps carrying an offset are converted to UTC before the date is
/// taken. Strings without a year resolve against the current year.
pub fn normalize_date(text: &str) -> Option<NaiveDate> {
    normalize_date_in(text, today().year())
}

/// [`normalize_date`] with an explicit year for yearless input.
pub fn normalize_date_in(text: &str, default_year: i32) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(date);
    }

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(text) {
        return Some(timestamp.with_timezone(&Utc).date_naive());
    }

    for format in OFFSET_DATETIME_FORMATS {
        if let Ok(timestamp) = DateTime::parse_from_str(text, format) {
            return Some(timestamp.with_timezone(&Utc).date_naive());
        }
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(timestamp) = NaiveDateTime::parse_from_str(text, format) {
            return Some(timestamp.date());
        }
    }

    if let Ok(timestamp) = DateTime::parse_from_rfc2822(text) {
        return Some(timestamp.with_timezone(&Utc).date_naive());
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Some(date);
        }
    }

    let fragment = MONTH_DAY_REGEX.captures_iter(text).find_map(|caps| {
        let month = month_from_name(&caps[1])?;
        let day: u32 = caps[2].parse().ok()?;
        let year = caps
            .get(3)
            .and_then(|y| y.as_str().parse().ok())
            .unwrap_or(default_year);
        NaiveDate::from_ymd_opt(year, month, day)
    });

    if fragment.is_none() {
        debug!(input = %text, "Unparseable date");
    }

    fragment
}

/// One side of a "Month Day - Month Day, Year" range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RangeSegment {
    month: Option<u32>,
    day: u32,
    year: Option<i32>,
}

impl RangeSegment {
    fn parse(text: &str) -> Option<Self> {
        let text = text.trim();

        if let Some(caps) = SEGMENT_REGEX.captures(text) {
            let month = match caps.get(1) {
                Some(name) => Some(month_from_name(name.as_str())?),
                None => None,
            };
            return Some(Self {
                month,
                day: caps[2].parse().ok()?,
                year: caps.get(3).and_then(|y| y.as_str().parse().ok()),
            });
        }

        // Fully specified segments ("2025-06-23", "June 23, 2025") carry their own year
        let date = normalize_date_in(text, 0).filter(|d| d.year() != 0)?;
        Some(Self {
            month: Some(date.month()),
            day: date.day(),
            year: Some(date.year()),
        })
    }
}

/// Parse a `"<Month> <Day> - [<Month>] <Day>[, <Year>]"` range.
///
/// The end segment inherits the start's month when it has none. A missing
/// year defaults to the current year. Each side fails independently.
pub fn parse_date_range(text: &str) -> (Option<NaiveDate>, Option<NaiveDate>) {
    parse_date_range_in(text, today().year())
}

/// [`parse_date_range`] with an explicit fallback year.
pub fn parse_date_range_in(text: &str, default_year: i32) -> (Option<NaiveDate>, Option<NaiveDate>) {
    let text = text.trim().replace(['\u{2013}', '\u{2014}'], "-");
    if text.is_empty() {
        return (None, None);
    }

    let parts: Vec<&str> = text.split(" - ").map(str::trim).collect();
    match parts.as_slice() {
        [single] => {
            let date = normalize_date_in(single, default_year);
            (date, date)
        }
        [start, end] => parse_segments(start, end, default_year),
        _ => {
            debug!(input = %text, "Date range has more than two segments");
            (None, None)
        }
    }
}

fn parse_segments(start: &str, end: &str, default_year: i32) -> (Option<NaiveDate>, Option<NaiveDate>) {
    let start_segment = RangeSegment::parse(start);
    let end_segment = RangeSegment::parse(end);

    let end_year = end_segment
        .and_then(|s| s.year)
        .or_else(|| YEAR_REGEX.captures(end).and_then(|c| c[1].parse().ok()))
        .unwrap_or(default_year);

    let start_month = start_segment.and_then(|s| s.month);
    let end_month = end_segment.and_then(|s| s.month).or(start_month);

    let end_date = end_segment.zip(end_month).and_then(|(segment, month)| {
        NaiveDate::from_ymd_opt(end_year, month, segment.day)
    });

    let start_date = start_segment.zip(start_month).and_then(|(segment, month)| {
        let year = segment.year.unwrap_or_else(|| match end_month {
            // "Dec 28 - Jan 3, 2025" starts in the previous year
            Some(end_month) if month > end_month => end_year - 1,
            _ => end_year,
        });
        NaiveDate::from_ymd_opt(year, month, segment.day)
    });

    if start_date.is_none() || end_date.is_none() {
        debug!(start = %start, end = %end, "Partially unparseable date range");
    }

    (start_date, end_date)
}

/// Parse a countdown such as `"5 days left"` into `today + 5`.
///
/// Anything else is treated as a date range and its end date is used.
pub fn parse_relative_deadline(text: &str) -> Option<NaiveDate> {
    parse_relative_deadline_on(text, today())
}

/// [`parse_relative_deadline`] relative to an explicit `today`.
pub fn parse_relative_deadline_on(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Some(caps) = DAYS_LEFT_REGEX.captures(text) {
        let days: i64 = caps[1].parse().ok()?;
        return Duration::try_days(days).and_then(|offset| today.checked_add_signed(offset));
    }

    parse_date_range_in(text, today.year()).1
}

/// First instant of the next UTC hour after `now`.
pub fn next_top_of_hour(now: DateTime<Utc>) -> DateTime<Utc> {
    let truncated = now
        .with_minute(0)
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(now);
    truncated + Duration::hours(1)
}
