//! Timestamp parsing for spreadsheet and snapshot cells.
//!
//! Text timestamps are tried ISO-first, then day-first (`DD/MM/YYYY`), which
//! is how the programming sheets are filled in. Date-only values resolve to
//! midnight.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use std::sync::LazyLock;

/// Second-precision rendering for report stamps.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Cell timestamps keep sub-second precision; the fraction is only emitted
/// when non-zero.
pub const CELL_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Canonical rendering for calendar dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

const DATETIME_FORMATS: &[&str] = &[
    // ISO
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    // Day-first
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d-%m-%Y %H:%M:%S",
    "%d-%m-%Y %H:%M",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y"];

/// Collapses runs of whitespace so `03/05/2024  07:00` still parses.
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Parse a text timestamp. Returns `None` when no known layout matches.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let text = WHITESPACE.replace_all(trimmed, " ");

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(&text, format) {
            return Some(dt);
        }
    }

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(&text, format).ok())
        .map(|date| date.and_time(NaiveTime::MIN))
}

/// Render a timestamp in the canonical snapshot layout.
pub fn format_timestamp(dt: &NaiveDateTime) -> String {
    dt.format(CELL_TIMESTAMP_FORMAT).to_string()
}

/// Parse a calendar date as entered by a user (ISO or day-first).
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let text = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
}
