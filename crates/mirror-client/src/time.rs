//! Parsing of line dates sent by remotes.

use chrono::{DateTime, NaiveDateTime};

/// Formats accepted for dates without offset, interpreted as UTC.
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse a date into `(seconds, microseconds)` since the Unix epoch.
///
/// Accepts RFC 3339 (`2024-01-02T03:04:05.123456Z`), ISO 8601 without offset
/// (`T` or space separator, optional fraction, taken as UTC) and epoch
/// seconds with an optional fraction (`1704164645.5`).
pub fn parse_date(text: &str) -> Option<(i64, u32)> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some((dt.timestamp(), dt.timestamp_subsec_micros()));
    }

    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            let dt = dt.and_utc();
            return Some((dt.timestamp(), dt.timestamp_subsec_micros()));
        }
    }

    parse_epoch(text)
}

fn parse_epoch(text: &str) -> Option<(i64, u32)> {
    let (secs, frac) = match text.split_once('.') {
        Some((secs, frac)) => (secs, frac),
        None => (text, ""),
    };
    if secs.is_empty() || !secs.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if !frac.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let secs: i64 = secs.parse().ok()?;
    let usec = frac
        .bytes()
        .chain(std::iter::repeat(b'0'))
        .take(6)
        .fold(0u32, |acc, digit| acc * 10 + u32::from(digit - b'0'));
    Some((secs, usec))
}
