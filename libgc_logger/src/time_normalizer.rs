use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use super::error::TimeError;

/// Formats carrying an explicit UTC offset
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S %z",
    "%m/%d/%y %H:%M:%S %z",
];

/// Formats commonly written by chromatograph software. Taken as UTC.
const DATETIME_FORMATS: &[&str] = &[
    "%m/%d/%y %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%y %H:%M",
    "%m/%d/%Y %H:%M",
    "%m/%d/%y %I:%M:%S %p",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%y %H:%M:%S",
    "%d-%b-%Y %H:%M:%S",
    "%d %b %Y %H:%M:%S",
    "%b %d %Y %H:%M:%S",
    "%b %d, %Y %H:%M:%S",
];

/// Date-only formats, taken as midnight UTC
const DATE_FORMATS: &[&str] = &["%m/%d/%y", "%m/%d/%Y", "%Y-%m-%d", "%Y/%m/%d", "%d.%m.%Y"];

/// Time-only formats, placed on the anchor date
const TIME_FORMATS: &[&str] = &["%H:%M:%S%.f", "%I:%M:%S %p", "%I:%M %p", "%H:%M"];

/// A time of day without a date lands on 1970-01-01. Only differences are used.
fn on_anchor_date(time: NaiveTime) -> DateTime<Utc> {
    NaiveDate::default().and_time(time).and_utc()
}

fn parse_with_format(value: &str, fmt: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_str(value, fmt) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
        return Some(dt.and_utc());
    }
    if let Some(dt) = NaiveDate::parse_from_str(value, fmt)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    {
        return Some(dt.and_utc());
    }
    NaiveTime::parse_from_str(value, fmt).ok().map(on_anchor_date)
}

fn parse_known_formats(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(value, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(dt.and_utc());
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, fmt) {
            return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
        }
    }
    for fmt in TIME_FORMATS {
        if let Ok(time) = NaiveTime::parse_from_str(value, fmt) {
            return Some(on_anchor_date(time));
        }
    }
    None
}

/// Parse a time field into an absolute UTC timestamp.
///
/// The layout's declared format is tried first, then a list of common formats. If the
/// whole field does not parse, contiguous runs of its whitespace separated tokens are
/// tried, longest first, so that text around the timestamp is skipped.
pub fn parse_timestamp(value: &str, hint: Option<&str>) -> Result<DateTime<Utc>, TimeError> {
    let trimmed = value.trim();
    if let Some(dt) = hint.and_then(|fmt| parse_with_format(trimmed, fmt)) {
        return Ok(dt);
    }
    if let Some(dt) = parse_known_formats(trimmed) {
        return Ok(dt);
    }

    let tokens: Vec<&str> = trimmed
        .split_whitespace()
        .map(|token| token.trim_matches(|c: char| c == ',' || c == ';' || c == '(' || c == ')'))
        .filter(|token| !token.is_empty())
        .collect();
    for width in (1..tokens.len()).rev() {
        for window in tokens.windows(width) {
            let candidate = window.join(" ");
            let parsed = hint
                .and_then(|fmt| parse_with_format(&candidate, fmt))
                .or_else(|| parse_known_formats(&candidate));
            if let Some(dt) = parsed {
                return Ok(dt);
            }
        }
    }

    Err(TimeError::Unparsable(trimmed.to_string()))
}

/// Converts absolute timestamps to seconds elapsed since the first one seen.
#[derive(Debug, Clone, Default)]
pub struct TimeNormalizer {
    reference: Option<DateTime<Utc>>,
    last: Option<DateTime<Utc>>,
    n_backwards: usize,
}

impl TimeNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Elapsed seconds of `timestamp` relative to the first normalized timestamp.
    ///
    /// The first call always returns exactly 0.0. Timestamps earlier than their
    /// predecessor are counted but accepted.
    pub fn normalize(&mut self, timestamp: DateTime<Utc>) -> f64 {
        if let Some(last) = self.last {
            if timestamp < last {
                self.n_backwards += 1;
            }
        }
        self.last = Some(timestamp);

        let reference = *self.reference.get_or_insert(timestamp);
        let delta = timestamp.signed_duration_since(reference);
        match delta.num_microseconds() {
            Some(us) => us as f64 / 1.0e6,
            None => delta.num_milliseconds() as f64 / 1.0e3,
        }
    }

    /// The timestamp of the first record
    pub fn reference(&self) -> Option<DateTime<Utc>> {
        self.reference
    }

    /// How many timestamps went backwards in time
    pub fn n_backwards(&self) -> usize {
        self.n_backwards
    }
}
