use chrono::{DateTime, LocalResult, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use chrono_tz::Tz;

/// Naive layouts accepted from row stores and delimited exports, tried in order.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Normalizes time inputs to UTC instants.
///
/// Zoned inputs (RFC 3339 / ISO-8601 with an offset) are converted directly.
/// Naive inputs carry no zone on disk, so they are interpreted in the
/// configured source zone before conversion. Nothing downstream of the
/// parser ever sees a naive value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeParser {
    zone: Tz,
}

impl Default for TimeParser {
    fn default() -> Self {
        Self::utc()
    }
}

impl TimeParser {
    pub fn new(zone: Tz) -> Self {
        Self { zone }
    }

    pub fn utc() -> Self {
        Self { zone: Tz::UTC }
    }

    pub fn zone(&self) -> Tz {
        self.zone
    }

    /// Parse a string representing a time instant into a UTC instant.
    /// Supports RFC3339, naive date-times in the source zone, date-only
    /// (midnight in the source zone) and integer epochs.
    pub fn parse(&self, input: &str) -> Option<DateTime<Utc>> {
        let s = input.trim();
        if s.is_empty() {
            return None;
        }
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(dt.with_timezone(&Utc));
        }
        for fmt in NAIVE_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
                return self.localize(naive);
            }
        }
        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return self.localize(date.and_hms_opt(0, 0, 0)?);
        }
        if let Ok(num) = s.parse::<i128>() {
            return normalize_integer_epoch(num);
        }
        None
    }

    /// Interpret a wall-clock reading in the source zone.
    /// Ambiguous readings (DST fall-back) resolve to the earlier instant;
    /// readings inside a DST gap do not exist and yield `None`.
    pub fn localize(&self, naive: NaiveDateTime) -> Option<DateTime<Utc>> {
        match self.zone.from_local_datetime(&naive) {
            LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
            LocalResult::Ambiguous(earliest, _) => Some(earliest.with_timezone(&Utc)),
            LocalResult::None => None,
        }
    }
}

/// Canonical textual form written by every sink. Fractional digits are
/// emitted only as far as needed (milli, micro or nano), so nothing is lost.
pub fn format_utc(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Heuristic normalization of integer magnitudes.
/// - up to 11 digits: seconds
/// - 12..=14: milliseconds
/// - 15..=16: microseconds
/// - 17..=19: nanoseconds
fn normalize_integer_epoch(n: i128) -> Option<DateTime<Utc>> {
    let digits = num_digits_u128(n.unsigned_abs());
    let n = i64::try_from(n).ok()?;
    match digits {
        0..=11 => DateTime::from_timestamp(n, 0),
        12..=14 => DateTime::from_timestamp_millis(n),
        15..=16 => DateTime::from_timestamp_micros(n),
        17..=19 => Some(DateTime::from_timestamp_nanos(n)),
        _ => None,
    }
}

fn num_digits_u128(mut x: u128) -> u32 {
    if x == 0 {
        return 1;
    }
    let mut c = 0;
    while x > 0 {
        x /= 10;
        c += 1;
    }
    c
}
