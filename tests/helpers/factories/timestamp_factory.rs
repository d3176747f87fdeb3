use chrono::{DateTime, TimeZone, Utc};

/// Factory for creating test instants with known dates
pub struct TimestampFactory;

impl TimestampFactory {
    /// Create an instant for a specific UTC date/time
    pub fn utc_datetime(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        min: u32,
        sec: u32,
    ) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, hour, min, sec)
            .single()
            .unwrap()
    }

    /// 2021-06-01T00:00:00Z, the anchor used across the test suite
    pub fn base() -> DateTime<Utc> {
        Self::utc_datetime(2021, 6, 1, 0, 0, 0)
    }

    /// `minutes` after the base instant
    pub fn minute(minutes: i64) -> DateTime<Utc> {
        Self::base() + chrono::Duration::minutes(minutes)
    }

    /// `seconds` after the base instant
    pub fn second(seconds: i64) -> DateTime<Utc> {
        Self::base() + chrono::Duration::seconds(seconds)
    }
}
