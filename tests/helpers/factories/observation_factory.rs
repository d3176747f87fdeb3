use crate::engine::types::Observation;
use crate::test_helpers::factories::TimestampFactory;
use chrono::{DateTime, Utc};

/// Builds an observation series. Points are kept in insertion order so tests
/// can also produce unsorted input.
pub struct ObservationFactory {
    points: Vec<Observation>,
}

impl ObservationFactory {
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    pub fn with_point(mut self, timestamp: DateTime<Utc>, value: f64) -> Self {
        self.points.push(Observation::new(timestamp, value));
        self
    }

    /// Point `minutes` after [`TimestampFactory::base`].
    pub fn at_minute(self, minutes: i64, value: f64) -> Self {
        self.with_point(TimestampFactory::minute(minutes), value)
    }

    /// Point `seconds` after [`TimestampFactory::base`].
    pub fn at_second(self, seconds: i64, value: f64) -> Self {
        self.with_point(TimestampFactory::second(seconds), value)
    }

    /// A linear ramp: one point every `step_minutes`, value = `slope * minute`.
    pub fn ramp(mut self, count: usize, step_minutes: i64, slope: f64) -> Self {
        for i in 0..count as i64 {
            let minute = i * step_minutes;
            self = self.at_minute(minute, slope * minute as f64);
        }
        self
    }

    pub fn create(self) -> Vec<Observation> {
        self.points
    }
}
