use crate::engine::types::{SensorId, TableSchema, WideTable};
use crate::test_helpers::factories::TimestampFactory;
use chrono::{DateTime, TimeDelta, Utc};

/// Builds a [`WideTable`] on a regular grid. Every column must have the
/// same length; the row count is taken from the first column.
pub struct WideTableFactory {
    start: DateTime<Utc>,
    period: TimeDelta,
    columns: Vec<(String, Vec<f64>)>,
}

impl WideTableFactory {
    pub fn new() -> Self {
        Self {
            start: TimestampFactory::base(),
            period: TimeDelta::minutes(1),
            columns: Vec::new(),
        }
    }

    pub fn with_start(mut self, start: DateTime<Utc>) -> Self {
        self.start = start;
        self
    }

    pub fn with_period(mut self, period: TimeDelta) -> Self {
        self.period = period;
        self
    }

    pub fn with_column(mut self, name: &str, values: Vec<f64>) -> Self {
        self.columns.push((name.to_string(), values));
        self
    }

    pub fn create(self) -> WideTable {
        let rows = self.columns.first().map(|(_, v)| v.len()).unwrap_or(0);
        let timestamps = (0..rows as i32)
            .map(|i| self.start + self.period * i)
            .collect();
        let ids: Vec<SensorId> = self
            .columns
            .iter()
            .map(|(name, _)| SensorId::new(name.clone()))
            .collect();
        let schema = TableSchema::for_sensors(&ids);
        let values = self.columns.into_iter().map(|(_, v)| v).collect();
        WideTable::from_parts(schema, timestamps, values).unwrap()
    }
}
