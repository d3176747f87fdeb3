use std::collections::HashMap;

use async_trait::async_trait;

use super::SeriesSource;
use crate::engine::errors::SourceError;
use crate::engine::types::{Observation, SensorId, TimeWindow};

/// Holds series in memory. Observations are returned in insertion order,
/// so callers can feed deliberately unsorted data.
#[derive(Debug, Default, Clone)]
pub struct MemorySource {
    series: HashMap<SensorId, Vec<Observation>>,
    failing: Vec<SensorId>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_series(mut self, sensor: impl Into<SensorId>, observations: Vec<Observation>) -> Self {
        self.series.insert(sensor.into(), observations);
        self
    }

    /// Every fetch for `sensor` fails as if the backing store were offline.
    pub fn with_failure(mut self, sensor: impl Into<SensorId>) -> Self {
        self.failing.push(sensor.into());
        self
    }
}

#[async_trait]
impl SeriesSource for MemorySource {
    async fn fetch(
        &self,
        sensor: &SensorId,
        window: &TimeWindow,
    ) -> Result<Vec<Observation>, SourceError> {
        if self.failing.contains(sensor) {
            return Err(SourceError::Io(std::io::Error::new(
                std::io::ErrorKind::NotConnected,
                format!("series for {sensor} is unavailable"),
            )));
        }
        Ok(self
            .series
            .get(sensor)
            .map(|obs| {
                obs.iter()
                    .filter(|o| o.timestamp >= window.start() && o.timestamp <= window.end())
                    .copied()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn describe(&self) -> String {
        format!("memory({} series)", self.series.len())
    }
}
