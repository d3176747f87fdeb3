use chrono::{DateTime, Utc};
use tracing::trace;

use super::interpolate::estimate;
use crate::engine::errors::PipelineError;
use crate::engine::types::{Column, Observation, SamplingPeriod, SensorId, TimeWindow};

/// Produces one fixed-cadence column per sensor over a shared grid.
///
/// The grid depends only on the window and period, so every column built by
/// the same `Resampler` lines up with every other.
#[derive(Debug, Clone)]
pub struct Resampler {
    window: TimeWindow,
    period: SamplingPeriod,
    grid: Vec<DateTime<Utc>>,
}

impl Resampler {
    pub fn new(window: TimeWindow, period: SamplingPeriod) -> Self {
        let mut grid = Vec::with_capacity(window.grid_len(period));
        let mut t = window.start();
        while t < window.end() {
            grid.push(t);
            match t.checked_add_signed(period.as_delta()) {
                Some(next) => t = next,
                None => break,
            }
        }
        Self {
            window,
            period,
            grid,
        }
    }

    pub fn window(&self) -> TimeWindow {
        self.window
    }

    pub fn period(&self) -> SamplingPeriod {
        self.period
    }

    /// Query timestamps `start + k * period` strictly before `end`.
    pub fn grid(&self) -> &[DateTime<Utc>] {
        &self.grid
    }

    /// Stand-in series for a sensor with no observations in the window:
    /// a flat zero line across the whole window.
    pub fn boundary_pair(&self) -> Vec<Observation> {
        vec![
            Observation::new(self.window.start(), 0.0),
            Observation::new(self.window.end(), 0.0),
        ]
    }

    pub fn resample(
        &self,
        sensor: &SensorId,
        observations: &[Observation],
    ) -> Result<Column, PipelineError> {
        validate(observations).map_err(|reason| PipelineError::MalformedSeries {
            sensor: sensor.clone(),
            reason,
        })?;

        let values = self
            .grid
            .iter()
            .map(|&at| estimate(observations, at))
            .collect::<Option<Vec<f64>>>()
            .ok_or_else(|| PipelineError::MalformedSeries {
                sensor: sensor.clone(),
                reason: "no observations to interpolate".into(),
            })?;

        trace!(
            target: "sensor_slicer::resample",
            sensor = %sensor,
            observations = observations.len(),
            points = values.len(),
            "Resampled series"
        );

        Ok(Column {
            timestamps: self.grid.clone(),
            values,
        })
    }
}

/// Checks that timestamps never decrease and every value is finite.
pub fn validate(observations: &[Observation]) -> Result<(), String> {
    if let Some(bad) = observations.iter().find(|o| !o.value.is_finite()) {
        return Err(format!(
            "non-finite value {} at {}",
            bad.value, bad.timestamp
        ));
    }
    if let Some(pair) = observations
        .windows(2)
        .find(|w| w[1].timestamp < w[0].timestamp)
    {
        return Err(format!(
            "timestamps out of order: {} follows {}",
            pair[1].timestamp, pair[0].timestamp
        ));
    }
    Ok(())
}
