use std::num::NonZeroUsize;

use chrono::{DateTime, TimeDelta, Utc};

use crate::engine::errors::PipelineError;

/// Bounded processing window. The resampling grid is half-open `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, PipelineError> {
        if start >= end {
            return Err(PipelineError::InvalidWindow { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn span(&self) -> TimeDelta {
        self.end - self.start
    }

    /// Number of grid points `start + k * period` strictly before `end`.
    pub fn grid_len(&self, period: SamplingPeriod) -> usize {
        let span = nanos(self.span());
        let step = nanos(period.as_delta());
        span.div_ceil(step) as usize
    }
}

/// Fine resampling cadence; always strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplingPeriod(TimeDelta);

impl SamplingPeriod {
    pub fn new(period: TimeDelta) -> Result<Self, PipelineError> {
        if period <= TimeDelta::zero() {
            return Err(PipelineError::Config(format!(
                "sampling period must be positive, got {period}"
            )));
        }
        Ok(Self(period))
    }

    pub fn from_std(period: std::time::Duration) -> Result<Self, PipelineError> {
        let delta = TimeDelta::from_std(period)
            .map_err(|e| PipelineError::Config(format!("sampling period out of range: {e}")))?;
        Self::new(delta)
    }

    pub fn as_delta(&self) -> TimeDelta {
        self.0
    }
}

/// Number of consecutive fine rows collapsed into one output row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregationFactor(NonZeroUsize);

impl AggregationFactor {
    pub fn new(factor: usize) -> Result<Self, PipelineError> {
        NonZeroUsize::new(factor).map(Self).ok_or_else(|| {
            PipelineError::Config("aggregation factor must be a positive integer".into())
        })
    }

    pub fn get(&self) -> usize {
        self.0.get()
    }
}

fn nanos(delta: TimeDelta) -> u128 {
    let secs = delta.num_seconds() as i128;
    let sub = delta.subsec_nanos() as i128;
    (secs * 1_000_000_000 + sub).max(0) as u128
}
