use std::collections::HashSet;
use std::num::NonZeroUsize;
use std::path::Path;

use crate::engine::errors::PipelineError;
use crate::engine::types::{
    AggregationFactor, SamplingPeriod, SensorId, TIMESTAMP_COLUMN, TimeWindow,
};
use crate::shared::config::Settings;

/// Validated parameters of one run. Built once, before any I/O.
#[derive(Debug, Clone)]
pub struct PipelineSpec {
    sensors: Vec<SensorId>,
    window: TimeWindow,
    period: SamplingPeriod,
    factor: AggregationFactor,
    fetch_concurrency: NonZeroUsize,
    table_name: String,
}

impl PipelineSpec {
    pub fn new(
        sensors: Vec<SensorId>,
        window: TimeWindow,
        period: SamplingPeriod,
        factor: AggregationFactor,
    ) -> Result<Self, PipelineError> {
        validate_sensors(&sensors)?;
        Ok(Self {
            sensors,
            window,
            period,
            factor,
            fetch_concurrency: NonZeroUsize::MIN,
            table_name: "slices".to_string(),
        })
    }

    pub fn with_fetch_concurrency(mut self, n: usize) -> Result<Self, PipelineError> {
        self.fetch_concurrency = NonZeroUsize::new(n).ok_or_else(|| {
            PipelineError::Config("fetch_concurrency must be at least 1".into())
        })?;
        Ok(self)
    }

    pub fn with_table_name(mut self, name: impl Into<String>) -> Self {
        self.table_name = name.into();
        self
    }

    /// Resolves settings into a `PipelineSpec`.
    ///
    /// Window bounds are parsed in the source time zone when they carry no
    /// offset. The fine period defaults to `report_period / aggregation_factor`.
    /// Ids from `sensors_file` are appended after `sensor_ids`.
    pub fn from_settings(settings: &Settings) -> Result<Self, PipelineError> {
        let cfg = &settings.pipeline;
        let parser = settings.time.parser().map_err(PipelineError::Config)?;

        let parse_bound = |name: &str, raw: &Option<String>| {
            let raw = raw
                .as_deref()
                .ok_or_else(|| PipelineError::Config(format!("window {name} is required")))?;
            parser
                .parse(raw)
                .ok_or_else(|| PipelineError::Config(format!("invalid window {name}: {raw:?}")))
        };
        let window = TimeWindow::new(
            parse_bound("start", &cfg.start)?,
            parse_bound("end", &cfg.end)?,
        )?;

        let factor = AggregationFactor::new(cfg.aggregation_factor)?;
        let fine = match cfg.fine_period {
            Some(p) => p,
            None => u32::try_from(factor.get())
                .ok()
                .and_then(|n| cfg.report_period.checked_div(n))
                .ok_or_else(|| {
                    PipelineError::Config(format!(
                        "aggregation factor {} is too large to derive a fine period",
                        factor.get()
                    ))
                })?,
        };
        let period = SamplingPeriod::from_std(fine)?;

        let mut sensors: Vec<SensorId> = cfg.sensor_ids.iter().cloned().map(SensorId::from).collect();
        if let Some(path) = &cfg.sensors_file {
            sensors.extend(read_sensors_file(path)?.into_iter().map(SensorId::from));
        }

        Self::new(sensors, window, period, factor)?
            .with_fetch_concurrency(cfg.fetch_concurrency)
            .map(|spec| spec.with_table_name(settings.sink.table.clone()))
    }

    pub fn sensors(&self) -> &[SensorId] {
        &self.sensors
    }

    pub fn window(&self) -> TimeWindow {
        self.window
    }

    pub fn period(&self) -> SamplingPeriod {
        self.period
    }

    pub fn factor(&self) -> AggregationFactor {
        self.factor
    }

    pub fn fetch_concurrency(&self) -> usize {
        self.fetch_concurrency.get()
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }
}

fn validate_sensors(sensors: &[SensorId]) -> Result<(), PipelineError> {
    if sensors.is_empty() {
        return Err(PipelineError::Config("no sensor ids configured".into()));
    }
    let mut seen = HashSet::with_capacity(sensors.len());
    for sensor in sensors {
        if sensor.as_str().is_empty() {
            return Err(PipelineError::Config("empty sensor id".into()));
        }
        if sensor.as_str() == TIMESTAMP_COLUMN {
            return Err(PipelineError::Config(format!(
                "sensor id '{TIMESTAMP_COLUMN}' is reserved"
            )));
        }
        if !seen.insert(sensor) {
            return Err(PipelineError::Config(format!("duplicate sensor id '{sensor}'")));
        }
    }
    Ok(())
}

/// One id per line, taken from the first `,` or `;` separated field.
/// Blank lines are skipped.
pub fn read_sensors_file(path: &Path) -> Result<Vec<String>, PipelineError> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        PipelineError::Config(format!("cannot read sensors file {}: {e}", path.display()))
    })?;
    Ok(text
        .lines()
        .filter_map(|line| line.split([',', ';']).next())
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect())
}
