use std::path::PathBuf;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::SeriesSource;
use crate::engine::errors::SourceError;
use crate::engine::types::{Observation, SensorId, TimeWindow};
use crate::shared::config::MalformedRowPolicy;
use crate::shared::time::TimeParser;

/// Long-format export with one observation per line:
/// `id;value;timestamp[;status]`. Extra trailing fields are ignored.
///
/// The file is scanned once per fetch on the blocking pool.
#[derive(Debug, Clone)]
pub struct DelimitedSource {
    path: PathBuf,
    delimiter: u8,
    has_headers: bool,
    policy: MalformedRowPolicy,
    parser: TimeParser,
}

impl DelimitedSource {
    pub fn new(
        path: PathBuf,
        delimiter: u8,
        has_headers: bool,
        policy: MalformedRowPolicy,
        parser: TimeParser,
    ) -> Self {
        Self {
            path,
            delimiter,
            has_headers,
            policy,
            parser,
        }
    }

    fn scan(&self, sensor: &SensorId, window: &TimeWindow) -> Result<Vec<Observation>, SourceError> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(self.has_headers)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(&self.path)?;

        let mut observations = Vec::new();
        let mut skipped = 0usize;
        for (idx, record) in reader.records().enumerate() {
            let line = idx + 1 + usize::from(self.has_headers);
            let parsed = match record {
                Ok(record) => {
                    if record.get(0) != Some(sensor.as_str()) {
                        continue;
                    }
                    self.parse_fields(&record)
                        .map_err(|reason| format!("line {line}: {reason}"))
                }
                Err(e) => Err(format!("line {line}: {e}")),
            };

            match parsed {
                Ok(obs) => {
                    if obs.timestamp >= window.start() && obs.timestamp <= window.end() {
                        observations.push(obs);
                    }
                }
                Err(reason) => match self.policy {
                    MalformedRowPolicy::Strict => return Err(SourceError::Malformed(reason)),
                    MalformedRowPolicy::Lenient => {
                        skipped += 1;
                        warn!(target: "sensor_slicer::source", sensor = %sensor, "Skipping {}", reason);
                    }
                },
            }
        }

        // Stable: rows sharing a timestamp keep file order.
        observations.sort_by_key(|o| o.timestamp);

        debug!(
            target: "sensor_slicer::source",
            sensor = %sensor,
            rows = observations.len(),
            skipped,
            "Scanned delimited file"
        );
        Ok(observations)
    }

    fn parse_fields(&self, record: &csv::StringRecord) -> Result<Observation, String> {
        let value = record.get(1).ok_or("missing value field")?;
        let timestamp = record.get(2).ok_or("missing timestamp field")?;

        let value: f64 = value
            .parse()
            .map_err(|_| format!("invalid value {value:?}"))?;
        let timestamp = self
            .parser
            .parse(timestamp)
            .ok_or_else(|| format!("invalid timestamp {timestamp:?}"))?;
        Ok(Observation::new(timestamp, value))
    }
}

#[async_trait]
impl SeriesSource for DelimitedSource {
    async fn fetch(
        &self,
        sensor: &SensorId,
        window: &TimeWindow,
    ) -> Result<Vec<Observation>, SourceError> {
        let this = self.clone();
        let sensor = sensor.clone();
        let window = *window;
        tokio::task::spawn_blocking(move || this.scan(&sensor, &window))
            .await
            .map_err(|e| SourceError::Io(std::io::Error::other(e)))?
    }

    fn describe(&self) -> String {
        format!("delimited({})", self.path.display())
    }
}
