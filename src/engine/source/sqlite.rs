use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use tracing::{debug, warn};

use super::SeriesSource;
use crate::engine::errors::SourceError;
use crate::engine::types::{Observation, SensorId, TimeWindow};
use crate::shared::config::MalformedRowPolicy;
use crate::shared::time::TimeParser;

const BIND_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Widening of the SQL prefilter. `julianday` reads naive text as UTC but
/// converts zoned text, so naive rows stored in the source zone can sit up to
/// one zone offset (at most 14h) away from the UTC bounds.
const PREFILTER_SLACK: TimeDelta = TimeDelta::days(1);

/// Reads observations from a row table `(id, t, val)`, optionally resolving
/// sensor names through a catalog table `(id, name)`.
///
/// SQL only narrows the scan to a widened range. Every row's timestamp is then
/// parsed with the source [`TimeParser`], so naive and zoned text compare as
/// UTC instants, and the closed window is applied to those instants.
pub struct SqliteSource {
    pool: SqlitePool,
    query: String,
    label: String,
    policy: MalformedRowPolicy,
    parser: TimeParser,
}

impl SqliteSource {
    pub async fn connect(
        path: &Path,
        table: &str,
        catalog: Option<&str>,
        policy: MalformedRowPolicy,
        parser: TimeParser,
    ) -> Result<Self, SourceError> {
        let opts = SqliteConnectOptions::new()
            .filename(path)
            .read_only(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(opts)
            .await?;

        debug!(
            target: "sensor_slicer::source",
            path = %path.display(),
            table,
            catalog = ?catalog,
            "Opened SQLite source"
        );

        Ok(Self {
            pool,
            query: observation_query(table, catalog),
            label: format!("sqlite({}:{})", path.display(), table),
            policy,
            parser,
        })
    }

}

fn bind_bound(instant: Option<DateTime<Utc>>, fallback: &str) -> String {
    instant.map_or_else(|| fallback.to_string(), |t| t.naive_utc().format(BIND_FORMAT).to_string())
}

/// Builds the prefilter query. Rows come back in storage order; the caller
/// sorts on parsed instants.
pub fn observation_query(table: &str, catalog: Option<&str>) -> String {
    let table = quote_ident(table);
    match catalog {
        None => format!(
            "SELECT CAST(t AS TEXT) AS t, CAST(val AS REAL) AS val FROM {table} \
             WHERE id = ?1 AND julianday(t) BETWEEN julianday(?2) AND julianday(?3) \
             ORDER BY rowid"
        ),
        Some(catalog) => {
            let catalog = quote_ident(catalog);
            format!(
                "SELECT CAST(o.t AS TEXT) AS t, CAST(o.val AS REAL) AS val FROM {table} AS o \
                 JOIN {catalog} AS c ON o.id = c.id \
                 WHERE c.name = ?1 AND julianday(o.t) BETWEEN julianday(?2) AND julianday(?3) \
                 ORDER BY o.rowid"
            )
        }
    }
}

/// Double-quotes an SQLite identifier.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[async_trait]
impl SeriesSource for SqliteSource {
    async fn fetch(
        &self,
        sensor: &SensorId,
        window: &TimeWindow,
    ) -> Result<Vec<Observation>, SourceError> {
        let lower = window.start().checked_sub_signed(PREFILTER_SLACK);
        let upper = window.end().checked_add_signed(PREFILTER_SLACK);
        let rows = sqlx::query(&self.query)
            .bind(sensor.as_str())
            .bind(bind_bound(lower, "0000-01-01 00:00:00"))
            .bind(bind_bound(upper, "9999-12-31 23:59:59"))
            .fetch_all(&self.pool)
            .await?;

        let mut observations = Vec::with_capacity(rows.len());
        for (idx, row) in rows.iter().enumerate() {
            let raw_t: Option<String> = row.try_get("t")?;
            let value: Option<f64> = row.try_get("val")?;

            let timestamp = raw_t.as_deref().and_then(|t| self.parser.parse(t));
            if timestamp.is_some_and(|t| t < window.start() || t > window.end()) {
                continue;
            }
            match timestamp.zip(value) {
                Some((timestamp, value)) => observations.push(Observation::new(timestamp, value)),
                None => {
                    let reason = format!("row {idx}: unreadable t={raw_t:?} val={value:?}");
                    match self.policy {
                        MalformedRowPolicy::Strict => return Err(SourceError::Malformed(reason)),
                        MalformedRowPolicy::Lenient => {
                            warn!(target: "sensor_slicer::source", sensor = %sensor, "Skipping {}", reason);
                        }
                    }
                }
            }
        }
        // Stable: equal instants keep storage order.
        observations.sort_by_key(|o| o.timestamp);

        debug!(
            target: "sensor_slicer::source",
            sensor = %sensor,
            rows = observations.len(),
            "Fetched observations"
        );
        Ok(observations)
    }

    fn describe(&self) -> String {
        self.label.clone()
    }
}
