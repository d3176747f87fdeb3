use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::shared::time::TimeParser;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub pipeline: PipelineConfig,
    pub source: SourceConfig,
    pub sink: SinkConfig,
    #[serde(default)]
    pub time: TimeConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub replay: ReplayConfig,
    #[serde(default)]
    pub row_sum: RowSumConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Ordered sensor ids; order decides output column order.
    #[serde(default)]
    pub sensor_ids: Vec<String>,
    /// One id per line, appended after `sensor_ids`.
    pub sensors_file: Option<PathBuf>,
    /// Window bounds (ISO-8601). Usually supplied on the command line.
    pub start: Option<String>,
    pub end: Option<String>,
    /// Fine resampling cadence. Defaults to `report_period / aggregation_factor`.
    #[serde(default, with = "humantime_serde")]
    pub fine_period: Option<Duration>,
    #[serde(default = "default_report_period", with = "humantime_serde")]
    pub report_period: Duration,
    #[serde(default = "default_aggregation_factor")]
    pub aggregation_factor: usize,
    /// Sensors fetched concurrently (1 = strictly sequential)
    #[serde(default = "default_fetch_concurrency")]
    pub fetch_concurrency: usize,
}

fn default_report_period() -> Duration {
    Duration::from_secs(300)
}

fn default_aggregation_factor() -> usize {
    5
}

fn default_fetch_concurrency() -> usize {
    1
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Sqlite,
    Delimited,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MalformedRowPolicy {
    /// Any unparsable row aborts the sensor with `MalformedSeries`
    #[default]
    Strict,
    /// Unparsable rows are skipped with a warning
    Lenient,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    pub kind: SourceKind,
    pub path: PathBuf,
    #[serde(default = "default_observations_table")]
    pub table: String,
    /// When set, sensor ids are resolved by name through this catalog table.
    pub catalog_table: Option<String>,
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
    #[serde(default)]
    pub has_headers: bool,
    #[serde(default)]
    pub malformed_rows: MalformedRowPolicy,
}

fn default_observations_table() -> String {
    "dynamic_data".to_string()
}

fn default_delimiter() -> String {
    ";".to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkKind {
    Csv,
    Sqlite,
    Columnar,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SinkConfig {
    pub kind: SinkKind,
    /// CSV file, SQLite database file, or columnar store root directory
    pub path: PathBuf,
    #[serde(default = "default_table_name")]
    pub table: String,
    /// Extra write attempts after a failed sink write
    #[serde(default)]
    pub retries: u32,
}

fn default_table_name() -> String {
    "slices".to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TimeConfig {
    /// Zone of naive timestamps stored at the source (None = UTC)
    pub source_timezone: Option<String>,
}

impl TimeConfig {
    pub fn parser(&self) -> Result<TimeParser, String> {
        match &self.source_timezone {
            None => Ok(TimeParser::utc()),
            Some(name) => name
                .parse::<chrono_tz::Tz>()
                .map(TimeParser::new)
                .map_err(|e| format!("unknown source_timezone '{name}': {e}")),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub log_dir: String,
    pub stdout_level: String,
    pub file_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: "logs".to_string(),
            stdout_level: "info".to_string(),
            file_level: "debug".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReplayConfig {
    /// Columnar store root holding both tables
    #[serde(default = "default_columnar_root")]
    pub root: PathBuf,
    #[serde(default = "default_table_name")]
    pub source_table: String,
    #[serde(default = "default_replay_table")]
    pub target_table: String,
    #[serde(default = "default_tick", with = "humantime_serde")]
    pub interval: Duration,
    /// Restart from the first row after the last one
    #[serde(default = "default_true")]
    pub repeat: bool,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            root: default_columnar_root(),
            source_table: default_table_name(),
            target_table: default_replay_table(),
            interval: default_tick(),
            repeat: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RowSumConfig {
    #[serde(default = "default_columnar_root")]
    pub root: PathBuf,
    #[serde(default = "default_replay_table")]
    pub source_table: String,
    #[serde(default = "default_sum_table")]
    pub target_table: String,
    #[serde(default = "default_tick", with = "humantime_serde")]
    pub interval: Duration,
}

impl Default for RowSumConfig {
    fn default() -> Self {
        Self {
            root: default_columnar_root(),
            source_table: default_replay_table(),
            target_table: default_sum_table(),
            interval: default_tick(),
        }
    }
}

fn default_columnar_root() -> PathBuf {
    PathBuf::from("data/columnar")
}

fn default_replay_table() -> String {
    "slices_play".to_string()
}

fn default_sum_table() -> String {
    "sum_row".to_string()
}

fn default_tick() -> Duration {
    Duration::from_secs(5)
}

fn default_true() -> bool {
    true
}

/// Loads settings from the TOML file named by `path`, `SLICER_CONFIG`, or
/// `config` (in that order), then applies `SLICER__SECTION__KEY` environment
/// variables and finally the explicit `overrides`.
pub fn load_settings(
    path: Option<&str>,
    overrides: &[(&str, String)],
) -> Result<Settings, config::ConfigError> {
    let config_path = path
        .map(str::to_string)
        .or_else(|| env::var("SLICER_CONFIG").ok())
        .unwrap_or_else(|| "config".to_string());

    let mut builder = config::Config::builder()
        .add_source(config::File::with_name(&config_path))
        .add_source(
            config::Environment::with_prefix("SLICER")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("pipeline.sensor_ids"),
        );
    for (key, value) in overrides {
        builder = builder.set_override(*key, value.as_str())?;
    }

    builder.build()?.try_deserialize()
}
