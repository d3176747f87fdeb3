use std::io::Write;
use std::time::Duration;

use chrono::TimeDelta;
use tempfile::NamedTempFile;

use super::spec::{PipelineSpec, read_sensors_file};
use crate::engine::errors::PipelineError;
use crate::engine::types::{AggregationFactor, SamplingPeriod, SensorId, TimeWindow};
use crate::shared::config::{
    LoggingConfig, MalformedRowPolicy, PipelineConfig, ReplayConfig, RowSumConfig, Settings,
    SinkConfig, SinkKind, SourceConfig, SourceKind, TimeConfig,
};
use crate::test_helpers::factories::TimestampFactory;

fn settings(start: &str, end: &str) -> Settings {
    Settings {
        pipeline: PipelineConfig {
            sensor_ids: vec!["a".into(), "b".into()],
            sensors_file: None,
            start: Some(start.into()),
            end: Some(end.into()),
            fine_period: None,
            report_period: Duration::from_secs(300),
            aggregation_factor: 5,
            fetch_concurrency: 1,
        },
        source: SourceConfig {
            kind: SourceKind::Sqlite,
            path: "data.sqlite".into(),
            table: "dynamic_data".into(),
            catalog_table: None,
            delimiter: ";".into(),
            has_headers: false,
            malformed_rows: MalformedRowPolicy::Strict,
        },
        sink: SinkConfig {
            kind: SinkKind::Csv,
            path: "slices.csv".into(),
            table: "slices".into(),
            retries: 0,
        },
        time: TimeConfig::default(),
        logging: LoggingConfig::default(),
        replay: ReplayConfig::default(),
        row_sum: RowSumConfig::default(),
    }
}

fn ids(names: &[&str]) -> Vec<SensorId> {
    names.iter().map(|s| SensorId::from(*s)).collect()
}

fn build(sensors: Vec<SensorId>) -> Result<PipelineSpec, PipelineError> {
    PipelineSpec::new(
        sensors,
        TimeWindow::new(TimestampFactory::minute(0), TimestampFactory::minute(10)).unwrap(),
        SamplingPeriod::new(TimeDelta::minutes(1)).unwrap(),
        AggregationFactor::new(5).unwrap(),
    )
}

#[test]
fn fine_period_defaults_to_report_period_over_factor() {
    let spec =
        PipelineSpec::from_settings(&settings("2021-06-01 00:00:00", "2021-06-01 01:00:00"))
            .unwrap();
    assert_eq!(spec.period().as_delta(), TimeDelta::minutes(1));
    assert_eq!(spec.factor().get(), 5);
    assert_eq!(spec.window().start(), TimestampFactory::base());
    assert_eq!(spec.table_name(), "slices");
    assert_eq!(spec.sensors(), ids(&["a", "b"]).as_slice());
}

#[test]
fn explicit_fine_period_wins() {
    let mut s = settings("2021-06-01T00:00:00Z", "2021-06-01T01:00:00Z");
    s.pipeline.fine_period = Some(Duration::from_secs(15));
    let spec = PipelineSpec::from_settings(&s).unwrap();
    assert_eq!(spec.period().as_delta(), TimeDelta::seconds(15));
}

#[test]
fn naive_window_uses_source_zone() {
    let mut s = settings("2021-06-01 03:00:00", "2021-06-01 04:00:00");
    s.time.source_timezone = Some("Europe/Moscow".into());
    let spec = PipelineSpec::from_settings(&s).unwrap();
    assert_eq!(spec.window().start(), TimestampFactory::base());
}

#[test]
fn inverted_window_is_rejected() {
    let err = PipelineSpec::from_settings(&settings("2021-06-01 01:00", "2021-06-01 00:00"))
        .unwrap_err();
    assert!(matches!(err, PipelineError::InvalidWindow { .. }));
}

#[test]
fn missing_or_garbled_bounds_are_config_errors() {
    let mut s = settings("2021-06-01 00:00", "2021-06-01 01:00");
    s.pipeline.end = None;
    assert!(matches!(
        PipelineSpec::from_settings(&s),
        Err(PipelineError::Config(_))
    ));

    let s = settings("yesterday", "2021-06-01 01:00");
    assert!(matches!(
        PipelineSpec::from_settings(&s),
        Err(PipelineError::Config(_))
    ));
}

#[test]
fn zero_factor_and_concurrency_are_rejected() {
    let mut s = settings("2021-06-01 00:00", "2021-06-01 01:00");
    s.pipeline.aggregation_factor = 0;
    assert!(PipelineSpec::from_settings(&s).is_err());

    let mut s = settings("2021-06-01 00:00", "2021-06-01 01:00");
    s.pipeline.fetch_concurrency = 0;
    assert!(PipelineSpec::from_settings(&s).is_err());
}

#[test]
fn oversized_factor_is_a_config_error() {
    let mut s = settings("2021-06-01 00:00", "2021-06-01 01:00");
    s.pipeline.aggregation_factor = 1usize << 32;
    assert!(matches!(
        PipelineSpec::from_settings(&s),
        Err(PipelineError::Config(_))
    ));

    // Tiny quotient rounds to a zero period, which is rejected too.
    s.pipeline.aggregation_factor = u32::MAX as usize;
    s.pipeline.report_period = Duration::from_nanos(1);
    assert!(PipelineSpec::from_settings(&s).is_err());
}

#[test]
fn sensor_list_is_validated() {
    assert!(build(vec![]).is_err());
    assert!(build(ids(&["a", "a"])).is_err());
    assert!(build(ids(&["a", "timestamp"])).is_err());
    assert!(build(ids(&[""])).is_err());
    assert!(build(ids(&["b", "a"])).is_ok());
}

#[test]
fn sensors_file_takes_first_field_and_skips_blanks() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "20MAD11CY004,description").unwrap();
    writeln!(file).unwrap();
    writeln!(file, "  20MAD11CY005 ;x").unwrap();
    writeln!(file, "20MAD11CY006").unwrap();

    let ids = read_sensors_file(file.path()).unwrap();
    assert_eq!(ids, vec!["20MAD11CY004", "20MAD11CY005", "20MAD11CY006"]);
}

#[test]
fn sensors_file_ids_follow_inline_ids() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "c").unwrap();

    let mut s = settings("2021-06-01 00:00", "2021-06-01 01:00");
    s.pipeline.sensors_file = Some(file.path().to_path_buf());
    let spec = PipelineSpec::from_settings(&s).unwrap();
    assert_eq!(spec.sensors(), ids(&["a", "b", "c"]).as_slice());
}
