use super::csv::{read_table, write_table};
use super::{CsvSink, TableSink};
use crate::engine::errors::SinkError;
use crate::test_helpers::factories::{TimestampFactory, WideTableFactory};
use chrono::TimeDelta;
use tempfile::tempdir;

#[test]
fn writes_header_and_rfc3339_rows() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("slices.csv");
    let table = WideTableFactory::new()
        .with_column("20MAD11CY004", vec![12.0, f64::NAN])
        .with_column("20MAD11CY005", vec![0.5, 1.0])
        .create();

    write_table(&path, &table).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines[0], "timestamp,20MAD11CY004,20MAD11CY005");
    assert_eq!(lines[1], "2021-06-01T00:00:00Z,12,0.5");
    assert_eq!(lines[2], "2021-06-01T00:01:00Z,,1");
}

#[test]
fn round_trip_keeps_order_rows_and_values() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("slices.csv");
    let table = WideTableFactory::new()
        .with_column("b", vec![1.0 / 3.0, 2.5, f64::NAN])
        .with_column("a", vec![-7.125, 1e-9, 42.0])
        .create();

    write_table(&path, &table).unwrap();
    let back = read_table(&path).unwrap();

    assert_eq!(back.schema(), table.schema());
    assert_eq!(back.timestamps(), table.timestamps());
    for (orig, read) in table.columns().iter().zip(back.columns()) {
        for (x, y) in orig.iter().zip(read) {
            assert!((x.is_nan() && y.is_nan()) || (x - y).abs() < 1e-12);
        }
    }
}

#[test]
fn read_requires_leading_timestamp_column() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.csv");
    std::fs::write(&path, "a,timestamp\n1,2021-06-01T00:00:00Z\n").unwrap();
    assert!(matches!(read_table(&path), Err(SinkError::Schema(_))));
}

#[tokio::test]
async fn sink_overwrites_previous_file() {
    let dir = tempdir().unwrap();
    let sink = CsvSink::new(dir.path().join("out.csv"));

    let long = WideTableFactory::new().with_column("a", vec![1.0; 5]).create();
    let short = WideTableFactory::new().with_column("a", vec![2.0]).create();
    sink.write("slices", &long).await.unwrap();
    sink.write("slices", &short).await.unwrap();

    let back = read_table(sink.path()).unwrap();
    assert_eq!(back.row_count(), 1);
    assert_eq!(back.column("a").unwrap(), &[2.0]);
}

#[test]
fn sub_millisecond_timestamps_survive_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("slices.csv");
    let table = WideTableFactory::new()
        .with_start(TimestampFactory::base() + TimeDelta::microseconds(250))
        .with_period(TimeDelta::microseconds(1_500))
        .with_column("a", vec![1.0, 2.0])
        .create();

    write_table(&path, &table).unwrap();
    assert_eq!(read_table(&path).unwrap(), table);
}

#[test]
fn write_replaces_file_without_leaving_temp() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("slices.csv");
    std::fs::write(&path, "previous").unwrap();

    let table = WideTableFactory::new().with_column("a", vec![3.0]).create();
    write_table(&path, &table).unwrap();

    let names: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(names, vec!["slices.csv"]);
    assert_eq!(read_table(&path).unwrap(), table);
}

#[test]
fn failed_write_keeps_previous_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("slices.csv");
    let good = WideTableFactory::new().with_column("a", vec![1.0]).create();
    write_table(&path, &good).unwrap();

    // A directory squatting on the temp name makes the write fail.
    std::fs::create_dir(dir.path().join("slices.csv.tmp")).unwrap();
    let other = WideTableFactory::new().with_column("a", vec![9.0, 9.0]).create();
    assert!(write_table(&path, &other).is_err());

    assert_eq!(read_table(&path).unwrap(), good);
}
