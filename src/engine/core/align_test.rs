use super::align::align;
use crate::engine::errors::PipelineError;
use crate::engine::types::{Column, SensorId, TIMESTAMP_COLUMN};
use crate::test_helpers::factories::TimestampFactory;
use indexmap::IndexMap;

fn column(minutes: std::ops::Range<i64>, value: f64) -> Column {
    let timestamps: Vec<_> = minutes.map(TimestampFactory::minute).collect();
    let values = vec![value; timestamps.len()];
    Column { timestamps, values }
}

#[test]
fn shape_is_rows_by_sensors() {
    let mut columns = IndexMap::new();
    columns.insert(SensorId::from("b"), column(0..4, 1.0));
    columns.insert(SensorId::from("a"), column(0..4, 2.0));
    columns.insert(SensorId::from("c"), column(0..4, 3.0));

    let table = align(columns).unwrap();
    assert_eq!(table.row_count(), 4);
    assert_eq!(table.width(), 3);
    assert_eq!(table.schema().columns().len(), 4);
    assert_eq!(table.schema().columns()[0].name, TIMESTAMP_COLUMN);
    assert_eq!(
        table.schema().value_names().collect::<Vec<_>>(),
        vec!["b", "a", "c"]
    );
    assert_eq!(table.column("a").unwrap(), &[2.0; 4]);
}

#[test]
fn length_mismatch_names_the_sensor() {
    let mut columns = IndexMap::new();
    columns.insert(SensorId::from("a"), column(0..4, 1.0));
    columns.insert(SensorId::from("b"), column(0..3, 1.0));

    match align(columns).unwrap_err() {
        PipelineError::MisalignedColumns { sensor, .. } => assert_eq!(sensor.as_str(), "b"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn timestamp_mismatch_is_rejected() {
    let mut columns = IndexMap::new();
    columns.insert(SensorId::from("a"), column(0..4, 1.0));
    columns.insert(SensorId::from("b"), column(1..5, 1.0));

    assert!(matches!(
        align(columns),
        Err(PipelineError::MisalignedColumns { .. })
    ));
}

#[test]
fn no_columns_gives_empty_table() {
    let table = align(IndexMap::new()).unwrap();
    assert!(table.is_empty());
    assert_eq!(table.width(), 0);
}
