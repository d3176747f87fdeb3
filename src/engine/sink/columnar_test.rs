use super::{ColumnarSink, TableSink};
use crate::engine::errors::SinkError;
use crate::test_helpers::factories::{TimestampFactory, WideTableFactory};
use tempfile::tempdir;

#[tokio::test]
async fn appends_across_runs() {
    let dir = tempdir().unwrap();
    let sink = ColumnarSink::open(dir.path()).unwrap();

    let run1 = WideTableFactory::new().with_column("a", vec![1.0, 2.0]).create();
    let run2 = WideTableFactory::new()
        .with_start(TimestampFactory::minute(10))
        .with_column("a", vec![3.0])
        .create();
    sink.write("slices", &run1).await.unwrap();
    sink.write("slices", &run2).await.unwrap();

    let stored = sink.store().existing_table("slices").unwrap().read_all().unwrap();
    assert_eq!(stored.column("a").unwrap(), &[1.0, 2.0, 3.0]);
}

#[tokio::test]
async fn schema_drift_is_a_sink_error() {
    let dir = tempdir().unwrap();
    let sink = ColumnarSink::open(dir.path()).unwrap();
    sink.write("slices", &WideTableFactory::new().with_column("a", vec![1.0]).create())
        .await
        .unwrap();

    let err = sink
        .write("slices", &WideTableFactory::new().with_column("b", vec![1.0]).create())
        .await
        .unwrap_err();
    assert!(matches!(err, SinkError::Store(_)));
}
