use crate::test_helpers::factories::{TimestampFactory, WideTableFactory};
use chrono::TimeDelta;

#[test]
fn builds_regular_grid() {
    let table = WideTableFactory::new()
        .with_period(TimeDelta::seconds(30))
        .with_column("a", vec![1.0, 2.0, 3.0])
        .with_column("b", vec![f64::NAN, 5.0, 6.0])
        .create();

    assert_eq!(table.row_count(), 3);
    assert_eq!(table.width(), 2);
    assert_eq!(table.timestamps()[2], TimestampFactory::second(60));
    assert_eq!(table.missing_cells(), 1);
}
