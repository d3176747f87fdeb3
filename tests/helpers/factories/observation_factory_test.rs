use crate::test_helpers::factories::{ObservationFactory, TimestampFactory};

#[test]
fn keeps_insertion_order() {
    let obs = ObservationFactory::new()
        .at_minute(5, 1.0)
        .at_minute(1, 2.0)
        .create();

    assert_eq!(obs.len(), 2);
    assert_eq!(obs[0].timestamp, TimestampFactory::minute(5));
    assert_eq!(obs[1].value, 2.0);
}

#[test]
fn ramp_produces_linear_values() {
    let obs = ObservationFactory::new().ramp(3, 2, 0.5).create();

    let values: Vec<f64> = obs.iter().map(|o| o.value).collect();
    assert_eq!(values, vec![0.0, 1.0, 2.0]);
    assert_eq!(obs[2].timestamp, TimestampFactory::minute(4));
}
