use super::resample::{Resampler, validate};
use crate::engine::errors::PipelineError;
use crate::engine::types::{SamplingPeriod, SensorId, TimeWindow};
use crate::test_helpers::factories::{ObservationFactory, TimestampFactory};
use chrono::TimeDelta;

fn resampler(start_min: i64, end_secs: i64, period_secs: i64) -> Resampler {
    let window = TimeWindow::new(
        TimestampFactory::minute(start_min),
        TimestampFactory::second(end_secs),
    )
    .unwrap();
    Resampler::new(
        window,
        SamplingPeriod::new(TimeDelta::seconds(period_secs)).unwrap(),
    )
}

#[test]
fn grid_is_half_open_and_regular() {
    let r = resampler(0, 600, 60);
    assert_eq!(r.grid().len(), 10);
    assert_eq!(r.grid()[0], TimestampFactory::minute(0));
    assert_eq!(r.grid()[9], TimestampFactory::minute(9));
}

#[test]
fn length_is_ceil_of_span_over_period() {
    for (end, period) in [(600, 60), (601, 60), (599, 60), (7, 2), (1, 3600)] {
        let r = resampler(0, end, period);
        let expected = (end + period - 1) / period;
        assert_eq!(r.grid().len(), expected as usize, "end={end} period={period}");
    }
}

#[test]
fn grid_does_not_depend_on_content() {
    let r = resampler(0, 300, 60);
    let sensor = SensorId::from("s");
    let a = r
        .resample(&sensor, &ObservationFactory::new().at_minute(1, 1.0).create())
        .unwrap();
    let b = r
        .resample(&sensor, &ObservationFactory::new().ramp(20, 1, 2.0).create())
        .unwrap();
    assert_eq!(a.timestamps, b.timestamps);
    assert_eq!(a.len(), 5);
}

#[test]
fn interpolates_linear_ramp() {
    let r = resampler(0, 600, 60);
    let obs = ObservationFactory::new()
        .at_minute(0, 10.0)
        .at_minute(10, 20.0)
        .create();
    let column = r.resample(&SensorId::from("s"), &obs).unwrap();
    for (k, v) in column.values.iter().enumerate() {
        assert!((v - (10.0 + k as f64)).abs() < 1e-9);
    }
}

#[test]
fn boundary_pair_resamples_to_zeros() {
    let r = resampler(0, 600, 60);
    let column = r.resample(&SensorId::from("s"), &r.boundary_pair()).unwrap();
    assert_eq!(column.len(), 10);
    assert!(column.values.iter().all(|v| *v == 0.0));
}

#[test]
fn unsorted_input_is_malformed() {
    let r = resampler(0, 600, 60);
    let obs = ObservationFactory::new()
        .at_minute(5, 1.0)
        .at_minute(1, 2.0)
        .create();
    let err = r.resample(&SensorId::from("s1"), &obs).unwrap_err();
    match err {
        PipelineError::MalformedSeries { sensor, reason } => {
            assert_eq!(sensor.as_str(), "s1");
            assert!(reason.contains("out of order"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn non_finite_values_are_malformed() {
    let obs = ObservationFactory::new().at_minute(0, f64::NAN).create();
    assert!(validate(&obs).is_err());
    let obs = ObservationFactory::new().at_minute(0, f64::INFINITY).create();
    assert!(validate(&obs).is_err());
}

#[test]
fn empty_input_is_malformed() {
    let r = resampler(0, 600, 60);
    assert!(matches!(
        r.resample(&SensorId::from("s"), &[]),
        Err(PipelineError::MalformedSeries { .. })
    ));
}

#[test]
fn duplicates_are_not_out_of_order() {
    let obs = ObservationFactory::new()
        .at_minute(1, 1.0)
        .at_minute(1, 2.0)
        .create();
    assert!(validate(&obs).is_ok());
}
