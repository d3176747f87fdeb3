use super::{Observation, SensorId};
use crate::test_helpers::factories::TimestampFactory;

#[test]
fn sensor_id_displays_raw_name() {
    let id = SensorId::from("20MAD11CY004");
    assert_eq!(id.to_string(), "20MAD11CY004");
    assert_eq!(id.as_str(), "20MAD11CY004");
    assert_eq!(id, SensorId::new(String::from("20MAD11CY004")));
}

#[test]
fn sensor_id_serializes_transparently() {
    let id = SensorId::from("a");
    assert_eq!(serde_json::to_string(&id).unwrap(), "\"a\"");
}

#[test]
fn observation_holds_instant_and_value() {
    let obs = Observation::new(TimestampFactory::minute(3), 1.5);
    assert_eq!(obs.timestamp, TimestampFactory::minute(3));
    assert_eq!(obs.value, 1.5);
}
