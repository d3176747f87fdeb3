use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque sensor identifier. Also the name of the sensor's output column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SensorId(String);

impl SensorId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SensorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SensorId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SensorId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for SensorId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// One raw reading of a sensor, normalized to UTC.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

impl Observation {
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self { timestamp, value }
    }
}
