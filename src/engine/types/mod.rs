use std::fmt;
use std::str::FromStr;

use arrow_schema::{DataType, TimeUnit};
use serde::{Deserialize, Serialize};

mod observation;
mod table;
mod window;

#[cfg(test)]
mod observation_test;

pub use observation::{Observation, SensorId};
pub use table::{Column, ColumnDescriptor, TIMESTAMP_COLUMN, TableSchema, WideTable};
pub use window::{AggregationFactor, SamplingPeriod, TimeWindow};

/// Semantic type of a wide-table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicalType {
    Timestamp,
    Float,
}

impl LogicalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogicalType::Timestamp => "Timestamp",
            LogicalType::Float => "Float",
        }
    }

    pub fn to_arrow_data_type(&self) -> DataType {
        match self {
            LogicalType::Timestamp => {
                DataType::Timestamp(TimeUnit::Microsecond, Some("UTC".into()))
            }
            LogicalType::Float => DataType::Float64,
        }
    }

    /// Column type used when the table is materialized in SQLite.
    pub fn sql_type(&self) -> &'static str {
        match self {
            LogicalType::Timestamp => "TEXT",
            LogicalType::Float => "REAL",
        }
    }
}

impl fmt::Display for LogicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogicalType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Timestamp" => Ok(LogicalType::Timestamp),
            "Float" | "Float64" => Ok(LogicalType::Float),
            _ => Err(()),
        }
    }
}

impl From<LogicalType> for DataType {
    fn from(value: LogicalType) -> Self {
        value.to_arrow_data_type()
    }
}
