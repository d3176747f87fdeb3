use indexmap::IndexMap;

use crate::engine::errors::PipelineError;
use crate::engine::types::{Column, SensorId, TableSchema, WideTable};

/// Folds per-sensor columns into one wide table, keeping map order as column
/// order.
///
/// Columns produced from one grid share their timestamps, so the join is a
/// positional zip. Any column whose length or timestamps differ from the
/// first one is rejected.
pub fn align(columns: IndexMap<SensorId, Column>) -> Result<WideTable, PipelineError> {
    let schema = TableSchema::for_sensors(columns.keys());

    let mut entries = columns.into_iter();
    let Some((_, first)) = entries.next() else {
        return Ok(WideTable::empty(schema));
    };

    let timestamps = first.timestamps;
    let mut values = Vec::with_capacity(schema.value_columns().len());
    values.push(first.values);

    for (sensor, column) in entries {
        if column.timestamps.len() != timestamps.len() {
            return Err(PipelineError::MisalignedColumns {
                sensor,
                reason: format!(
                    "{} rows, expected {}",
                    column.timestamps.len(),
                    timestamps.len()
                ),
            });
        }
        if let Some(row) = column
            .timestamps
            .iter()
            .zip(&timestamps)
            .position(|(a, b)| a != b)
        {
            return Err(PipelineError::MisalignedColumns {
                sensor,
                reason: format!(
                    "row {} has timestamp {}, expected {}",
                    row, column.timestamps[row], timestamps[row]
                ),
            });
        }
        values.push(column.values);
    }

    Ok(WideTable::from_aligned_parts(schema, timestamps, values))
}
