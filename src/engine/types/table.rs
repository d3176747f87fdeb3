use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{LogicalType, SensorId};

/// Name of the single temporal column of every wide table.
pub const TIMESTAMP_COLUMN: &str = "timestamp";

/// Resampled values of one sensor on the fine grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub timestamps: Vec<DateTime<Utc>>,
    pub values: Vec<f64>,
}

impl Column {
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (DateTime<Utc>, f64)> + '_ {
        self.timestamps.iter().copied().zip(self.values.iter().copied())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub name: String,
    pub logical_type: LogicalType,
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>, logical_type: LogicalType) -> Self {
        Self {
            name: name.into(),
            logical_type,
        }
    }
}

/// Ordered `(name, type)` layout of a wide table: the timestamp column
/// first, then one float column per sensor in configured order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableSchema {
    columns: Vec<ColumnDescriptor>,
}

impl TableSchema {
    pub fn for_sensors<'a>(sensors: impl IntoIterator<Item = &'a SensorId>) -> Self {
        let mut columns = vec![ColumnDescriptor::new(
            TIMESTAMP_COLUMN,
            LogicalType::Timestamp,
        )];
        columns.extend(
            sensors
                .into_iter()
                .map(|s| ColumnDescriptor::new(s.as_str(), LogicalType::Float)),
        );
        Self { columns }
    }

    /// Builds a schema from an explicit descriptor list, e.g. one read back
    /// from storage. The first column must be the timestamp column.
    pub fn from_descriptors(columns: Vec<ColumnDescriptor>) -> Result<Self, String> {
        match columns.first() {
            Some(first)
                if first.name == TIMESTAMP_COLUMN
                    && first.logical_type == LogicalType::Timestamp => {}
            _ => return Err(format!("first column must be '{TIMESTAMP_COLUMN}' (Timestamp)")),
        }
        if let Some(bad) = columns[1..]
            .iter()
            .find(|c| c.logical_type != LogicalType::Float)
        {
            return Err(format!("value column '{}' must be Float", bad.name));
        }
        Ok(Self { columns })
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    /// Descriptors of the value columns only.
    pub fn value_columns(&self) -> &[ColumnDescriptor] {
        &self.columns[1..]
    }

    pub fn value_names(&self) -> impl Iterator<Item = &str> {
        self.value_columns().iter().map(|c| c.name.as_str())
    }
}

/// Dense table with one row per timestamp and one `f64` column per sensor.
/// Missing cells are `NaN`.
#[derive(Debug, Clone, PartialEq)]
pub struct WideTable {
    schema: TableSchema,
    timestamps: Vec<DateTime<Utc>>,
    columns: Vec<Vec<f64>>,
}

impl WideTable {
    pub fn empty(schema: TableSchema) -> Self {
        let width = schema.value_columns().len();
        Self {
            schema,
            timestamps: Vec::new(),
            columns: vec![Vec::new(); width],
        }
    }

    /// Assembles a table from parts; every column must match the timestamp count
    /// and the schema must list one value column per data column.
    pub fn from_parts(
        schema: TableSchema,
        timestamps: Vec<DateTime<Utc>>,
        columns: Vec<Vec<f64>>,
    ) -> Result<Self, String> {
        if schema.value_columns().len() != columns.len() {
            return Err(format!(
                "schema lists {} value columns but {} were supplied",
                schema.value_columns().len(),
                columns.len()
            ));
        }
        if let Some((idx, col)) = columns
            .iter()
            .enumerate()
            .find(|(_, c)| c.len() != timestamps.len())
        {
            return Err(format!(
                "column '{}' has {} rows, expected {}",
                schema.value_columns()[idx].name,
                col.len(),
                timestamps.len()
            ));
        }
        Ok(Self {
            schema,
            timestamps,
            columns,
        })
    }

    /// Used by transforms that preserve shape by construction.
    pub(crate) fn from_aligned_parts(
        schema: TableSchema,
        timestamps: Vec<DateTime<Utc>>,
        columns: Vec<Vec<f64>>,
    ) -> Self {
        debug_assert_eq!(schema.value_columns().len(), columns.len());
        debug_assert!(columns.iter().all(|c| c.len() == timestamps.len()));
        Self {
            schema,
            timestamps,
            columns,
        }
    }

    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    pub fn columns(&self) -> &[Vec<f64>] {
        &self.columns
    }

    pub fn row_count(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Number of value columns (the timestamp column is not counted).
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Mutable access to cell values; the shape cannot change.
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut [f64]> {
        self.columns.iter_mut().map(|c| c.as_mut_slice())
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.schema
            .value_names()
            .position(|n| n == name)
            .map(|idx| self.columns[idx].as_slice())
    }

    pub fn value(&self, row: usize, col: usize) -> Option<f64> {
        self.columns.get(col).and_then(|c| c.get(row)).copied()
    }

    /// Values of row `row` in column order.
    pub fn row(&self, row: usize) -> Option<(DateTime<Utc>, Vec<f64>)> {
        let ts = *self.timestamps.get(row)?;
        Some((ts, self.columns.iter().map(|c| c[row]).collect()))
    }

    /// Appends one row. `values` must hold one entry per value column.
    pub fn push_row(&mut self, timestamp: DateTime<Utc>, values: &[f64]) -> Result<(), String> {
        if values.len() != self.columns.len() {
            return Err(format!(
                "row has {} values, table has {} value columns",
                values.len(),
                self.columns.len()
            ));
        }
        self.timestamps.push(timestamp);
        for (col, v) in self.columns.iter_mut().zip(values) {
            col.push(*v);
        }
        Ok(())
    }

    /// Appends every row of `other`, which must share this table's schema.
    pub fn extend(&mut self, other: WideTable) -> Result<(), String> {
        if other.schema != self.schema {
            return Err("cannot concatenate tables with different schemas".into());
        }
        self.timestamps.extend(other.timestamps);
        for (col, more) in self.columns.iter_mut().zip(other.columns) {
            col.extend(more);
        }
        Ok(())
    }

    /// Count of `NaN` cells.
    pub fn missing_cells(&self) -> usize {
        self.columns
            .iter()
            .map(|c| c.iter().filter(|v| v.is_nan()).count())
            .sum()
    }

    pub fn into_parts(self) -> (TableSchema, Vec<DateTime<Utc>>, Vec<Vec<f64>>) {
        (self.schema, self.timestamps, self.columns)
    }
}
