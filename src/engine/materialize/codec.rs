use std::io::Cursor;
use std::sync::Arc;

use arrow_array::{Array, ArrayRef, Float64Array, RecordBatch, TimestampMicrosecondArray};
use arrow_ipc::reader::StreamReader;
use arrow_ipc::writer::StreamWriter;
use arrow_schema::{Field, Schema};
use chrono::DateTime;
use lz4_flex::block::{compress_prepend_size, decompress_size_prepended};

use super::ColumnarStoreError;
use super::frame::FrameData;
use super::schema_guard::schema_hash;
use crate::engine::types::{LogicalType, TableSchema, WideTable};

/// Frame payload ready to be written: an Arrow IPC stream holding one
/// record batch, LZ4-compressed with the length prepended.
#[derive(Debug, Clone)]
pub struct EncodedFrame {
    pub schema_hash: u64,
    pub row_count: u32,
    pub min_timestamp: i64,
    pub max_timestamp: i64,
    pub compressed: Vec<u8>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ArrowFrameCodec;

impl ArrowFrameCodec {
    pub fn arrow_schema(schema: &TableSchema) -> Schema {
        let fields: Vec<Field> = schema
            .columns()
            .iter()
            .map(|c| Field::new(&c.name, c.logical_type.to_arrow_data_type(), false))
            .collect();
        Schema::new(fields)
    }

    pub fn to_record_batch(table: &WideTable) -> Result<RecordBatch, ColumnarStoreError> {
        let schema = Arc::new(Self::arrow_schema(table.schema()));

        let micros: Vec<i64> = table
            .timestamps()
            .iter()
            .map(|t| t.timestamp_micros())
            .collect();
        let mut columns: Vec<ArrayRef> = Vec::with_capacity(table.width() + 1);
        columns.push(Arc::new(
            TimestampMicrosecondArray::from(micros).with_timezone("UTC"),
        ));
        for values in table.columns() {
            columns.push(Arc::new(Float64Array::from(values.clone())));
        }

        Ok(RecordBatch::try_new(schema, columns)?)
    }

    pub fn encode(&self, table: &WideTable) -> Result<EncodedFrame, ColumnarStoreError> {
        let batch = Self::to_record_batch(table)?;

        let mut buffer = Vec::new();
        {
            let mut writer = StreamWriter::try_new(&mut buffer, &batch.schema())?;
            writer.write(&batch)?;
            writer.finish()?;
        }
        let row_count = u32::try_from(table.row_count()).map_err(|_| {
            ColumnarStoreError::Corrupt(format!("{} rows do not fit one frame", table.row_count()))
        })?;

        let micros = table.timestamps().iter().map(|t| t.timestamp_micros());
        Ok(EncodedFrame {
            schema_hash: schema_hash(table.schema()),
            row_count,
            min_timestamp: micros.clone().min().unwrap_or(0),
            max_timestamp: micros.max().unwrap_or(0),
            compressed: compress_prepend_size(&buffer),
        })
    }

    /// Decodes a frame against the table's schema.
    pub fn decode(
        &self,
        schema: &TableSchema,
        data: FrameData,
    ) -> Result<WideTable, ColumnarStoreError> {
        let payload = decompress_size_prepended(&data.compressed)
            .map_err(|e| ColumnarStoreError::Corrupt(format!("lz4 decompress: {e}")))?;

        let reader = StreamReader::try_new(Cursor::new(payload), None)?;
        let mut table = WideTable::empty(schema.clone());
        for batch in reader {
            let batch = batch?;
            table
                .extend(Self::from_record_batch(schema, &batch)?)
                .map_err(ColumnarStoreError::SchemaMismatch)?;
        }

        if table.row_count() != data.header.row_count as usize {
            return Err(ColumnarStoreError::Corrupt(format!(
                "row count mismatch (expected {}, got {})",
                data.header.row_count,
                table.row_count()
            )));
        }
        Ok(table)
    }

    pub fn from_record_batch(
        schema: &TableSchema,
        batch: &RecordBatch,
    ) -> Result<WideTable, ColumnarStoreError> {
        let descriptors = schema.columns();
        let fields = batch.schema();
        if fields.fields().len() != descriptors.len() {
            return Err(ColumnarStoreError::SchemaMismatch(format!(
                "batch has {} columns, table has {}",
                fields.fields().len(),
                descriptors.len()
            )));
        }
        for (field, desc) in fields.fields().iter().zip(descriptors) {
            if field.name() != &desc.name {
                return Err(ColumnarStoreError::SchemaMismatch(format!(
                    "column '{}' found where '{}' was expected",
                    field.name(),
                    desc.name
                )));
            }
        }

        let ts = batch
            .column(0)
            .as_any()
            .downcast_ref::<TimestampMicrosecondArray>()
            .ok_or_else(|| ColumnarStoreError::SchemaMismatch("timestamp column type".into()))?;
        let timestamps = ts
            .values()
            .iter()
            .map(|&us| {
                DateTime::from_timestamp_micros(us)
                    .ok_or_else(|| ColumnarStoreError::Corrupt(format!("timestamp {us} out of range")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut columns = Vec::with_capacity(descriptors.len() - 1);
        for (idx, desc) in descriptors.iter().enumerate().skip(1) {
            debug_assert_eq!(desc.logical_type, LogicalType::Float);
            let array = batch
                .column(idx)
                .as_any()
                .downcast_ref::<Float64Array>()
                .ok_or_else(|| {
                    ColumnarStoreError::SchemaMismatch(format!("column '{}' is not Float64", desc.name))
                })?;
            let values = (0..array.len())
                .map(|i| if array.is_null(i) { f64::NAN } else { array.value(i) })
                .collect();
            columns.push(values);
        }

        WideTable::from_parts(schema.clone(), timestamps, columns)
            .map_err(ColumnarStoreError::Corrupt)
    }
}
