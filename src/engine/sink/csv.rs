use std::fs::File;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use super::{TableSink, run_blocking};
use crate::engine::errors::SinkError;
use crate::engine::types::{SensorId, TIMESTAMP_COLUMN, TableSchema, WideTable};
use crate::shared::time::{TimeParser, format_utc};

/// Overwrites a comma-separated file: header `timestamp,<sensor ids>`,
/// RFC 3339 UTC timestamps, empty cells for missing values.
#[derive(Debug, Clone)]
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl TableSink for CsvSink {
    async fn write(&self, table_name: &str, table: &WideTable) -> Result<(), SinkError> {
        let path = self.path.clone();
        let table = table.clone();
        run_blocking(move || write_table(&path, &table)).await?;
        debug!(
            target: "sensor_slicer::sink",
            table = table_name,
            path = %self.path.display(),
            "Wrote CSV"
        );
        Ok(())
    }

    fn describe(&self) -> String {
        format!("csv({})", self.path.display())
    }
}

/// Writes `table` to a sibling `.tmp` file and renames it over `path`, so a
/// failed write leaves any previous file untouched.
pub fn write_table(path: &Path, table: &WideTable) -> Result<(), SinkError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let tmp = tmp_path(path);
    let result = write_rows(&tmp, table).and_then(|()| Ok(std::fs::rename(&tmp, path)?));
    if result.is_err() {
        let _ = std::fs::remove_file(&tmp);
    }
    result
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

fn write_rows(path: &Path, table: &WideTable) -> Result<(), SinkError> {
    let mut writer = csv::Writer::from_writer(File::create(path)?);
    writer.write_record(table.schema().columns().iter().map(|c| c.name.as_str()))?;

    let mut record = Vec::with_capacity(table.width() + 1);
    for row in 0..table.row_count() {
        record.clear();
        record.push(format_utc(table.timestamps()[row]));
        for column in table.columns() {
            let v = column[row];
            record.push(if v.is_nan() { String::new() } else { v.to_string() });
        }
        writer.write_record(&record)?;
    }
    let file = writer.into_inner().map_err(|e| SinkError::Io(e.into_error()))?;
    file.sync_all()?;
    Ok(())
}

/// Reads a file written by [`write_table`] back into a table.
pub fn read_table(path: &Path) -> Result<WideTable, SinkError> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();

    match headers.get(0) {
        Some(TIMESTAMP_COLUMN) => {}
        other => {
            return Err(SinkError::Schema(format!(
                "first column must be '{TIMESTAMP_COLUMN}', found {other:?}"
            )));
        }
    }
    let sensors: Vec<SensorId> = headers.iter().skip(1).map(SensorId::from).collect();
    let mut table = WideTable::empty(TableSchema::for_sensors(&sensors));

    let parser = TimeParser::utc();
    let mut values = Vec::with_capacity(sensors.len());
    for (idx, record) in reader.records().enumerate() {
        let record = record?;
        let raw_ts = record.get(0).unwrap_or_default();
        let ts = parser
            .parse(raw_ts)
            .ok_or_else(|| SinkError::Schema(format!("row {idx}: invalid timestamp {raw_ts:?}")))?;

        values.clear();
        for cell in record.iter().skip(1) {
            let v = if cell.is_empty() {
                f64::NAN
            } else {
                cell.parse::<f64>()
                    .map_err(|_| SinkError::Schema(format!("row {idx}: invalid value {cell:?}")))?
            };
            values.push(v);
        }
        table
            .push_row(ts, &values)
            .map_err(|e| SinkError::Schema(format!("row {idx}: {e}")))?;
    }
    Ok(table)
}
