use std::path::{Path, PathBuf};

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool};
use sqlx::Row;
use tracing::debug;

use super::TableSink;
use crate::engine::errors::SinkError;
use crate::engine::source::sqlite::quote_ident;
use crate::engine::types::{SensorId, TIMESTAMP_COLUMN, TableSchema, WideTable};
use crate::shared::time::{TimeParser, format_utc};

/// Row-store sink: drops and recreates the target table with one `TEXT`
/// timestamp column and one `REAL` column per sensor, then inserts every row
/// in a single transaction. Missing cells become `NULL`.
pub struct SqliteSink {
    pool: SqlitePool,
    path: PathBuf,
}

impl SqliteSink {
    pub async fn connect(path: &Path) -> Result<Self, SinkError> {
        let opts = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(opts).await?;
        Ok(Self {
            pool,
            path: path.to_path_buf(),
        })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

pub fn create_table_sql(table_name: &str, schema: &TableSchema) -> String {
    let columns: Vec<String> = schema
        .columns()
        .iter()
        .map(|c| format!("{} {}", quote_ident(&c.name), c.logical_type.sql_type()))
        .collect();
    format!("CREATE TABLE {} ({})", quote_ident(table_name), columns.join(", "))
}

fn insert_sql(table_name: &str, schema: &TableSchema) -> String {
    let names: Vec<String> = schema.columns().iter().map(|c| quote_ident(&c.name)).collect();
    let params: Vec<String> = (1..=names.len()).map(|i| format!("?{i}")).collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_ident(table_name),
        names.join(", "),
        params.join(", ")
    )
}

#[async_trait]
impl TableSink for SqliteSink {
    async fn write(&self, table_name: &str, table: &WideTable) -> Result<(), SinkError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(&format!("DROP TABLE IF EXISTS {}", quote_ident(table_name)))
            .execute(&mut *tx)
            .await?;
        sqlx::query(&create_table_sql(table_name, table.schema()))
            .execute(&mut *tx)
            .await?;

        let insert = insert_sql(table_name, table.schema());
        for row in 0..table.row_count() {
            let mut query = sqlx::query(&insert).bind(format_utc(table.timestamps()[row]));
            for column in table.columns() {
                let v = column[row];
                query = query.bind(if v.is_nan() { None } else { Some(v) });
            }
            query.execute(&mut *tx).await?;
        }

        tx.commit().await?;
        debug!(
            target: "sensor_slicer::sink",
            table = table_name,
            rows = table.row_count(),
            path = %self.path.display(),
            "Wrote SQLite table"
        );
        Ok(())
    }

    fn describe(&self) -> String {
        format!("sqlite({})", self.path.display())
    }
}

/// Reads a table written by [`SqliteSink`] back, in insertion order.
pub async fn read_table(pool: &SqlitePool, table_name: &str) -> Result<WideTable, SinkError> {
    let info = sqlx::query(&format!("PRAGMA table_info({})", quote_ident(table_name)))
        .fetch_all(pool)
        .await?;
    let names: Vec<String> = info
        .iter()
        .map(|r| r.try_get::<String, _>("name"))
        .collect::<Result<_, _>>()?;
    if names.first().map(String::as_str) != Some(TIMESTAMP_COLUMN) {
        return Err(SinkError::Schema(format!(
            "table {table_name} has no leading '{TIMESTAMP_COLUMN}' column"
        )));
    }
    let sensors: Vec<SensorId> = names[1..].iter().map(|n| SensorId::from(n.as_str())).collect();
    let mut table = WideTable::empty(TableSchema::for_sensors(&sensors));

    let rows = sqlx::query(&format!("SELECT * FROM {} ORDER BY rowid", quote_ident(table_name)))
        .fetch_all(pool)
        .await?;
    let parser = TimeParser::utc();
    let mut values = Vec::with_capacity(sensors.len());
    for row in rows {
        let raw: String = row.try_get(0)?;
        let ts = parser
            .parse(&raw)
            .ok_or_else(|| SinkError::Schema(format!("invalid timestamp {raw:?}")))?;
        values.clear();
        for idx in 1..=sensors.len() {
            values.push(row.try_get::<Option<f64>, _>(idx)?.unwrap_or(f64::NAN));
        }
        table.push_row(ts, &values).map_err(SinkError::Schema)?;
    }
    Ok(table)
}
