use std::path::Path;

use chrono::{DateTime, Utc};
use tracing::debug;

use super::codec::ArrowFrameCodec;
use super::frame::{FrameDir, StoredFrameMeta};
use super::manifest::{ManifestState, ManifestStore};
use super::schema_guard::SchemaGuard;
use super::ColumnarStoreError;
use crate::engine::types::{TableSchema, WideTable};

pub(crate) const MANIFEST_FILE: &str = "manifest.bin";
const FRAME_DIR: &str = "frames";

/// One append-only table. The first append fixes the schema; later appends
/// with a different layout are rejected. Nothing is ever dropped.
#[derive(Debug)]
pub struct ColumnarTable {
    name: String,
    frame_dir: FrameDir,
    manifest_store: ManifestStore,
    manifest: ManifestState,
    guard: Option<SchemaGuard>,
    codec: ArrowFrameCodec,
}

impl ColumnarTable {
    /// Opens `dir`, creating an empty table when nothing is there yet.
    pub fn open(dir: impl AsRef<Path>, name: &str) -> Result<Self, ColumnarStoreError> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;

        let frame_dir = FrameDir::create(dir.join(FRAME_DIR))?;
        let (manifest_store, manifest) = ManifestStore::open(dir.join(MANIFEST_FILE))?;
        let guard = manifest.schema().cloned().map(SchemaGuard::new);

        Ok(Self {
            name: name.to_string(),
            frame_dir,
            manifest_store,
            manifest,
            guard,
            codec: ArrowFrameCodec,
        })
    }

    /// Opens a table that must already have a manifest.
    pub fn open_existing(dir: impl AsRef<Path>, name: &str) -> Result<Self, ColumnarStoreError> {
        let dir = dir.as_ref();
        if !dir.join(MANIFEST_FILE).exists() {
            return Err(ColumnarStoreError::NotFound(name.to_string()));
        }
        Self::open(dir, name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> Option<&TableSchema> {
        self.guard.as_ref().map(SchemaGuard::schema)
    }

    pub fn frames(&self) -> &[StoredFrameMeta] {
        self.manifest.frames()
    }

    pub fn row_count(&self) -> u64 {
        self.manifest.row_count()
    }

    /// Appends `table` as one new frame. An empty table only pins the schema.
    pub fn append(&mut self, table: &WideTable) -> Result<Option<StoredFrameMeta>, ColumnarStoreError> {
        match &self.guard {
            Some(guard) => guard.expect(table.schema())?,
            None => {
                self.manifest.set_schema(table.schema().clone());
                self.guard = Some(SchemaGuard::new(table.schema().clone()));
            }
        }

        if table.is_empty() {
            self.persist_manifest()?;
            return Ok(None);
        }

        let encoded = self.codec.encode(table)?;
        let index = self.manifest.next_frame_index();
        let meta = self.frame_dir.write(index, &encoded)?;

        self.manifest.bump_frame_index();
        self.manifest.push_frame(meta.clone());
        self.persist_manifest()?;

        debug!(
            target: "sensor_slicer::columnar",
            table = %self.name,
            frame = %meta.file_name,
            rows = meta.row_count,
            "Appended frame"
        );
        Ok(Some(meta))
    }

    pub fn read_frame(&self, meta: &StoredFrameMeta) -> Result<WideTable, ColumnarStoreError> {
        let schema = self.require_schema()?;
        let data = self.frame_dir.read(meta)?;
        self.codec.decode(schema, data)
    }

    /// Every stored row, frames in append order.
    pub fn read_all(&self) -> Result<WideTable, ColumnarStoreError> {
        let mut out = WideTable::empty(self.require_schema()?.clone());
        for meta in self.manifest.frames() {
            out.extend(self.read_frame(meta)?)
                .map_err(ColumnarStoreError::SchemaMismatch)?;
        }
        Ok(out)
    }

    /// The most recently appended row, if any.
    pub fn last_row(&self) -> Result<Option<(DateTime<Utc>, Vec<f64>)>, ColumnarStoreError> {
        let Some(meta) = self.manifest.frames().last() else {
            return Ok(None);
        };
        let frame = self.read_frame(meta)?;
        Ok(frame.row_count().checked_sub(1).and_then(|last| frame.row(last)))
    }

    fn require_schema(&self) -> Result<&TableSchema, ColumnarStoreError> {
        self.schema()
            .ok_or_else(|| ColumnarStoreError::NotFound(format!("{} has no schema yet", self.name)))
    }

    fn persist_manifest(&self) -> Result<(), ColumnarStoreError> {
        self.manifest_store.persist(&self.manifest)
    }
}
