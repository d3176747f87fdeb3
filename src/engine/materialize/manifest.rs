use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::ColumnarStoreError;
use super::frame::StoredFrameMeta;
use crate::engine::types::TableSchema;
use crate::shared::storage_header::{BinaryHeader, FileKind};

pub const MANIFEST_VERSION: u16 = 1;

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ManifestState {
    schema: Option<TableSchema>,
    frames: Vec<StoredFrameMeta>,
    next_frame_index: u64,
}

impl ManifestState {
    pub fn schema(&self) -> Option<&TableSchema> {
        self.schema.as_ref()
    }

    pub fn set_schema(&mut self, schema: TableSchema) {
        self.schema = Some(schema);
    }

    pub fn frames(&self) -> &[StoredFrameMeta] {
        &self.frames
    }

    pub fn push_frame(&mut self, meta: StoredFrameMeta) {
        self.frames.push(meta);
    }

    pub fn next_frame_index(&self) -> u64 {
        self.next_frame_index
    }

    pub fn bump_frame_index(&mut self) {
        self.next_frame_index = self.next_frame_index.saturating_add(1);
    }

    pub fn row_count(&self) -> u64 {
        self.frames.iter().map(|f| u64::from(f.row_count)).sum()
    }

    fn ensure_next_index(&mut self) {
        if self.next_frame_index < self.frames.len() as u64 {
            self.next_frame_index = self.frames.len() as u64;
        }
    }
}

#[derive(Debug)]
pub struct ManifestStore {
    path: PathBuf,
}

impl ManifestStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<(Self, ManifestState), ColumnarStoreError> {
        let path = path.into();
        let state = if path.exists() {
            load_manifest(&path)?
        } else {
            ManifestState::default()
        };

        Ok((Self { path }, state))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn persist(&self, state: &ManifestState) -> Result<(), ColumnarStoreError> {
        persist_manifest(&self.path, state)
    }
}

fn load_manifest(path: &Path) -> Result<ManifestState, ColumnarStoreError> {
    let mut file = File::open(path)?;
    BinaryHeader::read_expecting(&mut file, FileKind::ColumnarManifest, MANIFEST_VERSION)
        .map_err(|e| ColumnarStoreError::Header(format!("manifest: {e}")))?;

    let mut buf = Vec::new();
    file.read_to_end(&mut buf)?;
    if buf.is_empty() {
        return Ok(ManifestState::default());
    }

    let mut state: ManifestState = bincode::deserialize(&buf)?;
    state.ensure_next_index();
    Ok(state)
}

/// Writes to a sibling temp file and renames over the manifest.
fn persist_manifest(path: &Path, state: &ManifestState) -> Result<(), ColumnarStoreError> {
    let mut tmp = path.to_path_buf();
    tmp.set_extension("tmp");

    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&tmp)?;

    BinaryHeader::new(FileKind::ColumnarManifest.magic(), MANIFEST_VERSION, 0)
        .write_to(&mut file)
        .map_err(|e| ColumnarStoreError::Header(e.to_string()))?;

    let serialized = bincode::serialize(state)?;
    file.write_all(&serialized)?;
    file.flush()?;
    file.sync_all()?;

    fs::rename(&tmp, path)?;
    Ok(())
}
