//! Frame files: `BinaryHeader`, a 16-byte frame header, then the LZ4 block
//! up to end of file. The block carries its own decompressed size.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use crc32fast::Hasher as Crc32Hasher;
use serde::{Deserialize, Serialize};

use super::ColumnarStoreError;
use super::codec::EncodedFrame;
use crate::shared::storage_header::{BinaryHeader, FileKind};

pub const FRAME_VERSION: u16 = 2;
pub const FRAME_HEADER_LEN: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub schema_hash: u64,
    pub row_count: u32,
    /// CRC32 of the compressed block.
    pub checksum: u32,
}

impl FrameHeader {
    pub fn to_bytes(&self) -> [u8; FRAME_HEADER_LEN] {
        let mut out = [0u8; FRAME_HEADER_LEN];
        out[..8].copy_from_slice(&self.schema_hash.to_le_bytes());
        out[8..12].copy_from_slice(&self.row_count.to_le_bytes());
        out[12..].copy_from_slice(&self.checksum.to_le_bytes());
        out
    }

    pub fn read_from<R: Read>(mut reader: R) -> Result<Self, ColumnarStoreError> {
        let mut buf = [0u8; FRAME_HEADER_LEN];
        reader.read_exact(&mut buf)?;
        let mut hash = [0u8; 8];
        hash.copy_from_slice(&buf[..8]);
        let mut rows = [0u8; 4];
        rows.copy_from_slice(&buf[8..12]);
        let mut crc = [0u8; 4];
        crc.copy_from_slice(&buf[12..]);
        Ok(Self {
            schema_hash: u64::from_le_bytes(hash),
            row_count: u32::from_le_bytes(rows),
            checksum: u32::from_le_bytes(crc),
        })
    }
}

/// Manifest entry for one frame file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredFrameMeta {
    pub file_name: String,
    pub schema_hash: u64,
    pub row_count: u32,
    /// Microseconds since the epoch.
    pub min_timestamp: i64,
    pub max_timestamp: i64,
}

/// Frame contents after header and checksum validation.
#[derive(Debug, Clone)]
pub struct FrameData {
    pub header: FrameHeader,
    pub compressed: Vec<u8>,
}

fn checksum(bytes: &[u8]) -> u32 {
    let mut crc = Crc32Hasher::new();
    crc.update(bytes);
    crc.finalize()
}

/// Directory holding a table's frame files.
#[derive(Debug, Clone)]
pub struct FrameDir {
    dir: PathBuf,
}

impl FrameDir {
    pub fn create(path: impl AsRef<Path>) -> Result<Self, ColumnarStoreError> {
        let dir = path.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// Writes frame `index` next to its final name and renames it into place.
    pub fn write(
        &self,
        index: u64,
        frame: &EncodedFrame,
    ) -> Result<StoredFrameMeta, ColumnarStoreError> {
        let file_name = format!("{index:06}.frm");
        let path = self.dir.join(&file_name);
        let tmp = path.with_extension("frm.tmp");

        let header = FrameHeader {
            schema_hash: frame.schema_hash,
            row_count: frame.row_count,
            checksum: checksum(&frame.compressed),
        };

        let result = (|| -> Result<(), ColumnarStoreError> {
            let mut file = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(&tmp)?;
            BinaryHeader::new(FileKind::ColumnarFrame.magic(), FRAME_VERSION, 0)
                .write_to(&mut file)
                .map_err(|e| ColumnarStoreError::Header(e.to_string()))?;
            file.write_all(&header.to_bytes())?;
            file.write_all(&frame.compressed)?;
            file.sync_all()?;
            fs::rename(&tmp, &path)?;
            Ok(())
        })();
        if result.is_err() {
            let _ = fs::remove_file(&tmp);
        }
        result?;

        Ok(StoredFrameMeta {
            file_name,
            schema_hash: frame.schema_hash,
            row_count: frame.row_count,
            min_timestamp: frame.min_timestamp,
            max_timestamp: frame.max_timestamp,
        })
    }

    pub fn read(&self, meta: &StoredFrameMeta) -> Result<FrameData, ColumnarStoreError> {
        let mut file = File::open(self.dir.join(&meta.file_name))?;
        BinaryHeader::read_expecting(&mut file, FileKind::ColumnarFrame, FRAME_VERSION)
            .map_err(|e| ColumnarStoreError::Header(format!("{}: {e}", meta.file_name)))?;

        let header = FrameHeader::read_from(&mut file)?;
        if header.schema_hash != meta.schema_hash || header.row_count != meta.row_count {
            return Err(ColumnarStoreError::Corrupt(format!(
                "frame {} does not match its manifest entry",
                meta.file_name
            )));
        }

        let mut compressed = Vec::new();
        file.read_to_end(&mut compressed)?;
        if checksum(&compressed) != header.checksum {
            return Err(ColumnarStoreError::Corrupt(format!(
                "checksum mismatch for frame {}",
                meta.file_name
            )));
        }

        Ok(FrameData { header, compressed })
    }
}
