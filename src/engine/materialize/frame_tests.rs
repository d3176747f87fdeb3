use std::fs::{self, OpenOptions};
use std::io::Write;

use super::frame::{FRAME_HEADER_LEN, FrameDir, FrameHeader};
use super::{ArrowFrameCodec, ColumnarStoreError};
use crate::test_helpers::factories::WideTableFactory;
use tempfile::tempdir;

#[test]
fn header_round_trip_is_sixteen_bytes() {
    let header = FrameHeader {
        schema_hash: 0xDEAD_BEEF_0000_0001,
        row_count: 12,
        checksum: 0xABCD,
    };
    let bytes = header.to_bytes();
    assert_eq!(bytes.len(), FRAME_HEADER_LEN);
    assert_eq!(FrameHeader::read_from(&bytes[..]).unwrap(), header);
}

#[test]
fn short_header_fails() {
    assert!(FrameHeader::read_from(&[0u8; 10][..]).is_err());
}

#[test]
fn write_then_read_returns_block() {
    let dir = tempdir().unwrap();
    let frames = FrameDir::create(dir.path().join("frames")).unwrap();
    let table = WideTableFactory::new()
        .with_column("a", vec![1.0, 2.0, 3.0])
        .create();
    let encoded = ArrowFrameCodec.encode(&table).unwrap();

    let meta = frames.write(7, &encoded).unwrap();
    assert_eq!(meta.file_name, "000007.frm");
    assert!(frames.path().join("000007.frm").exists());
    assert!(!frames.path().join("000007.frm.tmp").exists());

    let data = frames.read(&meta).unwrap();
    assert_eq!(data.compressed, encoded.compressed);
    assert_eq!(data.header.row_count, 3);

    let decoded = ArrowFrameCodec.decode(table.schema(), data).unwrap();
    assert_eq!(decoded.column("a").unwrap(), &[1.0, 2.0, 3.0]);
}

#[test]
fn file_holds_only_headers_and_block() {
    let dir = tempdir().unwrap();
    let frames = FrameDir::create(dir.path()).unwrap();
    let table = WideTableFactory::new().with_column("a", vec![1.0, 2.0]).create();
    let encoded = ArrowFrameCodec.encode(&table).unwrap();

    let meta = frames.write(0, &encoded).unwrap();
    let on_disk = fs::metadata(frames.path().join(&meta.file_name)).unwrap().len() as usize;
    assert_eq!(
        on_disk,
        crate::shared::storage_header::BinaryHeader::TOTAL_LEN
            + FRAME_HEADER_LEN
            + encoded.compressed.len()
    );
}

#[test]
fn trailing_bytes_fail_checksum() {
    let dir = tempdir().unwrap();
    let frames = FrameDir::create(dir.path()).unwrap();
    let table = WideTableFactory::new().with_column("a", vec![1.0]).create();
    let meta = frames.write(0, &ArrowFrameCodec.encode(&table).unwrap()).unwrap();

    let mut file = OpenOptions::new()
        .append(true)
        .open(frames.path().join(&meta.file_name))
        .unwrap();
    file.write_all(b"junk").unwrap();

    assert!(matches!(frames.read(&meta), Err(ColumnarStoreError::Corrupt(_))));
}

#[test]
fn truncated_block_fails_checksum() {
    let dir = tempdir().unwrap();
    let frames = FrameDir::create(dir.path()).unwrap();
    let table = WideTableFactory::new().with_column("a", vec![1.0, 2.0]).create();
    let meta = frames.write(0, &ArrowFrameCodec.encode(&table).unwrap()).unwrap();

    let path = frames.path().join(&meta.file_name);
    let len = fs::metadata(&path).unwrap().len();
    OpenOptions::new().write(true).open(&path).unwrap().set_len(len - 3).unwrap();

    assert!(matches!(frames.read(&meta), Err(ColumnarStoreError::Corrupt(_))));
}

#[test]
fn reader_checks_manifest_entry() {
    let dir = tempdir().unwrap();
    let frames = FrameDir::create(dir.path()).unwrap();
    let table = WideTableFactory::new().with_column("a", vec![1.0]).create();
    let encoded = ArrowFrameCodec.encode(&table).unwrap();

    let mut meta = frames.write(0, &encoded).unwrap();
    meta.schema_hash ^= 1;
    assert!(matches!(frames.read(&meta), Err(ColumnarStoreError::Corrupt(_))));
}
