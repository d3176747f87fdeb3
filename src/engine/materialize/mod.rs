//! Append-only columnar tables on local disk.
//!
//! Each table lives in its own directory under the store root:
//!
//! ```text
//! <root>/<table>/manifest.bin
//! <root>/<table>/frames/000000.frm
//! ```
//!
//! A frame is one appended `WideTable`, encoded as an Arrow IPC stream,
//! LZ4-compressed and CRC-checked. The manifest records frame metadata and
//! the table schema fixed by the first append.

mod codec;
mod columnar_store;
mod error;
mod frame;
mod manifest;
mod schema_guard;
mod table;

#[cfg(test)]
mod frame_tests;

pub use codec::{ArrowFrameCodec, EncodedFrame};
pub use columnar_store::ColumnarStore;
pub use error::ColumnarStoreError;
pub use frame::StoredFrameMeta;
pub use schema_guard::{SchemaGuard, schema_hash};
pub use table::ColumnarTable;
