use crc32fast::Hasher as Crc32Hasher;

use super::ColumnarStoreError;
use crate::engine::types::TableSchema;

/// Fingerprint of a table layout (names and types, in order). Persisted in
/// manifests and frame headers, so it must not depend on the build.
pub fn schema_hash(schema: &TableSchema) -> u64 {
    let mut names = Crc32Hasher::new();
    let mut types = Crc32Hasher::new();
    for column in schema.columns() {
        names.update(column.name.as_bytes());
        names.update(&[0]);
        types.update(column.logical_type.as_str().as_bytes());
        types.update(&[0]);
    }
    (u64::from(names.finalize()) << 32) | u64::from(types.finalize())
}

/// Pins the schema of a table; every later append must match it exactly.
#[derive(Debug, Clone)]
pub struct SchemaGuard {
    schema: TableSchema,
    schema_hash: u64,
}

impl SchemaGuard {
    pub fn new(schema: TableSchema) -> Self {
        let schema_hash = schema_hash(&schema);
        Self {
            schema,
            schema_hash,
        }
    }

    pub fn expect(&self, schema: &TableSchema) -> Result<(), ColumnarStoreError> {
        if schema_hash(schema) == self.schema_hash && schema == &self.schema {
            return Ok(());
        }
        let expected: Vec<&str> = self.schema.columns().iter().map(|c| c.name.as_str()).collect();
        let found: Vec<&str> = schema.columns().iter().map(|c| c.name.as_str()).collect();
        Err(ColumnarStoreError::SchemaMismatch(format!(
            "expected columns {expected:?}, found {found:?}"
        )))
    }

    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    pub fn schema_hash(&self) -> u64 {
        self.schema_hash
    }
}
