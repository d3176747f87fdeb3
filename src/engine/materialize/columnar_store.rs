use std::path::{Path, PathBuf};

use super::ColumnarStoreError;
use super::table::{ColumnarTable, MANIFEST_FILE};

/// Directory of columnar tables, one sub-directory per table.
#[derive(Debug, Clone)]
pub struct ColumnarStore {
    root: PathBuf,
}

impl ColumnarStore {
    pub fn open(root: impl AsRef<Path>) -> Result<Self, ColumnarStoreError> {
        let root = root.as_ref();
        std::fs::create_dir_all(root)?;
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Opens `name`, creating it on first use.
    pub fn table(&self, name: &str) -> Result<ColumnarTable, ColumnarStoreError> {
        ColumnarTable::open(self.table_dir(name)?, name)
    }

    /// Opens `name`, failing with `NotFound` if it was never written.
    pub fn existing_table(&self, name: &str) -> Result<ColumnarTable, ColumnarStoreError> {
        ColumnarTable::open_existing(self.table_dir(name)?, name)
    }

    /// Names of tables with a manifest, sorted.
    pub fn list_tables(&self) -> Result<Vec<String>, ColumnarStoreError> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() || !entry.path().join(MANIFEST_FILE).exists() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn table_dir(&self, name: &str) -> Result<PathBuf, ColumnarStoreError> {
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(ColumnarStoreError::NotFound(format!(
                "invalid table name {name:?}"
            )));
        }
        Ok(self.root.join(name))
    }
}
