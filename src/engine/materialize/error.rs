use thiserror::Error;

#[derive(Debug, Error)]
pub enum ColumnarStoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] bincode::Error),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow_schema::ArrowError),

    #[error("Invalid storage header: {0}")]
    Header(String),

    #[error("Table not found: {0}")]
    NotFound(String),

    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("Corrupt frame: {0}")]
    Corrupt(String),
}
