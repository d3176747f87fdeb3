//! Long-running loops over the columnar store: replaying a stored table as
//! if it were live, and summing the newest row of a table.

mod replayer;
mod row_sum;


pub use replayer::Replayer;
pub use row_sum::{RowSummer, SUM_COLUMN, nan_sum};

use crate::engine::materialize::ColumnarStoreError;

/// Runs columnar store file I/O off the async executor.
async fn run_blocking<T, F>(f: F) -> Result<T, ColumnarStoreError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, ColumnarStoreError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ColumnarStoreError::Io(std::io::Error::other(e)))?
}
