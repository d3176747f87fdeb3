use std::path::Path;

use anyhow::Context;

use crate::engine::materialize::ColumnarStore;

/// Name, row count and column count of one stored table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSummary {
    pub name: String,
    pub rows: u64,
    pub columns: usize,
}

pub fn list(root: &Path) -> anyhow::Result<Vec<TableSummary>> {
    let store = ColumnarStore::open(root)
        .with_context(|| format!("opening columnar store {}", root.display()))?;
    let mut out = Vec::new();
    for name in store.list_tables()? {
        let table = store.existing_table(&name)?;
        out.push(TableSummary {
            rows: table.row_count(),
            columns: table.schema().map_or(0, |s| s.columns().len()),
            name,
        });
    }
    Ok(out)
}

pub fn handle(root: &Path) -> anyhow::Result<()> {
    let tables = list(root)?;
    if tables.is_empty() {
        println!("No tables in {}", root.display());
        return Ok(());
    }
    println!("{:<32} {:>10} {:>8}", "table", "rows", "columns");
    for t in tables {
        println!("{:<32} {:>10} {:>8}", t.name, t.rows, t.columns);
    }
    Ok(())
}
