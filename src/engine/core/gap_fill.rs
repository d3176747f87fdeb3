use crate::engine::types::WideTable;

/// Cell counts from one back-fill pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FillSummary {
    pub filled: usize,
    /// Trailing cells with no later value to copy.
    pub unresolved: usize,
}

/// Back-fills missing cells in place: scanning each column from the end,
/// a `NaN` takes the nearest later present value. Present cells are never
/// touched.
pub fn fill(table: &mut WideTable) -> FillSummary {
    let mut summary = FillSummary::default();
    for column in table.values_mut() {
        let mut next: Option<f64> = None;
        for cell in column.iter_mut().rev() {
            if cell.is_nan() {
                match next {
                    Some(v) => {
                        *cell = v;
                        summary.filled += 1;
                    }
                    None => summary.unresolved += 1,
                }
            } else {
                next = Some(*cell);
            }
        }
    }
    summary
}
