use crate::engine::types::{AggregationFactor, WideTable};

/// Collapses every `factor` consecutive rows into one.
///
/// Each value is the mean of the group's non-`NaN` cells (`NaN` when none
/// are present). The row timestamp is the group's last timestamp. A trailing
/// short group is aggregated over whatever rows it has.
pub fn aggregate(table: &WideTable, factor: AggregationFactor) -> WideTable {
    let n = factor.get();
    let timestamps = table
        .timestamps()
        .chunks(n)
        .filter_map(|group| group.last().copied())
        .collect();
    let columns = table
        .columns()
        .iter()
        .map(|col| col.chunks(n).map(nan_mean).collect())
        .collect();

    WideTable::from_aligned_parts(table.schema().clone(), timestamps, columns)
}

fn nan_mean(values: &[f64]) -> f64 {
    let (sum, count) = values
        .iter()
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}
