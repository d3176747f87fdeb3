use chrono::{DateTime, TimeDelta, Utc};

use crate::engine::types::Observation;

/// Linear estimate of the series at `at`.
///
/// `observations` must be sorted by timestamp. Queries outside the observed
/// range clamp to the first or last value. When several observations share a
/// timestamp the last one wins. Returns `None` for an empty series.
pub fn estimate(observations: &[Observation], at: DateTime<Utc>) -> Option<f64> {
    let first = observations.first()?;

    // Index of the first observation strictly after `at`.
    let upper = observations.partition_point(|o| o.timestamp <= at);

    if upper == 0 {
        return Some(last_sharing_timestamp(observations, first.timestamp).value);
    }

    let left = observations[upper - 1];
    if upper == observations.len() || left.timestamp == at {
        return Some(left.value);
    }

    let right = last_sharing_timestamp(&observations[upper..], observations[upper].timestamp);
    let span = seconds(right.timestamp - left.timestamp);
    let offset = seconds(at - left.timestamp);
    Some(left.value + (right.value - left.value) * (offset / span))
}

fn last_sharing_timestamp(observations: &[Observation], ts: DateTime<Utc>) -> Observation {
    let end = observations.partition_point(|o| o.timestamp <= ts);
    observations[end - 1]
}

fn seconds(delta: TimeDelta) -> f64 {
    delta.num_seconds() as f64 + f64::from(delta.subsec_nanos()) * 1e-9
}
