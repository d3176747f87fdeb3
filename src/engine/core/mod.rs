//! Resampling and aggregation: the numeric heart of a slicing run.
//!
//! Data flows `interpolate -> resample -> align -> aggregate -> gap_fill`.
//! Every function here is pure and synchronous; I/O lives in `source` and
//! `sink`.

pub mod aggregate;
pub mod align;
pub mod gap_fill;
pub mod interpolate;
pub mod resample;

#[cfg(test)]
mod align_test;
#[cfg(test)]
mod resample_test;

pub use aggregate::aggregate;
pub use align::align;
pub use gap_fill::{FillSummary, fill};
pub use interpolate::estimate;
pub use resample::Resampler;
