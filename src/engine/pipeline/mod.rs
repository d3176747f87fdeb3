//! Orchestration of one slicing run: fetch, resample, align, aggregate,
//! back-fill, write.

mod report;
mod runner;
mod spec;

#[cfg(test)]
mod spec_test;

pub use report::RunReport;
pub use runner::{Pipeline, RunOutput};
pub use spec::{PipelineSpec, read_sensors_file};
