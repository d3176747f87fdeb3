pub mod core;
pub mod errors;
pub mod materialize;
pub mod pipeline;
pub mod replay;
pub mod sink;
pub mod source;
pub mod types;

pub use errors::*;
