pub mod model;


pub use model::{
    LoggingConfig, MalformedRowPolicy, PipelineConfig, ReplayConfig, RowSumConfig, Settings,
    SinkConfig, SinkKind, SourceConfig, SourceKind, TimeConfig, load_settings,
};
