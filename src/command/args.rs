use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "sensor_slicer")]
#[command(about = "Resample, align and aggregate sensor series into wide tables", long_about = None)]
pub struct Cli {
    /// Settings file (without extension). Falls back to SLICER_CONFIG, then `config`
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run one slicing pass from the source to the sink
    Slice(SliceArgs),
    /// Re-emit a stored table row by row into another table
    Replay(ReplayArgs),
    /// Sum the newest row of a table into a running sum table
    RowSum(RowSumArgs),
    /// List the tables of a columnar store
    Tables(TablesArgs),
}

#[derive(Debug, Args, Default)]
pub struct SliceArgs {
    /// Window start, e.g. "2021-06-01 00:00:00"
    #[arg(long)]
    pub start: Option<String>,

    /// Window end (exclusive on the output grid)
    #[arg(long)]
    pub end: Option<String>,

    /// Sink path: CSV file, SQLite database, or columnar store root
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Comma-separated sensor ids, replacing the configured list
    #[arg(long, value_delimiter = ',')]
    pub sensors: Vec<String>,

    /// File with one sensor id per line
    #[arg(long)]
    pub sensors_file: Option<PathBuf>,
}

#[derive(Debug, Args, Default)]
pub struct ReplayArgs {
    #[arg(long)]
    pub source_table: Option<String>,

    #[arg(long)]
    pub target_table: Option<String>,

    /// Pause between rows, e.g. "5s"
    #[arg(long, value_parser = humantime::parse_duration)]
    pub interval: Option<Duration>,

    /// Stop after one pass over the source table
    #[arg(long)]
    pub once: bool,
}

#[derive(Debug, Args, Default)]
pub struct RowSumArgs {
    #[arg(long)]
    pub source_table: Option<String>,

    #[arg(long)]
    pub target_table: Option<String>,

    #[arg(long, value_parser = humantime::parse_duration)]
    pub interval: Option<Duration>,
}

#[derive(Debug, Args, Default)]
pub struct TablesArgs {
    /// Store root; defaults to the replay root from the settings
    #[arg(long)]
    pub root: Option<PathBuf>,
}

impl Cli {
    /// Settings overrides implied by the command line, as `config` keys.
    pub fn overrides(&self) -> Vec<(&'static str, String)> {
        let mut out = Vec::new();
        match &self.command {
            Commands::Slice(args) => {
                if let Some(start) = &args.start {
                    out.push(("pipeline.start", start.clone()));
                }
                if let Some(end) = &args.end {
                    out.push(("pipeline.end", end.clone()));
                }
                if let Some(path) = &args.output {
                    out.push(("sink.path", path.display().to_string()));
                }
                if let Some(path) = &args.sensors_file {
                    out.push(("pipeline.sensors_file", path.display().to_string()));
                }
            }
            Commands::Replay(args) => {
                if let Some(name) = &args.source_table {
                    out.push(("replay.source_table", name.clone()));
                }
                if let Some(name) = &args.target_table {
                    out.push(("replay.target_table", name.clone()));
                }
                if let Some(interval) = args.interval {
                    out.push(("replay.interval", humantime::format_duration(interval).to_string()));
                }
                if args.once {
                    out.push(("replay.repeat", "false".to_string()));
                }
            }
            Commands::RowSum(args) => {
                if let Some(name) = &args.source_table {
                    out.push(("row_sum.source_table", name.clone()));
                }
                if let Some(name) = &args.target_table {
                    out.push(("row_sum.target_table", name.clone()));
                }
                if let Some(interval) = args.interval {
                    out.push(("row_sum.interval", humantime::format_duration(interval).to_string()));
                }
            }
            Commands::Tables(_) => {}
        }
        out
    }
}
