// Core library for the linesift log filter

pub mod cli;
pub mod config;
pub mod config_file;
pub mod decompression;
pub mod error;
pub mod filter;
pub mod logging;
pub mod parallel;
pub mod platform;
pub mod readers;
pub mod runner;
pub mod sequential;
pub mod stats;

pub use cli::Cli;
pub use config::{OutputMode, SiftConfig};
pub use error::{PipelineError, PredicateError};
pub use filter::{CompiledFilter, FilterSpec, LinePredicate};
pub use parallel::{ParallelConfig, ParallelProcessor};
pub use readers::{LineRecord, LineSource};
pub use runner::run_pipeline;
pub use stats::ProcessingStats;
