use clap::ValueEnum;
use std::path::PathBuf;

use crate::cli::Cli;
use crate::filter::FilterSpec;
use crate::parallel::{ParallelConfig, DEFAULT_BUFFER_SIZE};
use crate::readers::STDIN_PATH;

/// Main configuration struct for linesift
#[derive(Debug, Clone)]
pub struct SiftConfig {
    pub input: InputConfig,
    pub filter: FilterSpec,
    pub output: OutputConfig,
    pub performance: PerformanceConfig,
}

/// Input configuration
#[derive(Debug, Clone)]
pub struct InputConfig {
    /// `-` reads stdin.
    pub path: PathBuf,
}

/// Output configuration
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub mode: OutputMode,
    pub stats: bool,
}

/// Performance configuration
#[derive(Debug, Clone)]
pub struct PerformanceConfig {
    /// 0 means one worker per CPU.
    pub threads: usize,
    pub buffer_size: usize,
    pub sequential: bool,
}

/// What the sink produces
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputMode {
    /// Kept lines, in original order
    #[default]
    Print,
    /// Number of kept lines
    Count,
}

impl SiftConfig {
    /// Create configuration from CLI arguments
    pub fn from_cli(cli: &Cli) -> Self {
        let path = cli
            .input_flag
            .clone()
            .or_else(|| cli.input.clone())
            .unwrap_or_else(|| PathBuf::from(STDIN_PATH));

        Self {
            input: InputConfig { path },
            filter: FilterSpec::new(cli.filter_pattern.clone(), cli.invert)
                .with_ignore_case(cli.ignore_case),
            output: OutputConfig {
                mode: cli.output_format,
                stats: cli.stats,
            },
            performance: PerformanceConfig {
                threads: cli.threads,
                buffer_size: cli.buffer_size,
                sequential: cli.sequential,
            },
        }
    }

    /// Get effective thread count with defaults
    pub fn effective_threads(&self) -> usize {
        if self.performance.threads == 0 {
            num_cpus::get()
        } else {
            self.performance.threads
        }
    }

    pub fn parallel_config(&self) -> ParallelConfig {
        ParallelConfig {
            num_workers: self.effective_threads(),
            buffer_size: self.performance.buffer_size,
        }
    }
}

impl Default for SiftConfig {
    fn default() -> Self {
        Self {
            input: InputConfig {
                path: PathBuf::from(STDIN_PATH),
            },
            filter: FilterSpec::default(),
            output: OutputConfig {
                mode: OutputMode::Print,
                stats: false,
            },
            performance: PerformanceConfig {
                threads: 0,
                buffer_size: DEFAULT_BUFFER_SIZE,
                sequential: false,
            },
        }
    }
}

/// Format an error message with the program prefix
pub fn format_error_message(message: &str) -> String {
    format!("linesift: Error: {}", message)
}
