// CLI-specific types and structures
// This module contains the command-line interface definitions

use clap::builder::RangedU64ValueParser;
use clap::{ArgAction, Parser};
use std::path::PathBuf;

use crate::config::OutputMode;
use crate::parallel::DEFAULT_BUFFER_SIZE;

// CLI structure - contains all command-line arguments and options
#[derive(Parser, Debug)]
#[command(name = "linesift")]
#[command(about = "Filter log lines in parallel, keeping the original order")]
#[command(
    long_about = "Filter log lines in parallel, keeping the original order\n\nEvery line is matched against a regular expression by a pool of worker threads.\nKept lines are printed in input order, or counted with -F count.\nGzip and zstd compressed input is detected automatically.\n\nCOMMON EXAMPLES:\n  linesift app.log -p ERROR\n  linesift app.log -p 'healthcheck' -v -F count\n  zcat old.log.gz | linesift -p 'user=\\d+' --threads 8\n\nConfiguration precedence: CLI > config file defaults/aliases > LINESIFT_* environment > .env > built-in defaults"
)]
#[command(version)]
#[command(args_override_self = true)]
pub struct Cli {
    /// Input file ("-" or omitted for stdin)
    pub input: Option<PathBuf>,

    /// Input file, same as the positional argument
    #[arg(
        short = 'i',
        long = "input",
        env = "LINESIFT_INPUT",
        help_heading = "Input Options"
    )]
    pub input_flag: Option<PathBuf>,

    /// Regular expression a line must match to be kept (all lines are kept when absent)
    #[arg(
        short = 'p',
        long = "filter-pattern",
        env = "LINESIFT_PATTERN",
        help_heading = "Filtering Options"
    )]
    pub filter_pattern: Option<String>,

    /// Keep the lines that do NOT match the pattern
    #[arg(
        short = 'v',
        long = "invert",
        env = "LINESIFT_INVERT",
        help_heading = "Filtering Options"
    )]
    pub invert: bool,

    /// Match the pattern case-insensitively
    #[arg(long = "ignore-case", help_heading = "Filtering Options")]
    pub ignore_case: bool,

    /// Print kept lines in input order, or only their count
    #[arg(
        short = 'F',
        long = "output-format",
        value_enum,
        ignore_case = true,
        default_value = "print",
        env = "LINESIFT_OUTPUT_FORMAT",
        help_heading = "Output Options"
    )]
    pub output_format: OutputMode,

    /// Print processing statistics to stderr when done
    #[arg(short = 's', long = "stats", help_heading = "Output Options")]
    pub stats: bool,

    /// Number of filter workers (0 = one per CPU)
    #[arg(
        long = "threads",
        default_value_t = 0,
        env = "LINESIFT_THREADS",
        help_heading = "Performance Options"
    )]
    pub threads: usize,

    /// Capacity of the work and result queues
    #[arg(
        long = "buffer-size",
        default_value_t = DEFAULT_BUFFER_SIZE,
        value_parser = RangedU64ValueParser::<usize>::new().range(1..),
        env = "LINESIFT_BUFFER_SIZE",
        help_heading = "Performance Options"
    )]
    pub buffer_size: usize,

    /// Filter on the main thread without a worker pool
    #[arg(long = "sequential", help_heading = "Performance Options")]
    pub sequential: bool,

    /// Diagnostic output on stderr (repeat for more detail)
    #[arg(long = "verbose", action = ArgAction::Count, help_heading = "Display Options")]
    pub verbose: u8,

    /// Expand an alias from the configuration file
    #[arg(short = 'a', long = "alias", help_heading = "Configuration Options")]
    pub alias: Vec<String>,

    /// Use this configuration file instead of searching for one
    #[arg(long = "config-file", help_heading = "Configuration Options")]
    pub config_file: Option<String>,

    /// Ignore configuration files and .env
    #[arg(long = "ignore-config", help_heading = "Configuration Options")]
    pub ignore_config: bool,

    /// Show configuration file locations and active settings, then exit
    #[arg(long = "show-config", help_heading = "Configuration Options")]
    pub show_config: bool,
}
