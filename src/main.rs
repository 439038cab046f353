use clap::Parser;
use std::io::{self, BufWriter};

use linesift::cli::Cli;
use linesift::config::{format_error_message, SiftConfig};
use linesift::config_file::{ConfigFile, DotEnv};
use linesift::logging;
use linesift::platform::{ExitCode, SafeStderr};
use linesift::run_pipeline;

/// Find `--config-file PATH` or `--config-file=PATH` before clap runs.
fn extract_config_file_arg(args: &[String]) -> Option<String> {
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--config-file" {
            return iter.next().cloned();
        }
        if let Some(path) = arg.strip_prefix("--config-file=") {
            return Some(path.to_string());
        }
    }
    None
}

/// Apply `.env`, config-file defaults and aliases to the raw arguments.
fn process_args_with_config(stderr: &mut SafeStderr) -> Vec<String> {
    let raw_args: Vec<String> = std::env::args().collect();

    if raw_args.iter().any(|arg| arg == "--show-config") {
        ConfigFile::show_config();
        ExitCode::Success.exit();
    }

    if raw_args.iter().any(|arg| arg == "--ignore-config") {
        return raw_args;
    }

    // Still single-threaded here, so mutating the environment is safe.
    match DotEnv::load_from_cwd() {
        Ok(Some(dotenv)) => {
            dotenv.apply();
        }
        Ok(None) => {}
        Err(e) => {
            stderr.writeln(&format_error_message(&format!("{:#}", e)));
            ExitCode::InvalidUsage.exit();
        }
    }

    let config_file_path = extract_config_file_arg(&raw_args);
    match ConfigFile::load_with_custom_path(config_file_path.as_deref())
        .and_then(|config_file| config_file.process_args(raw_args))
    {
        Ok(processed) => processed,
        Err(e) => {
            stderr.writeln(&format!("linesift: Config error: {:#}", e));
            ExitCode::InvalidUsage.exit();
        }
    }
}

fn main() {
    let mut stderr = SafeStderr::new();

    let args = process_args_with_config(&mut stderr);
    let cli = Cli::try_parse_from(&args).unwrap_or_else(|e| e.exit());

    logging::init(cli.verbose);

    if let Some(name) = cli.alias.first() {
        let message = if cli.ignore_config {
            "aliases come from configuration files and cannot be used with --ignore-config"
                .to_string()
        } else {
            format!("alias '{}' was not expanded", name)
        };
        stderr.writeln(&format_error_message(&message));
        ExitCode::InvalidUsage.exit();
    }

    let config = SiftConfig::from_cli(&cli);
    tracing::debug!(?config, "resolved configuration");

    let mut output = BufWriter::new(io::stdout());
    match run_pipeline(&config, &mut output) {
        Ok(stats) => {
            if config.output.stats {
                stderr.writeln(&stats.to_string());
            }
        }
        Err(err) => {
            let code = ExitCode::for_error(&err);
            if code != ExitCode::SignalPipe {
                stderr.writeln(&format_error_message(&err.to_string()));
            }
            code.exit();
        }
    }
}
