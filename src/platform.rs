use std::io::{self, Write};
use std::process;

use crate::error::PipelineError;

/// Standard Unix exit codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    InvalidUsage = 2,
    SignalPipe = 141, // 128 + SIGPIPE (13)
}

impl ExitCode {
    pub fn exit(self) -> ! {
        process::exit(self as i32)
    }

    /// Exit code for a failed run.
    pub fn for_error(err: &PipelineError) -> Self {
        if err.is_broken_pipe() {
            ExitCode::SignalPipe
        } else if err.is_usage() {
            ExitCode::InvalidUsage
        } else {
            ExitCode::GeneralError
        }
    }
}

/// Safe wrapper for writing diagnostics to stderr
pub struct SafeStderr {
    stderr: io::Stderr,
}

impl SafeStderr {
    pub fn new() -> Self {
        Self {
            stderr: io::stderr(),
        }
    }

    /// Write a line to stderr. If stderr itself is gone there is nobody left
    /// to tell, so the process exits.
    pub fn writeln(&mut self, data: &str) {
        if writeln!(self.stderr, "{}", data).is_err() {
            ExitCode::GeneralError.exit();
        }
    }
}

impl Default for SafeStderr {
    fn default() -> Self {
        Self::new()
    }
}
