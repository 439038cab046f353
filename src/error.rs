//! Error types for the filtering pipeline
//!
//! Every failure the library can report is a `PipelineError`. The binary maps
//! them onto exit codes in `main.rs`.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure raised by a `LinePredicate` while evaluating a single line.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct PredicateError(pub String);

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to open '{path}': {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read line {line}: {source}")]
    Read {
        /// 1-based line number, for humans.
        line: u64,
        #[source]
        source: io::Error,
    },

    #[error("invalid filter pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("filter failed on line {line}: {source}")]
    Predicate {
        line: u64,
        #[source]
        source: PredicateError,
    },

    #[error("failed to write output: {0}")]
    Output(#[source] io::Error),

    #[error("{stage} channel disconnected")]
    Disconnected { stage: &'static str },

    #[error("{stage} stopped after another stage failed")]
    Aborted { stage: &'static str },

    #[error("internal error: result channel closed after {seen} of {expected} worker markers")]
    MarkerShortfall { seen: usize, expected: usize },

    #[error("internal error: sequence {seq} delivered twice to the sink")]
    DuplicateSequence { seq: u64 },

    #[error(
        "internal error: {buffered} record(s) left in the reorder buffer, stuck waiting for sequence {next_expected} (first buffered: {first_buffered})"
    )]
    UnresolvedPending {
        next_expected: u64,
        buffered: usize,
        first_buffered: u64,
    },

    #[error("internal error: {0}")]
    Incomplete(String),

    #[error("internal error: {0} thread panicked")]
    ThreadPanicked(String),
}

impl PipelineError {
    /// Errors that are only a side effect of another stage failing first.
    ///
    /// When one stage fails it drops its channel ends, and its neighbours
    /// then see a disconnect or a missing marker. Those are reported only if
    /// no stage produced a root cause.
    pub fn is_cascade(&self) -> bool {
        matches!(
            self,
            PipelineError::Disconnected { .. }
                | PipelineError::Aborted { .. }
                | PipelineError::MarkerShortfall { .. }
        )
    }

    /// Configuration errors exit with the usage code instead of the general one.
    pub fn is_usage(&self) -> bool {
        matches!(
            self,
            PipelineError::InvalidPattern { .. } | PipelineError::InvalidConfig(_)
        )
    }

    /// Writing to a closed pipe (`linesift ... | head`).
    pub fn is_broken_pipe(&self) -> bool {
        matches!(self, PipelineError::Output(e) if e.kind() == io::ErrorKind::BrokenPipe)
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
