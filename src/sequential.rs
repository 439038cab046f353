//! Single-threaded filtering
//!
//! Reads, filters and writes on the calling thread. Output is identical to
//! the parallel pipeline for the same input and filter.

use std::io::Write;
use std::time::Instant;

use crate::config::OutputMode;
use crate::error::{PipelineError, Result};
use crate::filter::LinePredicate;
use crate::readers::LineRecord;
use crate::stats::ProcessingStats;

pub fn run<I, P, W>(
    source: I,
    predicate: &P,
    mode: OutputMode,
    output: &mut W,
) -> Result<ProcessingStats>
where
    I: IntoIterator<Item = Result<LineRecord>>,
    P: LinePredicate + ?Sized,
    W: Write,
{
    let start = Instant::now();
    let mut stats = ProcessingStats::default();

    for record in source {
        let record = record?;
        stats.lines_read += 1;

        let keep = predicate
            .keep(&record.text)
            .map_err(|source| PipelineError::Predicate {
                line: record.seq + 1,
                source,
            })?;
        if !keep {
            stats.lines_discarded += 1;
            continue;
        }

        stats.lines_kept += 1;
        if mode == OutputMode::Print {
            writeln!(output, "{}", record.text).map_err(PipelineError::Output)?;
            stats.lines_emitted += 1;
        }
    }

    if mode == OutputMode::Count {
        writeln!(output, "{}", stats.lines_kept).map_err(PipelineError::Output)?;
    }
    output.flush().map_err(PipelineError::Output)?;

    stats.elapsed = start.elapsed();
    Ok(stats)
}
