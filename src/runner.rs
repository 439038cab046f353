//! Entry point tying configuration, input and pipeline together

use std::io::Write;

use crate::config::SiftConfig;
use crate::error::Result;
use crate::parallel::ParallelProcessor;
use crate::readers::LineSource;
use crate::sequential;
use crate::stats::ProcessingStats;

/// Run one complete filtering pass and write the result to `output`.
///
/// The filter is compiled and the input opened before any thread is
/// spawned, so a bad pattern or missing file produces no output at all.
pub fn run_pipeline<W: Write + Send>(config: &SiftConfig, output: &mut W) -> Result<ProcessingStats> {
    let filter = config.filter.compile()?;
    let source = LineSource::open(&config.input.path)?;
    let mode = config.output.mode;

    if config.performance.sequential {
        tracing::debug!(path = %config.input.path.display(), ?mode, "running sequentially");
        return sequential::run(source, &filter, mode, output);
    }

    let processor = ParallelProcessor::new(config.parallel_config());
    tracing::debug!(
        path = %config.input.path.display(),
        workers = processor.config().num_workers,
        "running in parallel"
    );
    processor.process(source, &filter, mode, output)
}
