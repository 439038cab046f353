//! Main parallel processor
//!
//! Wires one distributor, `num_workers` workers and one sink together with
//! two bounded channels and owns their lifecycle.

use crossbeam_channel::bounded;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, ScopedJoinHandle};
use std::time::Instant;

use crate::config::OutputMode;
use crate::error::{PipelineError, Result};
use crate::filter::LinePredicate;
use crate::readers::LineRecord;
use crate::stats::ProcessingStats;

use super::distributor::distributor_thread;
use super::sink::sink_thread;
use super::types::ParallelConfig;
use super::worker::worker_thread;

/// Main parallel processor
#[derive(Debug, Clone)]
pub struct ParallelProcessor {
    config: ParallelConfig,
}

impl ParallelProcessor {
    pub fn new(config: ParallelConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ParallelConfig {
        &self.config
    }

    /// Run the pipeline to completion.
    ///
    /// The predicate must already be compiled; it is shared by reference with
    /// every worker. Returns once all threads have been joined.
    pub fn process<I, P, W>(
        &self,
        source: I,
        predicate: &P,
        mode: OutputMode,
        output: &mut W,
    ) -> Result<ProcessingStats>
    where
        I: IntoIterator<Item = Result<LineRecord>> + Send,
        P: LinePredicate + ?Sized,
        W: Write + Send,
    {
        let num_workers = self.config.num_workers;
        if num_workers == 0 {
            return Err(PipelineError::InvalidConfig(
                "worker count must be at least 1".to_string(),
            ));
        }
        if self.config.buffer_size == 0 {
            return Err(PipelineError::InvalidConfig(
                "buffer size must be at least 1".to_string(),
            ));
        }

        let start = Instant::now();
        let (work_sender, work_receiver) = bounded(self.config.buffer_size);
        let (result_sender, result_receiver) = bounded(self.config.buffer_size);
        let forward_discards = matches!(mode, OutputMode::Print);
        // Raised by the first stage to fail so the others stop early.
        let abort = &AtomicBool::new(false);

        tracing::debug!(
            workers = num_workers,
            buffer_size = self.config.buffer_size,
            ?mode,
            "starting parallel pipeline"
        );

        let (reader_result, worker_results, sink_result) = thread::scope(|scope| {
            let reader_handle = thread::Builder::new()
                .name("linesift-reader".to_string())
                .spawn_scoped(scope, move || {
                    let result = distributor_thread(source, work_sender, num_workers, abort);
                    raise_on_error(abort, result)
                });

            let mut worker_handles = Vec::with_capacity(num_workers);
            for worker_id in 0..num_workers {
                let work_receiver = work_receiver.clone();
                let result_sender = result_sender.clone();
                let handle = thread::Builder::new()
                    .name(format!("linesift-worker-{worker_id}"))
                    .spawn_scoped(scope, move || {
                        let result = worker_thread(
                            worker_id,
                            work_receiver,
                            result_sender,
                            predicate,
                            forward_discards,
                            abort,
                        );
                        raise_on_error(abort, result)
                    });
                worker_handles.push(handle);
            }

            // Only the threads may hold channel ends, or a failed stage could
            // never be observed as a disconnect by its neighbours.
            drop(work_receiver);
            drop(result_sender);

            let sink_handle = thread::Builder::new()
                .name("linesift-sink".to_string())
                .spawn_scoped(scope, move || {
                    let result = sink_thread(result_receiver, mode, num_workers, output);
                    raise_on_error(abort, result)
                });

            let reader_result = join_stage("reader", reader_handle);
            let worker_results: Vec<_> = worker_handles
                .into_iter()
                .enumerate()
                .map(|(id, handle)| join_stage(&format!("worker-{id}"), handle))
                .collect();
            let sink_result = join_stage("sink", sink_handle);

            (reader_result, worker_results, sink_result)
        });

        let mut failures = Vec::new();
        let lines_read = reader_result.map_err(|e| failures.push(e)).ok();
        let mut worker_tallies = Vec::with_capacity(num_workers);
        for result in worker_results {
            match result {
                Ok(tally) => worker_tallies.push(tally),
                Err(e) => failures.push(e),
            }
        }
        let summary = sink_result.map_err(|e| failures.push(e)).ok();

        if let Some(err) = root_cause(failures) {
            tracing::debug!(error = %err, "parallel pipeline failed");
            return Err(err);
        }

        // All stages succeeded, so every value is present.
        let (Some(lines_read), Some(summary)) = (lines_read, summary) else {
            return Err(PipelineError::Incomplete(
                "pipeline stage finished without a result".to_string(),
            ));
        };

        let mut stats = ProcessingStats {
            lines_read,
            lines_emitted: summary.emitted,
            workers: num_workers,
            max_pending: summary.max_pending,
            elapsed: start.elapsed(),
            ..Default::default()
        };
        for tally in &worker_tallies {
            stats.add_tally(tally);
        }

        stats.check_complete()?;
        if summary.tally.total() != stats.lines_kept + stats.lines_discarded {
            return Err(PipelineError::Incomplete(format!(
                "sink saw markers for {} lines, workers processed {}",
                summary.tally.total(),
                stats.lines_kept + stats.lines_discarded
            )));
        }
        if summary.kept != stats.lines_kept {
            return Err(PipelineError::Incomplete(format!(
                "workers kept {} lines but the sink received {}",
                stats.lines_kept, summary.kept
            )));
        }
        if mode == OutputMode::Print && summary.emitted != summary.kept {
            return Err(PipelineError::Incomplete(format!(
                "sink received {} kept lines but emitted {}",
                summary.kept, summary.emitted
            )));
        }

        tracing::debug!(
            lines_read = stats.lines_read,
            kept = stats.lines_kept,
            max_pending = stats.max_pending,
            elapsed_ms = stats.elapsed.as_millis() as u64,
            "parallel pipeline finished"
        );
        Ok(stats)
    }
}

/// Join a stage, turning a spawn failure or a panic into an error.
fn join_stage<T>(
    name: &str,
    handle: std::io::Result<ScopedJoinHandle<'_, Result<T>>>,
) -> Result<T> {
    let handle = handle.map_err(|e| {
        PipelineError::Incomplete(format!("failed to spawn {name} thread: {e}"))
    })?;
    handle
        .join()
        .map_err(|_| PipelineError::ThreadPanicked(name.to_string()))?
}

fn raise_on_error<T>(abort: &AtomicBool, result: Result<T>) -> Result<T> {
    if result.is_err() {
        abort.store(true, Ordering::Relaxed);
    }
    result
}

/// First error that is not just a consequence of another stage failing.
fn root_cause(failures: Vec<PipelineError>) -> Option<PipelineError> {
    let mut cascade = None;
    for err in failures {
        if !err.is_cascade() {
            return Some(err);
        }
        cascade.get_or_insert(err);
    }
    cascade
}
