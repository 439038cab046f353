//! Result sink thread for parallel processing
//!
//! Counts kept lines, or writes them back in original input order. Workers
//! race, so outcomes arrive in arbitrary order; the ordered sink restores it
//! with a watermark (`next_expected`) and a sparse buffer of early arrivals.

use crossbeam_channel::Receiver;
use std::collections::HashMap;
use std::io::Write;

use crate::config::OutputMode;
use crate::error::{PipelineError, Result};
use crate::stats::WorkerTally;

use super::types::Outcome;

/// What the sink observed, handed back to the processor for stats.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct SinkSummary {
    pub kept: u64,
    pub emitted: u64,
    pub max_pending: usize,
    /// Sum of the tallies carried by the worker markers.
    pub tally: WorkerTally,
}

/// Watermark plus buffer of outcomes that arrived ahead of their turn.
///
/// A buffered entry of `None` is a dropped line: it emits nothing but must
/// still be passed for the watermark to move on.
#[derive(Debug, Default)]
pub(crate) struct ReorderBuffer {
    next_expected: u64,
    pending: HashMap<u64, Option<String>>,
    max_pending: usize,
}

impl ReorderBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_expected(&self) -> u64 {
        self.next_expected
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn max_pending(&self) -> usize {
        self.max_pending
    }

    /// Accept the outcome for `seq` and emit everything that is now in order.
    pub fn accept<F>(&mut self, seq: u64, text: Option<String>, emit: &mut F) -> Result<()>
    where
        F: FnMut(&str) -> Result<()>,
    {
        if seq < self.next_expected || self.pending.contains_key(&seq) {
            return Err(PipelineError::DuplicateSequence { seq });
        }

        if seq != self.next_expected {
            self.pending.insert(seq, text);
            self.max_pending = self.max_pending.max(self.pending.len());
            tracing::trace!(seq, next_expected = self.next_expected, "buffered out of order");
            return Ok(());
        }

        if let Some(text) = text {
            emit(&text)?;
        }
        self.next_expected += 1;
        self.drain(emit)
    }

    /// Emit the run of buffered successors of the watermark, if any.
    fn drain<F>(&mut self, emit: &mut F) -> Result<()>
    where
        F: FnMut(&str) -> Result<()>,
    {
        while let Some(entry) = self.pending.remove(&self.next_expected) {
            if let Some(text) = entry {
                emit(&text)?;
            }
            self.next_expected += 1;
        }
        Ok(())
    }

    /// Terminal drain. Anything still buffered afterwards means a sequence
    /// number was lost upstream.
    pub fn finish<F>(&mut self, emit: &mut F) -> Result<()>
    where
        F: FnMut(&str) -> Result<()>,
    {
        self.drain(emit)?;

        if let Some(&first_buffered) = self.pending.keys().min() {
            tracing::warn!(
                next_expected = self.next_expected,
                buffered = self.pending.len(),
                "reorder buffer not empty at shutdown"
            );
            return Err(PipelineError::UnresolvedPending {
                next_expected: self.next_expected,
                buffered: self.pending.len(),
                first_buffered,
            });
        }
        Ok(())
    }
}

/// Pipeline result sink thread: runs until every worker's marker has arrived
pub(crate) fn sink_thread<W: Write>(
    result_receiver: Receiver<Outcome>,
    mode: OutputMode,
    num_workers: usize,
    output: &mut W,
) -> Result<SinkSummary> {
    let summary = match mode {
        OutputMode::Count => count_result_sink(&result_receiver, num_workers, output)?,
        OutputMode::Print => ordered_result_sink(&result_receiver, num_workers, output)?,
    };
    output.flush().map_err(PipelineError::Output)?;
    tracing::debug!(
        kept = summary.kept,
        emitted = summary.emitted,
        max_pending = summary.max_pending,
        "sink finished"
    );
    Ok(summary)
}

/// Count sink - arrival order is irrelevant to a sum
fn count_result_sink<W: Write>(
    result_receiver: &Receiver<Outcome>,
    num_workers: usize,
    output: &mut W,
) -> Result<SinkSummary> {
    let mut summary = SinkSummary::default();
    let mut markers_seen = 0usize;

    while markers_seen < num_workers {
        let outcome = result_receiver
            .recv()
            .map_err(|_| PipelineError::MarkerShortfall {
                seen: markers_seen,
                expected: num_workers,
            })?;

        match outcome {
            Outcome::Kept(_) => summary.kept += 1,
            Outcome::Dropped(_) => {}
            Outcome::Marker(tally) => {
                markers_seen += 1;
                summary.tally.kept += tally.kept;
                summary.tally.discarded += tally.discarded;
            }
        }
    }

    writeln!(output, "{}", summary.kept).map_err(PipelineError::Output)?;
    Ok(summary)
}

/// Ordered sink - writes kept lines strictly by sequence number
fn ordered_result_sink<W: Write>(
    result_receiver: &Receiver<Outcome>,
    num_workers: usize,
    output: &mut W,
) -> Result<SinkSummary> {
    let mut summary = SinkSummary::default();
    let mut reorder = ReorderBuffer::new();
    let mut markers_seen = 0usize;
    let mut emitted = 0u64;

    let mut emit = |line: &str| -> Result<()> {
        writeln!(output, "{}", line).map_err(PipelineError::Output)?;
        emitted += 1;
        Ok(())
    };

    while markers_seen < num_workers {
        let outcome = result_receiver
            .recv()
            .map_err(|_| PipelineError::MarkerShortfall {
                seen: markers_seen,
                expected: num_workers,
            })?;

        match outcome {
            Outcome::Kept(record) => {
                summary.kept += 1;
                reorder.accept(record.seq, Some(record.text), &mut emit)?;
            }
            Outcome::Dropped(seq) => reorder.accept(seq, None, &mut emit)?,
            Outcome::Marker(tally) => {
                markers_seen += 1;
                summary.tally.kept += tally.kept;
                summary.tally.discarded += tally.discarded;
            }
        }
    }

    reorder.finish(&mut emit)?;

    summary.emitted = emitted;
    summary.max_pending = reorder.max_pending();
    Ok(summary)
}
