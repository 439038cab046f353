//! Worker thread for parallel processing
//!
//! Each worker pulls records from the shared work channel, evaluates the
//! predicate and publishes the outcome. Workers never talk to each other.

use crossbeam_channel::{Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{PipelineError, Result};
use crate::filter::LinePredicate;
use crate::stats::WorkerTally;

use super::types::{Outcome, WorkItem};

/// Worker thread: filters records until it receives its marker
///
/// With `forward_discards` set, every rejected record is reported as
/// `Outcome::Dropped` so an ordering sink can advance past it. Once `abort`
/// is raised by a failing stage the worker stops before its next record.
pub(crate) fn worker_thread<P: LinePredicate + ?Sized>(
    worker_id: usize,
    work_receiver: Receiver<WorkItem>,
    result_sender: Sender<Outcome>,
    predicate: &P,
    forward_discards: bool,
    abort: &AtomicBool,
) -> Result<WorkerTally> {
    let mut tally = WorkerTally::default();

    loop {
        let item = work_receiver
            .recv()
            .map_err(|_| PipelineError::Disconnected { stage: "work" })?;

        let outcome = match item {
            WorkItem::Marker => {
                result_sender
                    .send(Outcome::Marker(tally))
                    .map_err(|_| PipelineError::Disconnected { stage: "result" })?;
                tracing::debug!(
                    worker_id,
                    kept = tally.kept,
                    discarded = tally.discarded,
                    "worker finished"
                );
                return Ok(tally);
            }
            WorkItem::Record(_) if abort.load(Ordering::Relaxed) => {
                return Err(PipelineError::Aborted { stage: "worker" });
            }
            WorkItem::Record(record) => {
                let keep = predicate
                    .keep(&record.text)
                    .map_err(|source| PipelineError::Predicate {
                        line: record.seq + 1,
                        source,
                    })?;

                if keep {
                    tally.kept += 1;
                    Outcome::Kept(record)
                } else {
                    tally.discarded += 1;
                    if !forward_discards {
                        continue;
                    }
                    Outcome::Dropped(record.seq)
                }
            }
        };

        result_sender
            .send(outcome)
            .map_err(|_| PipelineError::Disconnected { stage: "result" })?;
    }
}
