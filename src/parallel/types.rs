//! Type definitions for parallel processing
//!
//! Contains the messages carried on the work and result channels and the
//! pool configuration.

use crate::readers::LineRecord;
use crate::stats::WorkerTally;

/// Default capacity of the work and result channels.
pub const DEFAULT_BUFFER_SIZE: usize = 10_000;

/// Configuration for parallel processing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParallelConfig {
    pub num_workers: usize,
    pub buffer_size: usize,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            num_workers: num_cpus::get(),
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

impl ParallelConfig {
    pub fn with_workers(mut self, num_workers: usize) -> Self {
        self.num_workers = num_workers;
        self
    }

    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }
}

/// Message type for distributing work to workers
#[derive(Debug)]
pub(crate) enum WorkItem {
    Record(LineRecord),
    /// One per worker; the receiving worker stops after forwarding it.
    Marker,
}

/// Message type for worker results
#[derive(Debug)]
pub(crate) enum Outcome {
    Kept(LineRecord),
    /// The predicate rejected this sequence number. Only sent when the sink
    /// needs it to advance its watermark (print mode).
    Dropped(u64),
    /// Final message from one worker.
    Marker(WorkerTally),
}
