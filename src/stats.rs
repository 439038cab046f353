use std::fmt;
use std::time::Duration;

use crate::error::{PipelineError, Result};

/// Statistics collected during one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessingStats {
    pub lines_read: u64,
    pub lines_kept: u64,
    pub lines_discarded: u64,
    /// Lines written by the sink (always 0 in count mode).
    pub lines_emitted: u64,
    pub workers: usize,
    /// Largest number of records held in the reorder buffer at once.
    pub max_pending: usize,
    pub elapsed: Duration,
}

/// Per-worker counters, sent to the sink along with the worker's marker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerTally {
    pub kept: u64,
    pub discarded: u64,
}

impl WorkerTally {
    pub fn total(&self) -> u64 {
        self.kept + self.discarded
    }
}

impl ProcessingStats {
    pub fn add_tally(&mut self, tally: &WorkerTally) {
        self.lines_kept += tally.kept;
        self.lines_discarded += tally.discarded;
    }

    /// Every line read must be accounted for exactly once.
    pub fn check_complete(&self) -> Result<()> {
        let accounted = self.lines_kept + self.lines_discarded;
        if accounted != self.lines_read {
            return Err(PipelineError::Incomplete(format!(
                "read {} lines but workers accounted for {} ({} kept, {} discarded)",
                self.lines_read, accounted, self.lines_kept, self.lines_discarded
            )));
        }
        Ok(())
    }

    pub fn lines_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.lines_read as f64 / secs
        } else {
            0.0
        }
    }
}

impl fmt::Display for ProcessingStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Stats:")?;
        writeln!(f, "  Lines read:      {}", self.lines_read)?;
        writeln!(f, "  Lines kept:      {}", self.lines_kept)?;
        writeln!(f, "  Lines discarded: {}", self.lines_discarded)?;
        writeln!(f, "  Lines emitted:   {}", self.lines_emitted)?;
        if self.workers > 0 {
            writeln!(f, "  Workers:         {}", self.workers)?;
            writeln!(f, "  Reorder peak:    {}", self.max_pending)?;
        } else {
            writeln!(f, "  Workers:         sequential")?;
        }
        write!(
            f,
            "  Elapsed:         {:.3}s ({:.0} lines/s)",
            self.elapsed.as_secs_f64(),
            self.lines_per_second()
        )
    }
}
