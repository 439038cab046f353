//! Distributor thread: feeds the line source into the work channel
//!
//! There is exactly one distributor per run. It is the only sender on the
//! work channel, so records arrive at the workers in `seq` order.

use crossbeam_channel::Sender;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{PipelineError, Result};
use crate::readers::LineRecord;

use super::types::WorkItem;

/// Push every record, then one marker per worker.
///
/// Returns the number of records pushed. On a read error the remaining
/// markers are not sent: dropping the sender disconnects the channel, which
/// stops the workers without letting the sink mistake a truncated run for a
/// complete one. Reading also stops as soon as `abort` is raised.
pub(crate) fn distributor_thread<I>(
    source: I,
    work_sender: Sender<WorkItem>,
    num_workers: usize,
    abort: &AtomicBool,
) -> Result<u64>
where
    I: IntoIterator<Item = Result<LineRecord>>,
{
    let mut lines_read = 0u64;

    for record in source {
        if abort.load(Ordering::Relaxed) {
            return Err(PipelineError::Aborted { stage: "reader" });
        }
        let record = record?;
        if work_sender.send(WorkItem::Record(record)).is_err() {
            // Every worker has exited; one of them holds the real error.
            return Err(PipelineError::Disconnected { stage: "work" });
        }
        lines_read += 1;
    }

    for _ in 0..num_workers {
        if work_sender.send(WorkItem::Marker).is_err() {
            return Err(PipelineError::Disconnected { stage: "work" });
        }
    }

    tracing::debug!(lines_read, markers = num_workers, "distributor finished");
    Ok(lines_read)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::{bounded, unbounded};
    use std::io;

    fn records(texts: &[&str]) -> Vec<Result<LineRecord>> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| Ok(LineRecord::new(i as u64, *t)))
            .collect()
    }

    #[test]
    fn test_pushes_records_then_one_marker_per_worker() {
        let (tx, rx) = unbounded();
        let abort = AtomicBool::new(false);
        let read = distributor_thread(records(&["a", "b", "c"]), tx, 4, &abort).unwrap();
        assert_eq!(read, 3);

        let items: Vec<WorkItem> = rx.iter().collect();
        assert_eq!(items.len(), 7);
        for (i, item) in items.iter().take(3).enumerate() {
            match item {
                WorkItem::Record(r) => assert_eq!(r.seq, i as u64),
                WorkItem::Marker => panic!("marker before end of input"),
            }
        }
        assert!(items[3..].iter().all(|i| matches!(i, WorkItem::Marker)));
    }

    #[test]
    fn test_empty_source_still_sends_markers() {
        let (tx, rx) = unbounded();
        let abort = AtomicBool::new(false);
        let read = distributor_thread(Vec::new(), tx, 2, &abort).unwrap();
        assert_eq!(read, 0);
        assert_eq!(rx.iter().count(), 2);
    }

    #[test]
    fn test_read_error_withholds_markers() {
        let (tx, rx) = unbounded();
        let source = vec![
            Ok(LineRecord::new(0, "ok")),
            Err(PipelineError::Read {
                line: 2,
                source: io::Error::from(io::ErrorKind::InvalidData),
            }),
        ];
        let abort = AtomicBool::new(false);
        let err = distributor_thread(source, tx, 3, &abort).unwrap_err();
        assert!(matches!(err, PipelineError::Read { line: 2, .. }));

        let items: Vec<WorkItem> = rx.iter().collect();
        assert_eq!(items.len(), 1);
        assert!(matches!(items[0], WorkItem::Record(_)));
    }

    #[test]
    fn test_disconnected_workers() {
        let (tx, rx) = bounded(1);
        drop(rx);
        let abort = AtomicBool::new(false);
        let err = distributor_thread(records(&["a"]), tx, 1, &abort).unwrap_err();
        assert!(err.is_cascade());
    }

    #[test]
    fn test_abort_stops_reading() {
        let (tx, rx) = unbounded();
        let abort = AtomicBool::new(true);
        let err = distributor_thread(records(&["a", "b"]), tx, 2, &abort).unwrap_err();
        assert!(matches!(err, PipelineError::Aborted { stage: "reader" }));
        assert_eq!(rx.iter().count(), 0);
    }
}
