//! Parallel execution: fixed worker pool over disjoint batches.
//!
//! # Architecture
//!
//! ```text
//!            dispatcher thread                    driver (calling) thread
//!                  │                                        ▲
//!         bounded batch channel                   outcome channel (MPSC)
//!                  │                                        │
//!        ┌─────────┼─────────┐                    ┌─────────┴─────────┐
//!        ▼         ▼         ▼                    │                   │
//!     Worker 0  Worker 1  Worker N ───────────────┘     Aggregator (single
//!     (private result buffer each)                       merge point)
//! ```
//!
//! - Workers are scoped threads, so the candidate slice and reference
//!   snapshot are shared by plain borrow; nothing is copied per worker and
//!   references need no locking (read-only).
//! - The batch channel is bounded at `2 × workers`, giving the dispatcher
//!   backpressure instead of an unbounded queue.
//! - Each worker owns its in-progress batch and result buffer exclusively;
//!   completed [`BatchOutcome`]s flow to the driver thread, which is the only
//!   thread that touches the aggregator. No partial interleaved writes.
//!
//! # Correctness invariants
//!
//! - **Work-conserving**: every dispatched batch is processed and merged,
//!   including in-flight batches at cancellation time.
//! - **Set determinism**: the merged result set is identical to the
//!   sequential path's for the same inputs; only arrival order differs, and
//!   the final sort erases that.
//! - **Termination**: the dispatcher closes the batch channel when done (or
//!   cancelled); workers drain and exit; the outcome channel closes when the
//!   last worker drops its sender, ending the driver's merge loop.
//! - **Panic propagation**: a panicking worker is surfaced when the scope
//!   joins, never silently swallowed.

use crossbeam_channel::{bounded, unbounded};
use std::thread;

use crate::aggregate::{Aggregator, BatchOutcome};
use crate::api::{CandidateRecord, CancelToken, RunStatus};
use crate::matcher::{filter_batch, ReferenceSet};
use crate::scheduler::batching::{Batch, BatchIter};

/// Drive all batches through a pool of `workers` threads.
///
/// Blocks until every dispatched batch is merged. Returns
/// [`RunStatus::Partial`] if `cancel` fired between batch dispatches,
/// [`RunStatus::Completed`] otherwise.
pub fn run_parallel(
    candidates: &[CandidateRecord],
    references: &ReferenceSet,
    min: u32,
    max: u32,
    batch_size: usize,
    workers: usize,
    cancel: &CancelToken,
    aggregator: &mut Aggregator<'_>,
) -> RunStatus {
    debug_assert!(workers >= 1, "worker pool must not be empty");

    let (batch_tx, batch_rx) = bounded::<Batch>(workers.saturating_mul(2));
    let (outcome_tx, outcome_rx) = unbounded::<BatchOutcome>();

    let mut cancelled = false;

    thread::scope(|scope| {
        for _ in 0..workers {
            let batch_rx = batch_rx.clone();
            let outcome_tx = outcome_tx.clone();
            scope.spawn(move || {
                for batch in batch_rx.iter() {
                    let slice = &candidates[batch.range.clone()];
                    let results = filter_batch(slice, references, min, max);
                    let outcome = BatchOutcome {
                        batch_index: batch.index,
                        processed: slice.len() as u64,
                        results,
                    };
                    if outcome_tx.send(outcome).is_err() {
                        // Driver is gone; nothing left to merge into.
                        break;
                    }
                }
            });
        }
        // The driver keeps neither channel end it doesn't need: workers hold
        // the only batch receivers and outcome senders from here on.
        drop(batch_rx);
        drop(outcome_tx);

        let dispatcher = scope.spawn(move || {
            for batch in BatchIter::new(candidates.len(), batch_size) {
                // Cancellation is only observed between dispatches; an
                // in-flight batch always completes and gets merged.
                if cancel.is_cancelled() {
                    return true;
                }
                if batch_tx.send(batch).is_err() {
                    // All workers exited early; treat as cancellation.
                    return true;
                }
            }
            false
        });

        // Single merge point: this thread is the only one that ever touches
        // the aggregator.
        for outcome in outcome_rx.iter() {
            aggregator.merge(outcome);
        }

        cancelled = dispatcher.join().expect("batch dispatcher panicked");
    });

    if cancelled {
        RunStatus::Partial
    } else {
        RunStatus::Completed
    }
}
