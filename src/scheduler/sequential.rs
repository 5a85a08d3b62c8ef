//! Sequential execution: one logical worker, batches in candidate order.
//!
//! The loop is the reference semantics for the engine: parallel execution
//! must produce the same result *set* (order restored by the final sort).
//! Results are merged into the aggregator synchronously after each batch, so
//! progress reporting is exact and cancellation takes effect at the next
//! batch boundary.

use crate::aggregate::{Aggregator, BatchOutcome};
use crate::api::{CandidateRecord, CancelToken, RunStatus};
use crate::matcher::{filter_batch, ReferenceSet};
use crate::scheduler::batching::BatchIter;

/// Drive all batches on the calling thread.
///
/// Returns [`RunStatus::Partial`] if `cancel` fired between batches,
/// [`RunStatus::Completed`] otherwise.
pub fn run_sequential(
    candidates: &[CandidateRecord],
    references: &ReferenceSet,
    min: u32,
    max: u32,
    batch_size: usize,
    cancel: &CancelToken,
    aggregator: &mut Aggregator<'_>,
) -> RunStatus {
    for batch in BatchIter::new(candidates.len(), batch_size) {
        if cancel.is_cancelled() {
            return RunStatus::Partial;
        }
        let slice = &candidates[batch.range.clone()];
        let results = filter_batch(slice, references, min, max);
        aggregator.merge(BatchOutcome {
            batch_index: batch.index,
            processed: slice.len() as u64,
            results,
        });
    }
    RunStatus::Completed
}
