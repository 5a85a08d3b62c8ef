//! Single merge point for per-batch results.
//!
//! Workers privately accumulate results for their batch and hand completed
//! [`BatchOutcome`]s to one aggregator. In parallel mode the handoff is a
//! channel drained by the driver thread; in sequential mode it is a direct
//! call. Either way exactly one thread ever touches the aggregator, so two
//! workers can never interleave partial writes into the result buffer.
//!
//! Aggregation is order-insensitive: outcomes may arrive in any order and the
//! final list is sorted by candidate id before it leaves the engine, which is
//! what makes the output deterministic across execution modes, batch sizes,
//! and worker counts.

use std::time::Instant;

use crate::api::{MatchResult, ProgressFn, ProgressUpdate, RunStatus, RunSummary};

/// Results of one fully processed batch, private to a worker until merged.
#[derive(Debug)]
pub struct BatchOutcome {
    /// Position of the batch in dispatch order.
    pub batch_index: u64,
    /// Candidates the batch contained (matched or not).
    pub processed: u64,
    /// Qualifying candidates, in the batch's candidate order.
    pub results: Vec<MatchResult>,
}

/// Accumulates batch outcomes and run-wide counters.
///
/// Owned by the driving thread; never shared.
pub struct Aggregator<'a> {
    results: Vec<MatchResult>,
    processed: u64,
    matched: u64,
    batches_completed: u64,
    started: Instant,
    progress: Option<Box<ProgressFn<'a>>>,
}

impl<'a> Aggregator<'a> {
    /// Create an aggregator.
    ///
    /// `started` should be the instant the load phase began, so the summary's
    /// elapsed time covers the whole run, not just matching.
    pub fn new(
        started: Instant,
        progress: Option<Box<ProgressFn<'a>>>,
    ) -> Aggregator<'a> {
        Aggregator {
            results: Vec::new(),
            processed: 0,
            matched: 0,
            batches_completed: 0,
            started,
            progress,
        }
    }

    /// Merge one completed batch and fire the progress callback.
    ///
    /// Arrival order does not matter; determinism comes from the final sort.
    pub fn merge(&mut self, outcome: BatchOutcome) {
        self.processed = self.processed.saturating_add(outcome.processed);
        self.matched = self.matched.saturating_add(outcome.results.len() as u64);
        self.batches_completed = self.batches_completed.saturating_add(1);
        self.results.extend(outcome.results);

        if let Some(progress) = self.progress.as_mut() {
            progress(ProgressUpdate {
                processed: self.processed,
                matched: self.matched,
                elapsed: self.started.elapsed(),
            });
        }
    }

    /// Candidates merged so far.
    pub fn processed(&self) -> u64 {
        self.processed
    }

    /// Sort, freeze, and hand back the final result list and summary.
    ///
    /// `total_candidates` and `skipped_malformed` come from the load phase;
    /// the aggregator only ever sees valid candidates.
    pub fn finalize(
        mut self,
        status: RunStatus,
        total_candidates: u64,
        skipped_malformed: u64,
    ) -> (Vec<MatchResult>, RunSummary) {
        self.results.sort_unstable_by_key(|r| r.candidate_id);

        let elapsed = self.started.elapsed();
        let secs = elapsed.as_secs_f64();
        let throughput = if secs > 0.0 {
            self.processed as f64 / secs
        } else {
            0.0
        };

        let summary = RunSummary {
            total_candidates,
            total_processed: self.processed,
            total_matched: self.matched,
            skipped_malformed,
            batches_completed: self.batches_completed,
            elapsed,
            throughput,
            status,
        };
        (self.results, summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(batch_index: u64, ids: &[u64]) -> BatchOutcome {
        BatchOutcome {
            batch_index,
            processed: ids.len() as u64 + 1, // one non-match per batch
            results: ids
                .iter()
                .map(|&candidate_id| MatchResult {
                    candidate_id,
                    intersection_size: 11,
                })
                .collect(),
        }
    }

    #[test]
    fn out_of_order_merges_sort_deterministically() {
        let mut agg = Aggregator::new(Instant::now(), None);
        agg.merge(outcome(2, &[50, 51]));
        agg.merge(outcome(0, &[1, 2]));
        agg.merge(outcome(1, &[30]));

        let (results, summary) = agg.finalize(RunStatus::Completed, 8, 0);
        let ids: Vec<u64> = results.iter().map(|r| r.candidate_id).collect();
        assert_eq!(ids, vec![1, 2, 30, 50, 51]);
        assert_eq!(summary.total_matched, 5);
        assert_eq!(summary.total_processed, 8);
        assert_eq!(summary.batches_completed, 3);
        assert_eq!(summary.status, RunStatus::Completed);
    }

    #[test]
    fn progress_fires_after_every_merge() {
        let mut updates: Vec<(u64, u64)> = Vec::new();
        {
            let mut agg = Aggregator::new(
                Instant::now(),
                Some(Box::new(|u: ProgressUpdate| {
                    updates.push((u.processed, u.matched));
                })),
            );
            agg.merge(outcome(0, &[1]));
            agg.merge(outcome(1, &[2, 3]));
            let _ = agg.finalize(RunStatus::Completed, 5, 0);
        }
        assert_eq!(updates, vec![(2, 1), (5, 3)]);
    }

    #[test]
    fn partial_summary_reflects_merged_batches_only() {
        let mut agg = Aggregator::new(Instant::now(), None);
        agg.merge(outcome(0, &[1]));

        let (results, summary) = agg.finalize(RunStatus::Partial, 100, 2);
        assert_eq!(results.len(), 1);
        assert_eq!(summary.status, RunStatus::Partial);
        assert_eq!(summary.total_candidates, 100);
        assert_eq!(summary.total_processed, 2);
        assert_eq!(summary.skipped_malformed, 2);
    }
}
