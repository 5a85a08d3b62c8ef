//! Public data types: run configuration, records, results, and summaries.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::errors::ConfigError;
use crate::mask::Mask;

// ============================================================================
// Configuration
// ============================================================================

/// How the scheduler drives batches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ExecutionMode {
    /// One logical worker processes batches strictly in candidate order.
    Sequential,
    /// A fixed pool of `parallelism_degree` workers processes disjoint
    /// batches; results are merged through a single aggregation point.
    Parallel,
}

/// Configuration for a filter run.
///
/// All knobs are explicit; there are no hidden defaults beyond the documented
/// ones. Element sizes are `u8` because the universe is capped at 64.
///
/// # Defaults
///
/// | Parameter | Default | Rationale |
/// |-----------|---------|-----------|
/// | `universe_size` | 25 | Typical bounded domain for the intended workloads |
/// | `candidate_size` | 15 | Smaller combination being tested |
/// | `reference_size` | 20 | Larger comparison combination |
/// | `min_intersection` | 11 | Inclusive lower bound |
/// | `max_intersection` | 15 | Inclusive upper bound |
/// | `batch_size` | 10 000 | Amortizes dispatch overhead without hurting progress granularity |
/// | `parallelism_degree` | logical cores − 1, min 1 | Leave one core for the aggregating driver |
/// | `execution_mode` | `Parallel` | The defaults provision a worker pool |
/// | `strict` | `false` | Skip-and-count malformed candidates |
///
/// # Memory planning
///
/// Peak additional memory is O(candidates + references + matches): one
/// `CandidateRecord` (16 bytes) per candidate, one `Mask` (8 bytes) per
/// reference, plus per-worker result buffers bounded by the batch size.
#[derive(Clone, Debug)]
pub struct FilterConfig {
    /// Size `U` of the bounded universe; elements are `1..=U`, `U <= 64`.
    pub universe_size: u8,

    /// Number of elements `K` in each candidate combination.
    pub candidate_size: u8,

    /// Number of elements `L` in each reference combination.
    pub reference_size: u8,

    /// Inclusive lower bound on qualifying intersection size.
    pub min_intersection: u8,

    /// Inclusive upper bound on qualifying intersection size.
    ///
    /// Must not exceed `min(candidate_size, reference_size)`; a larger bound
    /// could never be met and is rejected as a configuration error.
    pub max_intersection: u8,

    /// Candidates per batch. The final batch may be smaller.
    pub batch_size: usize,

    /// Worker threads in `Parallel` mode. Ignored by `Sequential`.
    pub parallelism_degree: usize,

    /// Sequential loop or parallel worker pool.
    pub execution_mode: ExecutionMode,

    /// If `true`, the first malformed candidate aborts the run instead of
    /// being skipped and counted.
    pub strict: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            universe_size: 25,
            candidate_size: 15,
            reference_size: 20,
            min_intersection: 11,
            max_intersection: 15,
            batch_size: 10_000,
            parallelism_degree: num_cpus::get().saturating_sub(1).max(1),
            execution_mode: ExecutionMode::Parallel,
            strict: false,
        }
    }
}

impl FilterConfig {
    /// Validate configuration invariants.
    ///
    /// Checked while the run is still `Initialized`; a failure here means the
    /// run never starts and no source is consulted.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.universe_size == 0 || self.universe_size > 64 {
            return Err(ConfigError::UniverseSizeOutOfRange {
                universe_size: self.universe_size,
            });
        }
        if self.candidate_size == 0 || self.candidate_size > self.universe_size {
            return Err(ConfigError::CandidateSizeOutOfRange {
                candidate_size: self.candidate_size,
                universe_size: self.universe_size,
            });
        }
        if self.reference_size == 0 || self.reference_size > self.universe_size {
            return Err(ConfigError::ReferenceSizeOutOfRange {
                reference_size: self.reference_size,
                universe_size: self.universe_size,
            });
        }
        if self.min_intersection > self.max_intersection {
            return Err(ConfigError::InvertedIntersectionBounds {
                min: self.min_intersection,
                max: self.max_intersection,
            });
        }
        let limit = self.candidate_size.min(self.reference_size);
        if self.max_intersection > limit {
            return Err(ConfigError::UnsatisfiableIntersectionBound {
                max: self.max_intersection,
                limit,
            });
        }
        if self.batch_size == 0 {
            return Err(ConfigError::ZeroBatchSize);
        }
        if self.parallelism_degree == 0 {
            return Err(ConfigError::ZeroParallelism);
        }

        // Warn about oversubscription; harmless but usually a mistake.
        #[cfg(debug_assertions)]
        if matches!(self.execution_mode, ExecutionMode::Parallel)
            && self.parallelism_degree > num_cpus::get()
        {
            eprintln!(
                "[FilterConfig] Warning: parallelism_degree ({}) exceeds logical cores ({}).",
                self.parallelism_degree,
                num_cpus::get()
            );
        }

        Ok(())
    }
}

// ============================================================================
// Records and results
// ============================================================================

/// A raw candidate as supplied by a candidate source, prior to encoding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawCandidate {
    /// Caller-assigned identifier; expected unique across the run.
    pub id: u64,
    /// The combination's elements, order-insensitive.
    pub numbers: Vec<u8>,
}

/// An encoded candidate, immutable for the duration of a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CandidateRecord {
    /// Caller-assigned identifier.
    pub id: u64,
    /// Bitmask encoding of the candidate's combination.
    pub mask: Mask,
}

/// One qualifying candidate.
///
/// Produced only when a candidate's intersection with some reference falls
/// within the configured inclusive bounds; immutable once created.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    /// Identifier of the qualifying candidate.
    pub candidate_id: u64,
    /// Intersection size with the first qualifying reference, in reference
    /// load order.
    pub intersection_size: u32,
}

/// Terminal status of a run that produced results.
///
/// Fatal failures are reported as `Err(RunError)` instead and carry no status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum RunStatus {
    /// Every batch was processed.
    Completed,
    /// The run was cancelled between batch dispatches; the result list covers
    /// only the batches merged before cancellation took effect.
    Partial,
}

/// Run-wide counters, frozen when the run completes.
#[derive(Clone, Debug, Serialize)]
pub struct RunSummary {
    /// Candidates supplied by the source, including skipped malformed ones.
    pub total_candidates: u64,
    /// Candidates actually run through the matcher. Equals
    /// `total_candidates - skipped_malformed` for completed runs; lower when
    /// the run was cancelled.
    pub total_processed: u64,
    /// Candidates that qualified against at least one reference.
    pub total_matched: u64,
    /// Malformed candidates skipped during the load phase (non-strict mode).
    pub skipped_malformed: u64,
    /// Batches fully merged into the final result set.
    pub batches_completed: u64,
    /// Wall-clock time from the start of the load phase to completion.
    pub elapsed: Duration,
    /// Candidates processed per second of `elapsed`.
    pub throughput: f64,
    /// `Completed`, or `Partial` if the run was cancelled.
    pub status: RunStatus,
}

/// Final output of a run: the deterministic result list plus its summary.
#[derive(Clone, Debug, Serialize)]
pub struct RunReport {
    /// Qualifying candidates, sorted by `candidate_id`.
    ///
    /// Sorting makes the output invariant under execution mode, batch size,
    /// and worker count; only completion order during the run varies.
    pub results: Vec<MatchResult>,
    /// Frozen run-wide counters.
    pub summary: RunSummary,
}

// ============================================================================
// Progress and cancellation
// ============================================================================

/// Snapshot passed to the progress callback after each merged batch.
#[derive(Clone, Copy, Debug)]
pub struct ProgressUpdate {
    /// Candidates processed so far.
    pub processed: u64,
    /// Candidates matched so far.
    pub matched: u64,
    /// Wall-clock time since the run started.
    pub elapsed: Duration,
}

/// Callback invoked by the aggregator after each completed batch.
pub type ProgressFn<'a> = dyn FnMut(ProgressUpdate) + 'a;

/// Cooperative cancellation flag.
///
/// Checked between batch dispatches, never inside a batch: a cancelled run
/// finishes in-flight batches, merges them, and reports
/// [`RunStatus::Partial`]. Cloning shares the underlying flag.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a token in the not-cancelled state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent; safe from any thread.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}
