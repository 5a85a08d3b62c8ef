//! Run orchestration: validate, load, dispatch, finalize.
//!
//! A run moves through `Initialized → Loading → Running → Completed` (or
//! `Partial` when cancelled). Validation failures, an empty reference set, a
//! source load failure, or a malformed reference move it to `Failed`, which
//! surfaces as `Err(RunError)` with no partial results.
//!
//! # Single load phase
//!
//! Both sources are drained exactly once, before `Running`, into immutable
//! in-memory snapshots. Workers share those snapshots by reference; nothing
//! is re-queried mid-run, so a store changing underneath a run cannot produce
//! inconsistent matches. Encoding also happens here: malformed candidates are
//! skipped and counted (or abort the run in strict mode), so the matching
//! phase only ever sees valid bitmasks.

use std::time::Instant;

use crate::aggregate::Aggregator;
use crate::api::{
    CandidateRecord, CancelToken, ExecutionMode, FilterConfig, ProgressFn, RunReport, RunStatus,
};
use crate::errors::RunError;
use crate::mask::Encoder;
use crate::matcher::ReferenceSet;
use crate::scheduler::{run_parallel, run_sequential};
use crate::sources::{CandidateSource, ReferenceSource, ResultSink};

/// Phases of a run's lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    /// Configuration is being validated; no source has been consulted.
    Initialized,
    /// Sources are being drained and encoded into immutable snapshots.
    Loading,
    /// Batches are being matched and merged.
    Running,
    /// All batches merged; report produced.
    Completed,
    /// Cancelled between batches; partial report produced.
    Partial,
    /// Fatal error; no report produced.
    Failed,
}

impl RunState {
    /// Whether `next` is a legal successor of `self`.
    fn can_advance_to(self, next: RunState) -> bool {
        use RunState::*;
        matches!(
            (self, next),
            (Initialized, Loading)
                | (Initialized, Failed)
                | (Loading, Running)
                | (Loading, Failed)
                | (Running, Completed)
                | (Running, Partial)
        )
    }
}

/// Tracks the run's phase and asserts legal transitions in debug builds.
struct StateMachine {
    state: RunState,
}

impl StateMachine {
    fn new() -> Self {
        Self {
            state: RunState::Initialized,
        }
    }

    fn advance(&mut self, next: RunState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "illegal run transition {:?} -> {next:?}",
            self.state
        );
        self.state = next;
    }
}

/// Per-run options beyond the configuration: progress reporting and
/// cooperative cancellation.
#[derive(Default)]
pub struct RunOptions<'a> {
    /// Invoked after each merged batch with cumulative counters.
    pub progress: Option<Box<ProgressFn<'a>>>,
    /// Checked between batch dispatches; see [`CancelToken`].
    pub cancel: CancelToken,
}

/// Outcome of the candidate load-and-encode pass.
struct LoadedCandidates {
    records: Vec<CandidateRecord>,
    total: u64,
    skipped: u64,
}

/// Execute one filter run end to end.
///
/// Validates `config`, drains both sources into immutable snapshots,
/// dispatches batches per `config.execution_mode`, and hands the finished
/// report to `sink` before returning it.
///
/// # Errors
///
/// - [`RunError::Config`] if validation fails (run never starts).
/// - [`RunError::EmptyReferenceSet`] if the reference source yields nothing.
/// - [`RunError::CandidateLoad`] / [`RunError::ReferenceLoad`] if a source
///   fails; propagated, not retried.
/// - [`RunError::MalformedReference`] for any undecodable reference.
/// - [`RunError::StrictEncode`] for the first undecodable candidate when
///   `config.strict` is set.
pub fn run_filter(
    config: &FilterConfig,
    candidates: &mut dyn CandidateSource,
    references: &mut dyn ReferenceSource,
    sink: &dyn ResultSink,
    options: RunOptions<'_>,
) -> Result<RunReport, RunError> {
    let mut sm = StateMachine::new();

    if let Err(err) = config.validate() {
        sm.advance(RunState::Failed);
        return Err(err.into());
    }
    let encoder = Encoder::new(config.universe_size)?;

    sm.advance(RunState::Loading);
    let started = Instant::now();

    let reference_set = match load_references(&encoder, references) {
        Ok(set) => set,
        Err(err) => {
            sm.advance(RunState::Failed);
            return Err(err);
        }
    };
    let loaded = match load_candidates(&encoder, candidates, config.strict) {
        Ok(loaded) => loaded,
        Err(err) => {
            sm.advance(RunState::Failed);
            return Err(err);
        }
    };

    sm.advance(RunState::Running);
    let mut aggregator = Aggregator::new(started, options.progress);
    let min = u32::from(config.min_intersection);
    let max = u32::from(config.max_intersection);

    let status = match config.execution_mode {
        ExecutionMode::Sequential => run_sequential(
            &loaded.records,
            &reference_set,
            min,
            max,
            config.batch_size,
            &options.cancel,
            &mut aggregator,
        ),
        ExecutionMode::Parallel => run_parallel(
            &loaded.records,
            &reference_set,
            min,
            max,
            config.batch_size,
            config.parallelism_degree,
            &options.cancel,
            &mut aggregator,
        ),
    };
    sm.advance(match status {
        RunStatus::Completed => RunState::Completed,
        RunStatus::Partial => RunState::Partial,
    });

    let (results, summary) = aggregator.finalize(status, loaded.total, loaded.skipped);
    let report = RunReport { results, summary };
    sink.accept(&report);
    Ok(report)
}

/// Drain and encode the reference source into an immutable snapshot.
///
/// Any malformed reference is fatal: dropping one silently would change
/// match semantics for every candidate.
fn load_references(
    encoder: &Encoder,
    source: &mut dyn ReferenceSource,
) -> Result<ReferenceSet, RunError> {
    let raw = source
        .load_references()
        .map_err(RunError::reference_load)?;
    if raw.is_empty() {
        return Err(RunError::EmptyReferenceSet);
    }
    let mut masks = Vec::with_capacity(raw.len());
    for (index, numbers) in raw.iter().enumerate() {
        let mask = encoder
            .encode(numbers)
            .map_err(|source| RunError::MalformedReference { index, source })?;
        masks.push(mask);
    }
    Ok(ReferenceSet::new(masks))
}

/// Drain and encode the candidate source.
///
/// Non-strict mode skips malformed candidates and counts them; strict mode
/// fails on the first one, naming the offending id.
fn load_candidates(
    encoder: &Encoder,
    source: &mut dyn CandidateSource,
    strict: bool,
) -> Result<LoadedCandidates, RunError> {
    let raw = source
        .load_candidates()
        .map_err(RunError::candidate_load)?;
    let total = raw.len() as u64;

    let mut records = Vec::with_capacity(raw.len());
    let mut skipped = 0u64;
    for candidate in &raw {
        match encoder.encode(&candidate.numbers) {
            Ok(mask) => records.push(CandidateRecord {
                id: candidate.id,
                mask,
            }),
            Err(source) if strict => {
                return Err(RunError::StrictEncode {
                    candidate_id: candidate.id,
                    source,
                });
            }
            Err(_) => skipped = skipped.saturating_add(1),
        }
    }

    Ok(LoadedCandidates {
        records,
        total,
        skipped,
    })
}
