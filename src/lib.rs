//! Combinatorial intersection filter over bitmask-encoded sets.
//!
//! ## Scope
//! This crate tests a large collection of fixed-size combinations
//! ("candidates") against a smaller collection of larger combinations
//! ("references") drawn from a bounded universe of at most 64 elements. A
//! candidate qualifies when its intersection with at least one reference
//! falls within an inclusive size bound. It is domain-agnostic: anything
//! expressible as small integer sets can be filtered.
//!
//! ## Key invariants
//! - Combinations are encoded once, into 64-bit masks; intersection size is
//!   one AND plus one popcount on the hot path.
//! - References are loaded once per run into an immutable snapshot shared by
//!   all workers by reference; nothing re-queries a source mid-run.
//! - The first qualifying reference wins (scan order is significant); the
//!   scan does not continue looking for a larger intersection.
//! - The result *set* is invariant under execution mode, batch size, and
//!   worker count; the final sort by candidate id makes the output
//!   byte-identical as well.
//! - Memory is O(candidates + references + matches); no structure grows with
//!   candidates × references.
//!
//! ## Run flow
//! `validate config -> load + encode snapshots -> partition into batches ->
//! match (sequential loop or worker pool) -> single-point merge -> sort ->
//! report`
//!
//! ## Notable entry points
//! - [`run_filter`] / [`FilterConfig`] / [`RunOptions`]: one-call execution.
//! - [`Encoder`] / [`Mask`]: combination encoding.
//! - [`match_candidate`] / [`filter_batch`]: the pure matching core.
//! - [`CandidateSource`] / [`ReferenceSource`] / [`ResultSink`]: collaborator
//!   seams; the engine itself performs no I/O.
//! - [`CancelToken`]: cooperative cancellation between batches, yielding a
//!   `Partial` report.
//!
//! ## Design trade-offs
//! Batches are contiguous and pre-partitioned rather than work-stolen: the
//! per-candidate cost is uniform (O(references) worst case), so a bounded
//! dispatch channel keeps workers busy without a stealing runtime. Malformed
//! inputs are skipped and counted by default so one bad row cannot sink a
//! multi-million-candidate run; strict mode inverts that for callers that
//! prefer fail-fast.

pub mod aggregate;
pub mod api;
pub mod errors;
pub mod mask;
pub mod matcher;
pub mod runner;
pub mod scheduler;
pub mod sources;

pub use api::{
    CancelToken, CandidateRecord, ExecutionMode, FilterConfig, MatchResult, ProgressUpdate,
    RawCandidate, RunReport, RunStatus, RunSummary,
};
pub use errors::{ConfigError, EncodeError, RunError};
pub use mask::{Encoder, Mask};
pub use matcher::{filter_batch, match_candidate, ReferenceSet};
pub use runner::{run_filter, RunOptions, RunState};
pub use sources::{
    CandidateSource, NullSink, ReferenceSource, ResultSink, StdoutSink, VecCandidateSource,
    VecReferenceSource, VecSink,
};
