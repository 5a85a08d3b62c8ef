//! Collaborator seams: candidate/reference sources and the result sink.
//!
//! The engine performs no I/O of its own. Candidates and references arrive
//! through the source traits in one synchronous handoff before the run enters
//! `Running`; the finished report leaves through [`ResultSink`]. Persistence,
//! formats, and transport all live behind these seams.
//!
//! Sinks receive the report exactly once, after the final merge, so sink
//! implementations never see partial or interleaved results.

use std::io::{self, BufWriter, ErrorKind, Write};
use std::sync::Mutex;

use crate::api::{RawCandidate, RunReport};

/// Default buffer size for the stdout sink (64 KiB).
///
/// Fewer, larger writes keep syscall counts down; result lines are short, so
/// a bigger buffer buys nothing.
const DEFAULT_BUF_CAPACITY: usize = 64 * 1024;

// ============================================================================
// Input sources
// ============================================================================

/// Supplies candidate combinations for one run.
///
/// Consumed once, before the run transitions to `Running`. A materialized
/// `Vec` keeps the handoff synchronous; a streaming variant would be a
/// separate seam. An `Err` here is fatal: the run moves to `Failed` with no
/// partial results.
pub trait CandidateSource {
    /// Load the full candidate collection.
    fn load_candidates(&mut self) -> io::Result<Vec<RawCandidate>>;
}

/// Supplies reference combinations for one run.
///
/// Same handoff contract as [`CandidateSource`]. An empty collection is
/// rejected by the engine before any candidate is processed.
pub trait ReferenceSource {
    /// Load the full reference collection, in significant order.
    fn load_references(&mut self) -> io::Result<Vec<Vec<u8>>>;
}

/// Candidate source over an in-memory collection.
pub struct VecCandidateSource {
    candidates: Option<Vec<RawCandidate>>,
}

impl VecCandidateSource {
    /// Wrap a pre-built candidate list.
    pub fn new(candidates: Vec<RawCandidate>) -> Self {
        Self {
            candidates: Some(candidates),
        }
    }
}

impl CandidateSource for VecCandidateSource {
    fn load_candidates(&mut self) -> io::Result<Vec<RawCandidate>> {
        self.candidates.take().ok_or_else(|| {
            io::Error::new(
                ErrorKind::UnexpectedEof,
                "candidate collection already consumed",
            )
        })
    }
}

/// Reference source over an in-memory collection.
pub struct VecReferenceSource {
    references: Option<Vec<Vec<u8>>>,
}

impl VecReferenceSource {
    /// Wrap a pre-built reference list; order is preserved.
    pub fn new(references: Vec<Vec<u8>>) -> Self {
        Self {
            references: Some(references),
        }
    }
}

impl ReferenceSource for VecReferenceSource {
    fn load_references(&mut self) -> io::Result<Vec<Vec<u8>>> {
        self.references.take().ok_or_else(|| {
            io::Error::new(
                ErrorKind::UnexpectedEof,
                "reference collection already consumed",
            )
        })
    }
}

// ============================================================================
// Result sink
// ============================================================================

/// Consumes the final result list and summary.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`: the engine may hand the report over
/// from a worker-owning scope. The report arrives once, fully merged and
/// sorted by candidate id.
pub trait ResultSink: Send + Sync + 'static {
    /// Accept the finished report.
    fn accept(&self, report: &RunReport);
}

/// Test sink: captures a clone of the report in memory.
///
/// Use `take()` to extract the report after the run completes.
#[derive(Default)]
pub struct VecSink {
    report: Mutex<Option<RunReport>>,
}

impl VecSink {
    /// Create a new empty test sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Extract the captured report, leaving the sink empty.
    pub fn take(&self) -> Option<RunReport> {
        self.report.lock().expect("vec sink mutex poisoned").take()
    }
}

impl ResultSink for VecSink {
    fn accept(&self, report: &RunReport) {
        *self.report.lock().expect("vec sink mutex poisoned") = Some(report.clone());
    }
}

/// Stdout sink: one `candidate_id<TAB>intersection_size` line per match,
/// followed by a summary line.
///
/// # BrokenPipe Handling
///
/// When stdout is piped to a process that exits early (e.g., `... | head`),
/// writes return `BrokenPipe`. This sink silently ignores such errors rather
/// than panicking, which is standard CLI behavior.
pub struct StdoutSink {
    out: Mutex<BufWriter<io::Stdout>>,
}

impl StdoutSink {
    /// Create a stdout sink with the default 64 KiB buffer.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_BUF_CAPACITY)
    }

    /// Create a stdout sink with a custom buffer size.
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            out: Mutex::new(BufWriter::with_capacity(cap, io::stdout())),
        }
    }
}

impl Default for StdoutSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultSink for StdoutSink {
    fn accept(&self, report: &RunReport) {
        // Format outside the lock; take the lock only for the write.
        let mut buf = Vec::with_capacity(report.results.len() * 12);
        for result in &report.results {
            let _ = writeln!(
                buf,
                "{}\t{}",
                result.candidate_id, result.intersection_size
            );
        }
        let s = &report.summary;
        let _ = writeln!(
            buf,
            "# {:?}: {} candidates, {} matched, {} skipped, {:.0} cand/s",
            s.status, s.total_candidates, s.total_matched, s.skipped_malformed, s.throughput
        );

        let mut out = self.out.lock().expect("stdout sink mutex poisoned");
        if let Err(e) = out.write_all(&buf).and_then(|()| out.flush()) {
            if e.kind() == ErrorKind::BrokenPipe {
                return;
            }
            panic!("stdout write failed: {e}");
        }
    }
}

/// Null sink: discards the report.
///
/// Use for benchmarking engine overhead without output costs.
#[derive(Default)]
pub struct NullSink;

impl NullSink {
    pub fn new() -> Self {
        Self
    }
}

impl ResultSink for NullSink {
    fn accept(&self, _report: &RunReport) {}
}
