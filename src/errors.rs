//! Error types for the filter engine, split by stage.
//!
//! Errors are stage-specific to keep diagnostics precise: configuration
//! problems surface before any data is loaded, encoding problems name the
//! offending value, and run-level failures preserve their cause. All enums are
//! `#[non_exhaustive]` so variants can be added without breaking callers;
//! consumers should include a fallback match arm.
//!
//! # Failure policy
//!
//! - Configuration and reference problems are fatal: the run never starts
//!   (or transitions to `Failed` during load) and no partial results exist.
//! - Malformed *candidates* are skipped and counted by default; strict mode
//!   promotes the first one to [`RunError::StrictEncode`].

use std::fmt;
use std::io;

/// Errors from [`FilterConfig`](crate::FilterConfig) validation.
///
/// Raised while the run is still `Initialized`; the run never starts.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    /// Universe size must be in `[1, 64]` (masks are 64 bits wide).
    UniverseSizeOutOfRange { universe_size: u8 },
    /// Candidate combination size must be in `[1, universe_size]`.
    CandidateSizeOutOfRange { candidate_size: u8, universe_size: u8 },
    /// Reference combination size must be in `[1, universe_size]`.
    ReferenceSizeOutOfRange { reference_size: u8, universe_size: u8 },
    /// `min_intersection` must not exceed `max_intersection`.
    InvertedIntersectionBounds { min: u8, max: u8 },
    /// `max_intersection` cannot exceed `min(candidate_size, reference_size)`.
    UnsatisfiableIntersectionBound { max: u8, limit: u8 },
    /// Batches must hold at least one candidate.
    ZeroBatchSize,
    /// The worker pool must have at least one worker.
    ZeroParallelism,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UniverseSizeOutOfRange { universe_size } => {
                write!(f, "universe_size ({universe_size}) must be in [1, 64]")
            }
            Self::CandidateSizeOutOfRange {
                candidate_size,
                universe_size,
            } => write!(
                f,
                "candidate_size ({candidate_size}) must be in [1, universe_size = {universe_size}]"
            ),
            Self::ReferenceSizeOutOfRange {
                reference_size,
                universe_size,
            } => write!(
                f,
                "reference_size ({reference_size}) must be in [1, universe_size = {universe_size}]"
            ),
            Self::InvertedIntersectionBounds { min, max } => {
                write!(f, "min_intersection ({min}) exceeds max_intersection ({max})")
            }
            Self::UnsatisfiableIntersectionBound { max, limit } => write!(
                f,
                "max_intersection ({max}) exceeds min(candidate_size, reference_size) = {limit}"
            ),
            Self::ZeroBatchSize => write!(f, "batch_size must be > 0"),
            Self::ZeroParallelism => write!(f, "parallelism_degree must be >= 1"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Errors from encoding a combination into a bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum EncodeError {
    /// An element lies outside `[1, universe_size]`.
    InvalidElement { value: u8, universe_size: u8 },
    /// An element appears more than once.
    DuplicateElement { value: u8 },
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidElement {
                value,
                universe_size,
            } => write!(
                f,
                "element {value} outside universe [1, {universe_size}]"
            ),
            Self::DuplicateElement { value } => {
                write!(f, "element {value} repeated within one combination")
            }
        }
    }
}

impl std::error::Error for EncodeError {}

/// Fatal errors from a filter run.
///
/// Any of these moves the run to the `Failed` state; no result list is
/// produced. Non-fatal conditions (skipped malformed candidates, cooperative
/// cancellation) are reported through
/// [`RunSummary`](crate::RunSummary) instead.
#[derive(Debug)]
#[non_exhaustive]
pub enum RunError {
    /// Configuration failed validation; the run never left `Initialized`.
    Config(ConfigError),
    /// The reference source yielded zero references.
    EmptyReferenceSet,
    /// The candidate source failed to supply data.
    CandidateLoad(io::Error),
    /// The reference source failed to supply data.
    ReferenceLoad(io::Error),
    /// A reference combination failed to encode.
    ///
    /// Always fatal: silently dropping a reference would change match
    /// semantics for every candidate. `index` is the reference's position in
    /// load order.
    MalformedReference { index: usize, source: EncodeError },
    /// Strict mode: a candidate combination failed to encode.
    StrictEncode { candidate_id: u64, source: EncodeError },
}

impl RunError {
    /// Creates a candidate-load failure from an I/O error.
    #[inline]
    pub fn candidate_load(err: io::Error) -> Self {
        Self::CandidateLoad(err)
    }

    /// Creates a reference-load failure from an I/O error.
    #[inline]
    pub fn reference_load(err: io::Error) -> Self {
        Self::ReferenceLoad(err)
    }
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(err) => write!(f, "invalid configuration: {err}"),
            Self::EmptyReferenceSet => write!(f, "reference collection is empty"),
            Self::CandidateLoad(err) => write!(f, "candidate source failed: {err}"),
            Self::ReferenceLoad(err) => write!(f, "reference source failed: {err}"),
            Self::MalformedReference { index, source } => {
                write!(f, "reference #{index} is malformed: {source}")
            }
            Self::StrictEncode {
                candidate_id,
                source,
            } => write!(f, "candidate {candidate_id} is malformed: {source}"),
        }
    }
}

impl std::error::Error for RunError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::CandidateLoad(err) | Self::ReferenceLoad(err) => Some(err),
            Self::MalformedReference { source, .. } => Some(source),
            Self::StrictEncode { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ConfigError> for RunError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}
