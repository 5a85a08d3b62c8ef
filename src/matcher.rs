//! Core matching: one candidate against the reference snapshot.
//!
//! The matcher is a pure function over immutable data. Each comparison is one
//! AND plus one popcount, so the worst case is O(L) register operations per
//! candidate and O(N·L) for a full run. No allocation happens inside the scan
//! loop; qualifying results are pushed into a buffer owned by the caller's
//! batch.
//!
//! # First-qualifying-match semantics
//!
//! References are scanned in their load order and the scan stops at the first
//! reference whose intersection falls within `[min, max]` inclusive. The first
//! qualifying reference wins even when a later reference would intersect more;
//! callers wanting a best-match variant would scan to the end and keep the
//! maximum instead.

use crate::api::{CandidateRecord, MatchResult};
use crate::mask::Mask;

/// Immutable, ordered snapshot of the reference collection.
///
/// Built once per run during the load phase and shared read-only across all
/// workers by borrow; no copying or locking is ever required. Order is
/// significant: it determines which reference a candidate is reported against.
#[derive(Clone, Debug)]
pub struct ReferenceSet {
    masks: Box<[Mask]>,
}

impl ReferenceSet {
    /// Build a snapshot from encoded reference masks, preserving order.
    pub fn new(masks: Vec<Mask>) -> ReferenceSet {
        ReferenceSet {
            masks: masks.into_boxed_slice(),
        }
    }

    /// Number of references.
    #[inline]
    pub fn len(&self) -> usize {
        self.masks.len()
    }

    /// Whether the snapshot holds no references.
    ///
    /// An empty snapshot is rejected before a run starts; this exists for
    /// completeness and tests.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.masks.is_empty()
    }

    /// The reference masks in load order.
    #[inline]
    pub fn masks(&self) -> &[Mask] {
        &self.masks
    }
}

/// Test one candidate against the references, in their given order.
///
/// Returns the intersection size for the first reference `r` with
/// `min <= popcount(candidate & r) <= max`, or `None` if no reference
/// qualifies. Both bounds are inclusive.
#[inline]
pub fn match_candidate(candidate: Mask, references: &[Mask], min: u32, max: u32) -> Option<u32> {
    for &reference in references {
        let intersection = candidate.intersection_size(reference);
        if intersection >= min && intersection <= max {
            return Some(intersection);
        }
    }
    None
}

/// Apply [`match_candidate`] to every candidate in a batch.
///
/// Pure: touches no shared mutable state. The returned buffer is private to
/// the worker that produced it until the aggregator merges it; results keep
/// the batch's candidate order.
pub fn filter_batch(
    batch: &[CandidateRecord],
    references: &ReferenceSet,
    min: u32,
    max: u32,
) -> Vec<MatchResult> {
    let refs = references.masks();
    let mut results = Vec::new();
    for candidate in batch {
        if let Some(intersection_size) = match_candidate(candidate.mask, refs, min, max) {
            results.push(MatchResult {
                candidate_id: candidate.id,
                intersection_size,
            });
        }
    }
    results
}
