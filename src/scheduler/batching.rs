//! Batch partitioning.
//!
//! Candidates are split into contiguous chunks of `batch_size`; the final
//! chunk may be smaller. Batches carry index ranges, not data: workers index
//! into the shared candidate slice, so partitioning allocates nothing and is
//! O(1) per batch.
//!
//! Batch indices are assigned in candidate order and are identical across
//! execution modes; only completion order differs in parallel mode.

use std::ops::Range;

/// One contiguous unit of work over the candidate slice.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Batch {
    /// Position in dispatch order, starting at 0.
    pub index: u64,
    /// Half-open candidate index range covered by this batch.
    pub range: Range<usize>,
}

impl Batch {
    /// Candidates in this batch.
    #[inline]
    pub fn len(&self) -> usize {
        self.range.end - self.range.start
    }

    /// Whether the batch covers no candidates. Never true for batches
    /// produced by [`BatchIter`].
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }
}

/// Iterator over contiguous batches of `batch_size` candidates.
#[derive(Clone, Debug)]
pub struct BatchIter {
    total: usize,
    batch_size: usize,
    next_start: usize,
    next_index: u64,
}

impl BatchIter {
    /// Partition `total` candidates into batches of `batch_size`.
    ///
    /// # Panics
    ///
    /// Panics if `batch_size` is 0. Config validation rejects that before a
    /// run starts; this guards direct callers.
    pub fn new(total: usize, batch_size: usize) -> BatchIter {
        assert!(batch_size > 0, "batch_size must be > 0");
        BatchIter {
            total,
            batch_size,
            next_start: 0,
            next_index: 0,
        }
    }

    /// Total number of batches this iterator will yield.
    pub fn batch_count(&self) -> u64 {
        (self.total.div_ceil(self.batch_size)) as u64
    }
}

impl Iterator for BatchIter {
    type Item = Batch;

    fn next(&mut self) -> Option<Batch> {
        if self.next_start >= self.total {
            return None;
        }
        let start = self.next_start;
        let end = (start + self.batch_size).min(self.total);
        let batch = Batch {
            index: self.next_index,
            range: start..end,
        };
        self.next_start = end;
        self.next_index += 1;
        Some(batch)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.total - self.next_start.min(self.total)).div_ceil(self.batch_size);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for BatchIter {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_multiple_splits_evenly() {
        let batches: Vec<Batch> = BatchIter::new(100, 25).collect();
        assert_eq!(batches.len(), 4);
        assert_eq!(batches[0].range, 0..25);
        assert_eq!(batches[3].range, 75..100);
        assert!(batches.iter().all(|b| b.len() == 25));
    }

    #[test]
    fn final_batch_may_be_short() {
        let batches: Vec<Batch> = BatchIter::new(10, 4).collect();
        assert_eq!(batches.len(), 3);
        assert_eq!(batches[2].range, 8..10);
        assert_eq!(batches[2].len(), 2);
    }

    #[test]
    fn batches_are_contiguous_and_disjoint() {
        let batches: Vec<Batch> = BatchIter::new(1000, 333).collect();
        let mut covered = 0usize;
        for (i, batch) in batches.iter().enumerate() {
            assert_eq!(batch.index, i as u64);
            assert_eq!(batch.range.start, covered);
            covered = batch.range.end;
        }
        assert_eq!(covered, 1000);
    }

    #[test]
    fn zero_candidates_yield_no_batches() {
        let mut iter = BatchIter::new(0, 10);
        assert_eq!(iter.batch_count(), 0);
        assert!(iter.next().is_none());
    }

    #[test]
    fn batch_size_larger_than_total_is_one_batch() {
        let batches: Vec<Batch> = BatchIter::new(7, 10_000).collect();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].range, 0..7);
    }

    #[test]
    #[should_panic(expected = "batch_size must be > 0")]
    fn zero_batch_size_panics() {
        let _ = BatchIter::new(10, 0);
    }

    #[test]
    fn batch_count_matches_iteration() {
        for (total, size) in [(0, 1), (1, 1), (10, 3), (1000, 333), (1000, 100)] {
            let iter = BatchIter::new(total, size);
            assert_eq!(iter.batch_count() as usize, iter.count(), "{total}/{size}");
        }
    }
}
