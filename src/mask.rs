//! Bitmask encoding of combinations.
//!
//! A combination is an unordered set of distinct integers drawn from a bounded
//! universe `1..=U` with `U <= 64`. It is encoded as a [`Mask`]: bit `n - 1`
//! is set iff element `n` is present. Intersection size between two
//! combinations is then `popcount(a & b)`, a single instruction, which is what
//! keeps the matcher's inner loop allocation-free.
//!
//! # Invariants
//!
//! - A mask produced by [`Encoder::encode`] has `popcount == input.len()`.
//! - All set bits lie below `universe_size`.
//! - `decode(encode(x))` yields `x` sorted ascending.
//!
//! [`Encoder::decode`] exists for reporting and debugging only; nothing on the
//! matching hot path decodes.

use std::fmt;

use crate::errors::{ConfigError, EncodeError};

/// Fixed-width bitmask encoding of a combination.
///
/// Wraps a `u64`, which bounds the universe at 64 elements. That is generous
/// for the intended workloads (universe sizes in the dozens) and keeps every
/// mask `Copy` and register-sized.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Mask(u64);

impl Mask {
    /// The empty combination.
    pub const EMPTY: Mask = Mask(0);

    /// Number of set bits.
    ///
    /// O(1): compiles to a hardware popcount where available.
    #[inline(always)]
    pub fn popcount(self) -> u32 {
        self.0.count_ones()
    }

    /// Size of the intersection with `other`.
    ///
    /// O(1): one AND plus one popcount.
    #[inline(always)]
    pub fn intersection_size(self, other: Mask) -> u32 {
        (self.0 & other.0).count_ones()
    }

    /// Whether element `n` (1-based) is present.
    #[inline]
    pub fn contains(self, n: u8) -> bool {
        n >= 1 && n <= 64 && (self.0 >> (n - 1)) & 1 == 1
    }

    /// Raw bits, exposed for tests and debug formatting.
    #[inline]
    pub fn bits(self) -> u64 {
        self.0
    }

    /// Construct from raw bits.
    ///
    /// The caller is responsible for keeping bits within the universe; the
    /// engine only builds masks through [`Encoder::encode`].
    #[inline]
    pub fn from_bits(bits: u64) -> Mask {
        Mask(bits)
    }
}

impl fmt::Debug for Mask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Mask({:#018x})", self.0)
    }
}

/// Converts combinations to masks and back for a fixed universe size.
///
/// Stateless beyond the universe bound; cheap to copy into workers, though in
/// practice all encoding happens once during the load phase.
#[derive(Clone, Copy, Debug)]
pub struct Encoder {
    universe_size: u8,
}

impl Encoder {
    /// Create an encoder for a universe of `universe_size` elements.
    ///
    /// Fails with [`ConfigError::UniverseSizeOutOfRange`] unless
    /// `1 <= universe_size <= 64`.
    pub fn new(universe_size: u8) -> Result<Encoder, ConfigError> {
        if universe_size == 0 || universe_size > 64 {
            return Err(ConfigError::UniverseSizeOutOfRange {
                universe_size,
            });
        }
        Ok(Encoder { universe_size })
    }

    /// The universe bound this encoder enforces.
    #[inline]
    pub fn universe_size(&self) -> u8 {
        self.universe_size
    }

    /// Encode a combination into a mask.
    ///
    /// Rejects elements outside `[1, universe_size]` with
    /// [`EncodeError::InvalidElement`] and repeated elements with
    /// [`EncodeError::DuplicateElement`]. Duplicate detection uses the mask
    /// bit already being set, so encoding allocates nothing.
    ///
    /// On success the returned mask's popcount equals the input length.
    pub fn encode(&self, numbers: &[u8]) -> Result<Mask, EncodeError> {
        let mut bits = 0u64;
        for &n in numbers {
            if n == 0 || n > self.universe_size {
                return Err(EncodeError::InvalidElement {
                    value: n,
                    universe_size: self.universe_size,
                });
            }
            let bit = 1u64 << (n - 1);
            if bits & bit != 0 {
                return Err(EncodeError::DuplicateElement { value: n });
            }
            bits |= bit;
        }
        Ok(Mask(bits))
    }

    /// Decode a mask back into an ascending element list.
    ///
    /// Reporting/debugging only; never called on the matching hot path.
    pub fn decode(&self, mask: Mask) -> Vec<u8> {
        let mut out = Vec::with_capacity(mask.popcount() as usize);
        let mut bits = mask.0;
        while bits != 0 {
            let n = bits.trailing_zeros() as u8 + 1;
            out.push(n);
            bits &= bits - 1; // clear lowest set bit
        }
        out
    }
}
