//! Compile-time tuning knobs for the table geometry.

/// Each bucket holds `1 << BSHIFT` key/value slots.
pub const BSHIFT: u32 = 3;

/// Each key maps to `1 << NHASH_SHIFT` candidate buckets.
pub const NHASH_SHIFT: u32 = 3;

/// Multiplier on `1 + log_size` for the eviction walk step budget.
///
/// The expected maximum walk length is O(log n), so a small constant on a
/// linear function of the bucket-count exponent is sufficient with high
/// probability. Best tuned by benchmarks; the optimal value depends on
/// `BSHIFT` and `NHASH_SHIFT`.
pub const WALK_COEFFICIENT: usize = 1;

/// Below this load factor, a failed insert reseeds the table in place
/// before growing it. Walk failures under light load are almost always a
/// pathological seed tuple rather than genuine overfill.
pub const REHASH_THRESHOLD: f64 = 0.9;

/// A shrink is attempted when fewer than `capacity >> SHRINK_FACTOR`
/// entries remain after a delete. Zero disables shrinking.
pub const SHRINK_FACTOR: u32 = 0;

/// Shrinks never take the bucket-count exponent below this floor.
pub const MIN_LOG_SIZE: u32 = 8;

/// Keys are 32-bit, so bucket indices can use at most `32 - BSHIFT` bits.
pub const MAX_LOG_SIZE: u32 = 32 - BSHIFT;

/// Bucket-count exponent used by `CuckooMap::default`.
pub const DEFAULT_LOG_SIZE: u32 = 8;

pub(crate) const BLEN: usize = 1 << BSHIFT;
pub(crate) const BMASK: u64 = BLEN as u64 - 1;
pub(crate) const NHASH: usize = 1 << NHASH_SHIFT;
pub(crate) const NHASH_MASK: u64 = NHASH as u64 - 1;

// One 64-bit draw must cover a full eviction walk step: the Fisher-Yates
// shuffle of the candidate tuple plus the victim bucket and slot choice.
const _: () = assert!(
    NHASH as u32 * NHASH_SHIFT + BSHIFT + NHASH_SHIFT <= 63,
    "invalid config: a walk step needs NHASH*NHASH_SHIFT + BSHIFT + NHASH_SHIFT random bits; reduce NHASH_SHIFT or BSHIFT",
);
