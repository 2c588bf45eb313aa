//! Constants and number-theory helpers for fkshash
//!
//! This module defines the compile-time parameters of the two-level table
//! (coefficient capacity, accepted byte range, sub-table scale) and the
//! trial-division prime search used to size the first level.

/// Default length of every coefficient vector.
///
/// Only the first `min(key.len(), capacity)` bytes of a key take part in
/// hashing. Keys longer than this that share their first `capacity` bytes
/// hash identically under every function of the family.
pub const DEFAULT_COEFFICIENT_CAPACITY: usize = 100;

/// Largest byte value accepted by the universal hash
pub const MAX_BYTE_VALUE: u8 = 127;

/// A bucket holding `c` records gets a sub-table of `SUB_TABLE_SCALE * c * c` slots
pub const SUB_TABLE_SCALE: usize = 4;

/// Buckets with at least this many records get a second-level table
pub const MIN_NESTED_BUCKET_SIZE: usize = 2;

/// First-level hashes tried before giving up on a bucket whose keys no
/// second-level hash of size `4c²` can separate
pub const MAX_FIRST_LEVEL_ROUNDS: u32 = 32;

/// Version number
pub const VERSION: (u8, u8, u8) = (0, 1, 0);

/// Check whether `n` is prime by trial division up to `√n`
#[inline]
pub fn is_prime(n: usize) -> bool {
    if n < 2 {
        return false;
    }
    let mut d: usize = 2;
    // d <= n / d avoids overflowing d * d near usize::MAX
    while d <= n / d {
        if n % d == 0 {
            return false;
        }
        d += 1;
    }
    true
}

/// Smallest prime strictly greater than `n`.
///
/// `smallest_prime_greater_than(0) == 2`, so an empty input still gets a
/// two-slot table.
pub fn smallest_prime_greater_than(n: usize) -> usize {
    let mut candidate = n.saturating_add(1);
    while !is_prime(candidate) {
        candidate += 1;
    }
    candidate
}

/// Number of sub-table slots for a bucket of `bucket_size` records, or
/// `None` if it does not fit in `usize`.
#[inline]
pub const fn sub_table_size(bucket_size: usize) -> Option<usize> {
    match bucket_size.checked_mul(bucket_size) {
        Some(sq) => sq.checked_mul(SUB_TABLE_SCALE),
        None => None,
    }
}
