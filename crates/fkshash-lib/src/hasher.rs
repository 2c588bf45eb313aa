//! Universal hashing over byte-string keys.
//!
//! A hash function of the family is a coefficient vector `a` drawn uniformly
//! from `[0, modulus)^capacity`; a key is hashed as
//! `Σ key[j] · a[j] mod modulus` over its first `min(|key|, capacity)` bytes.

use crate::constants::MAX_BYTE_VALUE;
use crate::error::HashError;
use rand::Rng;

/// A sampled member of the universal hash family
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoefficientVector {
    coefficients: Vec<u64>,
    modulus: u64,
}

impl CoefficientVector {
    /// Sample `capacity` coefficients independently and uniformly from `[0, modulus)`
    ///
    /// `modulus` must be positive; the builder always passes `m >= 2` or `4c² >= 16`.
    pub fn sample<R: Rng + ?Sized>(rng: &mut R, modulus: usize, capacity: usize) -> Self {
        debug_assert!(modulus > 0, "modulus must be positive");
        let modulus = modulus as u64;
        let coefficients = (0..capacity).map(|_| rng.gen_range(0..modulus)).collect();
        Self { coefficients, modulus }
    }

    /// Build from explicit coefficients. Values are reduced into `[0, modulus)`,
    /// so `modulus` must be positive.
    pub fn from_vec(coefficients: Vec<u64>, modulus: usize) -> Self {
        debug_assert!(modulus > 0, "modulus must be positive");
        let modulus = modulus as u64;
        let coefficients = coefficients.into_iter().map(|c| c % modulus).collect();
        Self { coefficients, modulus }
    }

    /// Hash `key` into `[0, modulus)`.
    ///
    /// Every byte of the key must lie in `[0, MAX_BYTE_VALUE]`, including
    /// bytes past the hashed prefix, so a key is either hashable under every
    /// function of the family or under none.
    #[inline]
    pub fn hash(&self, key: &[u8]) -> Result<usize, HashError> {
        validate_key(key)?;
        Ok(self.hash_validated(key))
    }

    /// Hash a key that already passed [`validate_key`]
    #[inline]
    pub(crate) fn hash_validated(&self, key: &[u8]) -> usize {
        let sum: u128 = key
            .iter()
            .zip(&self.coefficients)
            .map(|(&b, &a)| b as u128 * a as u128)
            .sum();
        (sum % self.modulus as u128) as usize
    }

    /// Number of coefficients (the hashed prefix length)
    pub fn capacity(&self) -> usize {
        self.coefficients.len()
    }

    /// Output range of the hash
    pub fn modulus(&self) -> usize {
        self.modulus as usize
    }

    /// Raw coefficients
    pub fn coefficients(&self) -> &[u64] {
        &self.coefficients
    }
}

/// True when every function of the family with `capacity` coefficients
/// modulo `modulus` sends `x` and `y` to the same value.
///
/// That happens exactly when the keys, zero-padded to `capacity` bytes,
/// differ at every position by a multiple of `modulus`. Zero bytes add
/// nothing to the sum, so `"a"` and `"a\0"` are inseparable under any
/// modulus; `"A"` and `"Q"` (65, 81) only under moduli dividing 16.
pub fn inseparable(x: &[u8], y: &[u8], capacity: usize, modulus: usize) -> bool {
    let modulus = modulus as u64;
    let len = x.len().max(y.len()).min(capacity);
    (0..len).all(|j| {
        let a = x.get(j).copied().unwrap_or(0);
        let b = y.get(j).copied().unwrap_or(0);
        a.abs_diff(b) as u64 % modulus == 0
    })
}

/// True when `x` and `y` are equal once zero-padded to `capacity` bytes:
/// no function of the family, under any modulus, can tell them apart.
pub fn identical_when_hashed(x: &[u8], y: &[u8], capacity: usize) -> bool {
    // Byte differences are below 256
    inseparable(x, y, capacity, 1 << 8)
}

/// Check that every byte of `key` is in `[0, MAX_BYTE_VALUE]`
#[inline]
pub fn validate_key(key: &[u8]) -> Result<(), HashError> {
    match key.iter().position(|&b| b > MAX_BYTE_VALUE) {
        Some(position) => Err(HashError::InvalidByte {
            byte: key[position],
            position,
        }),
        None => Ok(()),
    }
}
