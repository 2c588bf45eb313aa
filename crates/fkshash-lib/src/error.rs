//! Error types for hashing and table construction

use thiserror::Error;

/// Error returned when a key cannot be hashed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HashError {
    /// The key contains a byte outside `[0, MAX_BYTE_VALUE]`
    #[error("Invalid key byte {byte:#04x} at position {position}")]
    InvalidByte {
        /// Offending byte value
        byte: u8,
        /// Position of the byte within the key
        position: usize,
    },
}

/// Error type for perfect hash construction
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// The build configuration failed validation
    #[error("Invalid build configuration: {0}")]
    InvalidConfiguration(String),

    /// A bucket could not be made collision-free within `max_attempts` rounds
    #[error("Slot {slot}: no collision-free sub-table after {attempts} attempts")]
    AttemptsExhausted {
        /// First-level slot of the bucket
        slot: usize,
        /// Number of resampling rounds performed
        attempts: u64,
    },

    /// Two keys in one bucket collide under every hash into `modulus` slots
    #[error("Slot {slot}: keys {first:?} and {second:?} collide under every hash with {capacity} coefficients modulo {modulus}")]
    IndistinguishableKeys {
        /// First-level slot of the bucket
        slot: usize,
        /// First key, lossily decoded
        first: String,
        /// Second key, lossily decoded
        second: String,
        /// Coefficient capacity in effect
        capacity: usize,
        /// Sub-table size the keys could not be separated in
        modulus: usize,
    },

    /// `4c²` overflowed `usize` for a bucket of `bucket_size` records
    #[error("Slot {slot}: sub-table for {bucket_size} records does not fit in memory")]
    SubTableTooLarge {
        /// First-level slot of the bucket
        slot: usize,
        /// Number of records in the bucket
        bucket_size: usize,
    },
}
