// fkshash: two-level perfect hashing
//
// A static key-value table built with the Fredman-Komlós-Szemerédi scheme,
// answering point queries with at most two universal-hash evaluations.

#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod constants;
pub mod error;
pub mod hasher;
pub mod record;
pub mod dedup;
pub mod table;
pub mod builder;

// Re-export common types at crate root
pub use builder::{BuildConfiguration, PerfectHashBuilder};
pub use dedup::deduplicate;
pub use error::{BuildError, HashError};
pub use hasher::CoefficientVector;
pub use record::Record;
pub use table::{PerfectHashTable, Slot, SubTable, TableStatistics};

/// Version information
pub fn version() -> (u8, u8, u8) {
    constants::VERSION
}
