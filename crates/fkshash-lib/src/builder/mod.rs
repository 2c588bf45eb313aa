//! Builder module for constructing perfect hash tables
//!
//! This module implements the two-level build pipeline:
//! 1. Deduplicate input records
//! 2. Size the first level (smallest prime above the record count)
//! 3. Sample the first-level universal hash and partition into buckets
//! 4. Resample a second-level hash per colliding bucket until collision-free
//! 5. Finalize the immutable table

pub mod config;
pub mod buckets;
pub mod table_builder;

pub use config::BuildConfiguration;
pub use buckets::{Bucket, BucketStatistics, BucketType};
pub use table_builder::PerfectHashBuilder;
