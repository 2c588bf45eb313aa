//! First-level bucketing and bucket statistics
//!
//! Records are distributed over the `m` first-level slots by the first-level
//! universal hash. Each bucket is then classified by occupancy: empty,
//! singleton (stored directly) or colliding (gets a second-level table).

use crate::constants::MIN_NESTED_BUCKET_SIZE;
use crate::hasher::CoefficientVector;
use crate::record::Record;
use tracing::{info, warn};

/// Bucket type classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketType {
    /// No record hashed here
    Empty,
    /// Exactly one record, stored directly in the slot
    Singleton,
    /// Two or more records, resolved by a second-level table
    Colliding,
}

impl BucketType {
    /// Classify a bucket by its size
    pub fn from_bucket_size(size: usize) -> Self {
        match size {
            0 => BucketType::Empty,
            s if s < MIN_NESTED_BUCKET_SIZE => BucketType::Singleton,
            _ => BucketType::Colliding,
        }
    }
}

/// Records that share a first-level slot
#[derive(Debug, Clone, Default)]
pub struct Bucket {
    /// Records in input order
    pub records: Vec<Record>,
}

impl Bucket {
    /// Number of records in the bucket
    pub fn size(&self) -> usize {
        self.records.len()
    }

    /// Get the bucket type
    pub fn bucket_type(&self) -> BucketType {
        BucketType::from_bucket_size(self.records.len())
    }
}

/// Result of first-level partitioning
#[derive(Debug, Clone)]
pub struct Partition {
    /// One bucket per first-level slot
    pub buckets: Vec<Bucket>,
    /// Records dropped because their key could not be hashed
    pub num_dropped: usize,
}

/// Distribute `records` over `hasher.modulus()` buckets.
///
/// Keys the hasher rejects (bytes outside the accepted range) are dropped
/// from the table and counted, never reported as errors.
pub fn partition_into_buckets(records: Vec<Record>, hasher: &CoefficientVector) -> Partition {
    let mut buckets = vec![Bucket::default(); hasher.modulus()];
    let mut num_dropped = 0;

    for record in records {
        match hasher.hash(record.key()) {
            Ok(slot) => buckets[slot].records.push(record),
            Err(e) => {
                warn!(
                    "Dropping key {:?}: {}",
                    String::from_utf8_lossy(record.key()),
                    e
                );
                num_dropped += 1;
            }
        }
    }

    Partition { buckets, num_dropped }
}

/// Statistics about bucket occupancy and second-level construction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BucketStatistics {
    /// Total number of buckets (first-level slots)
    pub num_buckets: u64,

    /// Total number of records placed in buckets
    pub num_records: u64,

    /// Number of empty buckets
    pub num_empty_buckets: u64,

    /// Number of singleton buckets
    pub num_singleton_buckets: u64,

    /// Number of buckets with a second-level table
    pub num_colliding_buckets: u64,

    /// Maximum observed bucket size
    pub max_bucket_size: usize,

    /// Total slots across all second-level tables
    pub num_sub_table_slots: u64,

    /// Total second-level sampling rounds across all colliding buckets
    pub num_attempts: u64,

    /// Largest number of rounds any single bucket needed
    pub max_attempts: u64,
}

impl BucketStatistics {
    /// Create a new statistics tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Record statistics for a bucket
    pub fn add_bucket(&mut self, bucket: &Bucket) {
        let size = bucket.size();
        self.num_buckets += 1;
        self.num_records += size as u64;
        self.max_bucket_size = self.max_bucket_size.max(size);

        match bucket.bucket_type() {
            BucketType::Empty => self.num_empty_buckets += 1,
            BucketType::Singleton => self.num_singleton_buckets += 1,
            BucketType::Colliding => self.num_colliding_buckets += 1,
        }
    }

    /// Record a successfully built second-level table
    pub fn add_sub_table(&mut self, slots: usize, attempts: u64) {
        self.num_sub_table_slots += slots as u64;
        self.num_attempts += attempts;
        self.max_attempts = self.max_attempts.max(attempts);
    }

    /// Log statistics summary via tracing
    pub fn print_summary(&self) {
        let pct = |x: u64| {
            if self.num_buckets == 0 {
                0.0
            } else {
                (x as f64 * 100.0) / self.num_buckets as f64
            }
        };

        info!("Bucket Statistics:");
        info!("  Total buckets: {}", self.num_buckets);
        info!("  Total records: {}", self.num_records);
        info!("  Empty buckets: {} ({:.2}%)", self.num_empty_buckets, pct(self.num_empty_buckets));
        info!(
            "  Singleton buckets: {} ({:.2}%)",
            self.num_singleton_buckets,
            pct(self.num_singleton_buckets)
        );
        info!(
            "  Colliding buckets: {} ({:.2}%)",
            self.num_colliding_buckets,
            pct(self.num_colliding_buckets)
        );
        info!("  Max bucket size: {}", self.max_bucket_size);
        info!("  Second-level slots: {}", self.num_sub_table_slots);
        if self.num_colliding_buckets > 0 {
            info!(
                "  Sampling rounds: {} total, {:.2} avg, {} max",
                self.num_attempts,
                self.num_attempts as f64 / self.num_colliding_buckets as f64,
                self.max_attempts
            );
        }
    }
}
