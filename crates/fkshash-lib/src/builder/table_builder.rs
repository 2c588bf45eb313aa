//! Perfect hash table builder orchestration
//!
//! Coordinates the two-level construction:
//! 1. Deduplicate input records (first occurrence wins)
//! 2. Size the first level: m = smallest prime > n
//! 3. Sample the first-level hash and partition records into m buckets,
//!    resampling while some bucket holds keys no second-level hash can separate
//! 4. Resolve every colliding bucket with a second-level table
//! 5. Assemble the immutable table

use crate::{
    builder::{
        buckets::{partition_into_buckets, Bucket, BucketStatistics, BucketType},
        config::BuildConfiguration,
    },
    constants::{smallest_prime_greater_than, sub_table_size, MAX_FIRST_LEVEL_ROUNDS},
    dedup::deduplicate,
    error::BuildError,
    hasher::{identical_when_hashed, inseparable, CoefficientVector},
    record::Record,
    table::{PerfectHashTable, Slot, SubTable},
};
use rand::Rng;
use tracing::{debug, info};

/// Builder for constructing perfect hash tables
pub struct PerfectHashBuilder {
    config: BuildConfiguration,
}

impl PerfectHashBuilder {
    /// Create a new builder with the given configuration
    pub fn new(config: BuildConfiguration) -> Result<Self, BuildError> {
        config.validate().map_err(BuildError::InvalidConfiguration)?;
        Ok(Self { config })
    }

    /// The configuration in effect
    pub fn config(&self) -> &BuildConfiguration {
        &self.config
    }

    /// Build a table from input records
    ///
    /// Randomness comes from [`BuildConfiguration::rng`], so a fixed seed
    /// reproduces the same layout.
    ///
    /// # Errors
    /// Only under a `max_attempts` cap, for keys that are equal once
    /// zero-padded to the coefficient capacity (or that stay inseparable for
    /// `MAX_FIRST_LEVEL_ROUNDS` first-level hashes), or if a sub-table would
    /// not fit in memory. Keys with invalid bytes are dropped, not reported.
    pub fn build<I>(&self, records: I) -> Result<PerfectHashTable, BuildError>
    where
        I: IntoIterator<Item = Record>,
    {
        let mut rng = self.config.rng();
        self.build_with_rng(records, &mut rng)
    }

    /// Build a table drawing coefficients from `rng`
    pub fn build_with_rng<I, R>(&self, records: I, rng: &mut R) -> Result<PerfectHashTable, BuildError>
    where
        I: IntoIterator<Item = Record>,
        R: Rng + ?Sized,
    {
        if self.config.verbose {
            self.config.print();
        }
        info!("Building perfect hash table");

        // Step 1: Deduplicate
        let records = deduplicate(records);
        let n = records.len();
        info!("Step 1: {} unique records", n);

        // Step 2: Size the first level
        let m = smallest_prime_greater_than(n);
        let capacity = self.config.coefficient_capacity;
        info!("Step 2: first level has m = {} slots", m);

        // Step 3: Sample the first level and partition. A bucket of keys that
        // differ only by multiples of its sub-table size would never resolve,
        // so such a split is thrown away and the first level resampled.
        let mut records = records;
        let mut num_dropped = 0;
        let mut rounds: u32 = 0;
        let (first_level, buckets) = loop {
            rounds += 1;
            let first_level = CoefficientVector::sample(rng, m, capacity);
            let partition = partition_into_buckets(records, &first_level);
            num_dropped += partition.num_dropped;

            match find_inseparable_bucket(&partition.buckets, capacity)? {
                None => break (first_level, partition.buckets),
                Some(clash) => {
                    let bucket = &partition.buckets[clash.slot].records;
                    let (a, b) = (&bucket[clash.first], &bucket[clash.second]);
                    if identical_when_hashed(a.key(), b.key(), capacity)
                        || rounds >= MAX_FIRST_LEVEL_ROUNDS
                    {
                        return Err(indistinguishable(clash.slot, a, b, capacity, clash.modulus));
                    }
                    debug!(
                        "Round {}: slot {} cannot be split modulo {}, resampling first level",
                        rounds, clash.slot, clash.modulus
                    );
                    records = partition.buckets.into_iter().flat_map(|b| b.records).collect();
                }
            }
        };
        if rounds > 1 {
            info!("  First level accepted after {} rounds", rounds);
        }
        if num_dropped > 0 {
            info!("  Dropped {} records with unhashable keys", num_dropped);
        }

        let mut stats = BucketStatistics::new();
        for bucket in &buckets {
            stats.add_bucket(bucket);
        }

        // Step 4: Second level
        info!(
            "Step 3: resolving {} colliding buckets...",
            stats.num_colliding_buckets
        );
        let mut slots = Vec::with_capacity(m);
        for (slot, bucket) in buckets.into_iter().enumerate() {
            let entry = match bucket.bucket_type() {
                BucketType::Empty => Slot::Empty,
                BucketType::Singleton => match bucket.records.into_iter().next() {
                    Some(record) => Slot::Single(record),
                    None => Slot::Empty,
                },
                BucketType::Colliding => {
                    let (sub, attempts) = build_sub_table(
                        slot,
                        bucket.records,
                        self.config.coefficient_capacity,
                        self.config.max_attempts,
                        rng,
                    )?;
                    stats.add_sub_table(sub.len(), attempts);
                    Slot::Nested(sub)
                }
            };
            slots.push(entry);
        }

        if self.config.verbose {
            stats.print_summary();
        }
        info!("Perfect Hash Table Build Complete");

        Ok(PerfectHashTable::from_parts(
            first_level,
            slots,
            n - num_dropped,
            num_dropped,
        ))
    }
}

/// Build a collision-free second-level table for one colliding bucket.
///
/// Samples a fresh hash into `4c²` slots and places every record; any
/// collision throws the whole attempt away. Returns the table and the
/// number of rounds it took.
///
/// Fails up front with `IndistinguishableKeys` if two records collide under
/// every hash into `4c²` slots. All keys must already have passed byte
/// validation.
pub fn build_sub_table<R>(
    slot: usize,
    records: Vec<Record>,
    capacity: usize,
    max_attempts: Option<u64>,
    rng: &mut R,
) -> Result<(SubTable, u64), BuildError>
where
    R: Rng + ?Sized,
{
    let size = sub_table_size(records.len()).ok_or(BuildError::SubTableTooLarge {
        slot,
        bucket_size: records.len(),
    })?;
    if let Some((i, j)) = find_inseparable_pair(&records, capacity, size) {
        return Err(indistinguishable(slot, &records[i], &records[j], capacity, size));
    }

    // Record index per sub-table slot
    let mut placement: Vec<Option<usize>> = vec![None; size];
    let mut attempts: u64 = 0;

    let coefficients = loop {
        if let Some(cap) = max_attempts {
            if attempts >= cap {
                return Err(BuildError::AttemptsExhausted { slot, attempts });
            }
        }
        attempts += 1;

        placement.fill(None);
        let candidate = CoefficientVector::sample(rng, size, capacity);
        if place_all(&candidate, &records, &mut placement) {
            break candidate;
        }
        debug!("Slot {}: collision on attempt {}, resampling", slot, attempts);
    };

    if attempts > 1 {
        debug!(
            "Slot {}: {} records placed in {} slots after {} attempts",
            slot,
            records.len(),
            size,
            attempts
        );
    }

    let mut records: Vec<Option<Record>> = records.into_iter().map(Some).collect();
    let slots = placement
        .into_iter()
        .map(|idx| idx.and_then(|i| records[i].take()))
        .collect();

    Ok((SubTable::new(coefficients, slots), attempts))
}

/// Try to place every record; false on the first collision
fn place_all(hasher: &CoefficientVector, records: &[Record], placement: &mut [Option<usize>]) -> bool {
    for (i, record) in records.iter().enumerate() {
        let index = hasher.hash_validated(record.key());
        if placement[index].is_some() {
            return false;
        }
        placement[index] = Some(i);
    }
    true
}

/// Two records of one bucket that no second-level hash can separate
struct InseparablePair {
    slot: usize,
    first: usize,
    second: usize,
    modulus: usize,
}

/// First colliding bucket holding a pair of records that collide under
/// every hash into its `4c²` slots
fn find_inseparable_bucket(buckets: &[Bucket], capacity: usize) -> Result<Option<InseparablePair>, BuildError> {
    for (slot, bucket) in buckets.iter().enumerate() {
        if bucket.bucket_type() != BucketType::Colliding {
            continue;
        }
        let modulus = sub_table_size(bucket.size()).ok_or(BuildError::SubTableTooLarge {
            slot,
            bucket_size: bucket.size(),
        })?;
        if let Some((first, second)) = find_inseparable_pair(&bucket.records, capacity, modulus) {
            return Ok(Some(InseparablePair { slot, first, second, modulus }));
        }
    }
    Ok(None)
}

/// Indices of the first pair of records inseparable modulo `modulus`
fn find_inseparable_pair(records: &[Record], capacity: usize, modulus: usize) -> Option<(usize, usize)> {
    for (i, a) in records.iter().enumerate() {
        for (j, b) in records.iter().enumerate().skip(i + 1) {
            if inseparable(a.key(), b.key(), capacity, modulus) {
                return Some((i, j));
            }
        }
    }
    None
}

fn indistinguishable(slot: usize, a: &Record, b: &Record, capacity: usize, modulus: usize) -> BuildError {
    BuildError::IndistinguishableKeys {
        slot,
        first: String::from_utf8_lossy(a.key()).into_owned(),
        second: String::from_utf8_lossy(b.key()).into_owned(),
        capacity,
        modulus,
    }
}
