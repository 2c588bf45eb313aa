//! PerfectHashTable - the built two-level structure
//!
//! Lookups cost one first-level hash plus, for colliding slots, one
//! second-level hash. No probing. The stored key is compared at the final
//! slot, so an absent key is never answered with another key's value.

use crate::builder::{BuildConfiguration, PerfectHashBuilder};
use crate::error::BuildError;
use crate::hasher::CoefficientVector;
use crate::record::Record;
use tracing::info;

/// Second-level table for a colliding first-level slot
#[derive(Clone, Debug)]
pub struct SubTable {
    coefficients: CoefficientVector,
    slots: Vec<Option<Record>>,
}

impl SubTable {
    pub(crate) fn new(coefficients: CoefficientVector, slots: Vec<Option<Record>>) -> Self {
        debug_assert_eq!(coefficients.modulus(), slots.len());
        Self { coefficients, slots }
    }

    /// Number of slots (`4c²` for a bucket of `c` records)
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True if the table has no slots. Never the case for a built table.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of occupied slots
    pub fn num_occupied(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// The second-level hash function of this slot
    pub fn coefficients(&self) -> &CoefficientVector {
        &self.coefficients
    }

    /// All slots, `None` where unoccupied
    pub fn slots(&self) -> &[Option<Record>] {
        &self.slots
    }

    /// Find the record for `key`, if stored here
    #[inline]
    pub fn get(&self, key: &[u8]) -> Option<&Record> {
        let index = self.coefficients.hash(key).ok()?;
        match self.slots.get(index)? {
            Some(record) if record.key() == key => Some(record),
            _ => None,
        }
    }
}

/// Content of a first-level slot
#[derive(Clone, Debug, Default)]
pub enum Slot {
    /// No record hashed here
    #[default]
    Empty,
    /// Exactly one record, stored directly
    Single(Record),
    /// Two or more records, resolved by a second-level table
    Nested(SubTable),
}

impl Slot {
    /// Records held by this slot
    pub fn records(&self) -> Box<dyn Iterator<Item = &Record> + '_> {
        match self {
            Slot::Empty => Box::new(std::iter::empty()),
            Slot::Single(record) => Box::new(std::iter::once(record)),
            Slot::Nested(sub) => Box::new(sub.slots.iter().flatten()),
        }
    }
}

/// Static perfect hash table mapping byte-string keys to values
#[derive(Clone, Debug)]
pub struct PerfectHashTable {
    /// First-level hash, modulus `m`
    first_level: CoefficientVector,

    /// `m` first-level slots
    slots: Vec<Slot>,

    /// Records stored
    num_records: usize,

    /// Unique input records whose keys could not be hashed
    num_dropped: usize,
}

impl PerfectHashTable {
    pub(crate) fn from_parts(
        first_level: CoefficientVector,
        slots: Vec<Slot>,
        num_records: usize,
        num_dropped: usize,
    ) -> Self {
        debug_assert_eq!(first_level.modulus(), slots.len());
        Self {
            first_level,
            slots,
            num_records,
            num_dropped,
        }
    }

    /// Build a table from `records` with the default configuration.
    ///
    /// Duplicate keys keep their first value. Keys containing bytes outside
    /// `[0, 127]` are dropped.
    pub fn build<I>(records: I) -> Result<Self, BuildError>
    where
        I: IntoIterator<Item = Record>,
    {
        PerfectHashBuilder::new(BuildConfiguration::default())?.build(records)
    }

    /// Look up the value stored for `key`.
    ///
    /// # Returns
    /// The value, or `None` if the key is not in the table
    #[inline]
    pub fn search(&self, key: &[u8]) -> Option<&[u8]> {
        self.get_record(key).map(Record::value)
    }

    /// Look up the full record stored for `key`
    #[inline]
    pub fn get_record(&self, key: &[u8]) -> Option<&Record> {
        let index = self.first_level.hash(key).ok()?;
        match self.slots.get(index)? {
            Slot::Empty => None,
            Slot::Single(record) if record.key() == key => Some(record),
            Slot::Single(_) => None,
            Slot::Nested(sub) => sub.get(key),
        }
    }

    /// Check whether `key` is stored
    #[inline]
    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.get_record(key).is_some()
    }

    /// Number of records stored
    pub fn len(&self) -> usize {
        self.num_records
    }

    /// True if no record is stored
    pub fn is_empty(&self) -> bool {
        self.num_records == 0
    }

    /// Number of first-level slots (`m`)
    pub fn num_slots(&self) -> usize {
        self.slots.len()
    }

    /// Number of unique input records dropped for invalid key bytes
    pub fn num_dropped(&self) -> usize {
        self.num_dropped
    }

    /// The first-level hash function
    pub fn first_level(&self) -> &CoefficientVector {
        &self.first_level
    }

    /// First-level slot `index`
    pub fn slot(&self, index: usize) -> Option<&Slot> {
        self.slots.get(index)
    }

    /// All first-level slots
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Iterate over stored records in slot order
    pub fn iter(&self) -> impl Iterator<Item = &Record> + '_ {
        self.slots.iter().flat_map(|slot| slot.records())
    }

    /// Occupancy summary
    pub fn statistics(&self) -> TableStatistics {
        let mut stats = TableStatistics {
            num_slots: self.slots.len(),
            num_records: self.num_records,
            num_dropped: self.num_dropped,
            ..TableStatistics::default()
        };
        for slot in &self.slots {
            match slot {
                Slot::Empty => stats.num_empty_slots += 1,
                Slot::Single(_) => stats.num_single_slots += 1,
                Slot::Nested(sub) => {
                    stats.num_nested_slots += 1;
                    stats.num_sub_table_slots += sub.len();
                }
            }
        }
        stats
    }

    /// Log slot and memory usage via tracing
    pub fn print_space_breakdown(&self) {
        let stats = self.statistics();
        let coefficient_bytes = std::mem::size_of::<u64>()
            * (self.first_level.capacity()
                + stats.num_nested_slots * self.first_level.capacity());
        let payload_bytes: usize = self.iter().map(|r| r.key.len() + r.value.len()).sum();

        info!("Table Space Breakdown:");
        info!("  Records: {} ({} dropped)", stats.num_records, stats.num_dropped);
        info!("  First-level slots: {}", stats.num_slots);
        info!("    empty: {}", stats.num_empty_slots);
        info!("    single: {}", stats.num_single_slots);
        info!("    nested: {}", stats.num_nested_slots);
        info!("  Second-level slots: {}", stats.num_sub_table_slots);
        info!(
            "  Slots per record: {:.2}",
            if stats.num_records == 0 {
                0.0
            } else {
                (stats.num_slots + stats.num_sub_table_slots) as f64 / stats.num_records as f64
            }
        );
        info!("  Coefficient storage: {:.2} KB", coefficient_bytes as f64 / 1024.0);
        info!("  Key/value payload: {:.2} KB", payload_bytes as f64 / 1024.0);
    }
}

/// Occupancy counts of a built table
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TableStatistics {
    /// First-level slots (`m`)
    pub num_slots: usize,
    /// Records stored
    pub num_records: usize,
    /// Records dropped for invalid key bytes
    pub num_dropped: usize,
    /// Empty first-level slots
    pub num_empty_slots: usize,
    /// First-level slots holding one record directly
    pub num_single_slots: usize,
    /// First-level slots with a second-level table
    pub num_nested_slots: usize,
    /// Total slots across all second-level tables
    pub num_sub_table_slots: usize,
}
