//! Integration tests for the build pipeline
//!
//! These tests exercise the full pipeline from raw records to lookups.

use fkshash_lib::builder::{
    buckets::{partition_into_buckets, BucketStatistics, BucketType},
    config::BuildConfiguration,
    table_builder::build_sub_table,
};
use fkshash_lib::constants::{is_prime, smallest_prime_greater_than};
use fkshash_lib::{
    deduplicate, BuildError, CoefficientVector, PerfectHashBuilder, PerfectHashTable, Record, Slot,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn seeded(seed: u64) -> PerfectHashBuilder {
    let config = BuildConfiguration {
        verbose: false,
        ..BuildConfiguration::with_seed(seed)
    };
    PerfectHashBuilder::new(config).unwrap()
}

fn word_records(n: usize) -> Vec<Record> {
    (0..n)
        .map(|i| {
            let key = format!("word{:05}", i);
            let value = format!("{} definition number {}", key, i);
            Record::new(key, value)
        })
        .collect()
}

#[test]
fn test_end_to_end_fruits() {
    let records = vec![
        Record::new("apple", "apple fruit"),
        Record::new("banana", "banana fruit"),
        Record::new("cherry", "cherry fruit"),
    ];

    let table = PerfectHashTable::build(records).unwrap();

    // n = 3 -> m = 5
    assert_eq!(table.num_slots(), 5);
    assert_eq!(table.search(b"apple"), Some(&b"apple fruit"[..]));
    assert_eq!(table.search(b"banana"), Some(&b"banana fruit"[..]));
    assert_eq!(table.search(b"cherry"), Some(&b"cherry fruit"[..]));
    assert_eq!(table.search(b"grape"), None);
}

#[test]
fn test_end_to_end_pipeline_manual() {
    // Step 1: Deduplicate
    let mut raw = word_records(300);
    raw.extend(word_records(50).into_iter().map(|r| Record::new(r.key, "duplicate")));
    let records = deduplicate(raw);
    assert_eq!(records.len(), 300);

    // Step 2: Size the first level
    let m = smallest_prime_greater_than(records.len());
    assert_eq!(m, 307);

    // Step 3: Partition
    let mut rng = StdRng::seed_from_u64(17);
    let first_level = CoefficientVector::sample(&mut rng, m, 100);
    let partition = partition_into_buckets(records, &first_level);
    assert_eq!(partition.num_dropped, 0);

    let mut stats = BucketStatistics::new();
    for bucket in &partition.buckets {
        stats.add_bucket(bucket);
    }
    assert_eq!(stats.num_buckets, 307);
    assert_eq!(stats.num_records, 300);

    // Step 4: Second level for every colliding bucket
    for (slot, bucket) in partition.buckets.into_iter().enumerate() {
        if bucket.bucket_type() != BucketType::Colliding {
            continue;
        }
        let c = bucket.size();
        let keys: Vec<Vec<u8>> = bucket.records.iter().map(|r| r.key.clone()).collect();
        let (sub, _) = build_sub_table(slot, bucket.records, 100, None, &mut rng).unwrap();

        assert_eq!(sub.len(), 4 * c * c);
        assert_eq!(sub.num_occupied(), c);
        for key in &keys {
            assert_eq!(sub.get(key).map(|r| r.key.as_slice()), Some(key.as_slice()));
        }
    }
}

#[test]
fn test_all_records_retrievable() {
    let records = word_records(2000);
    let table = seeded(42).build(records.clone()).unwrap();

    assert_eq!(table.len(), 2000);
    assert!(is_prime(table.num_slots()));
    assert!(table.num_slots() > 2000);
    for record in &records {
        assert_eq!(table.search(record.key()), Some(record.value()));
    }
}

#[test]
fn test_absent_keys_not_found() {
    let table = seeded(8).build(word_records(500)).unwrap();
    for i in 500..1500 {
        let key = format!("word{:05}", i);
        assert_eq!(table.search(key.as_bytes()), None, "{} should be absent", key);
    }
    assert_eq!(table.search(b""), None);
    assert_eq!(table.search(b"word"), None);
}

#[test]
fn test_first_occurrence_wins() {
    let records = vec![
        Record::new("k1", "v1"),
        Record::new("k1", "v2"),
        Record::new("k2", "v3"),
    ];
    let table = seeded(1).build(records).unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(table.num_slots(), 3);
    assert_eq!(table.search(b"k1"), Some(&b"v1"[..]));
    assert_eq!(table.search(b"k2"), Some(&b"v3"[..]));
}

#[test]
fn test_invalid_byte_key_never_retrievable() {
    let bad = vec![b'b', b'a', b'd', 200];
    let records = vec![
        Record::new("good", "1"),
        Record::new(bad.clone(), "2"),
        Record::new("fine", "3"),
    ];
    let table = seeded(5).build(records).unwrap();

    assert_eq!(table.num_dropped(), 1);
    assert_eq!(table.search(&bad), None);
    assert!(!table.contains_key(&bad));
    assert_eq!(table.search(b"good"), Some(&b"1"[..]));
    assert_eq!(table.search(b"fine"), Some(&b"3"[..]));

    // Not present at all: still not found
    assert_eq!(table.search(&[200]), None);
}

#[test]
fn test_long_keys_beyond_capacity() {
    // Keys differ only after the hashed prefix: cannot be separated
    let prefix = "p".repeat(100);
    let records = vec![
        Record::new(format!("{}-one", prefix), "1"),
        Record::new(format!("{}-two", prefix), "2"),
    ];
    assert!(seeded(3).build(records).is_err());

    // Long keys that differ inside the prefix are fine
    let records: Vec<Record> = (0..20)
        .map(|i| Record::new(format!("{:03}{}", i, "x".repeat(150)), format!("{}", i)))
        .collect();
    let table = seeded(3).build(records.clone()).unwrap();
    for record in &records {
        assert_eq!(table.search(record.key()), Some(record.value()));
    }
}

#[test]
fn test_keys_equal_up_to_trailing_zeros() {
    // Zero bytes contribute nothing to the hash sum
    for (x, y) in [("", "\0"), ("a", "a\0"), ("key", "key\0\0")] {
        let err = PerfectHashTable::build(vec![Record::new(x, "1"), Record::new(y, "2")]).unwrap_err();
        assert!(
            matches!(err, BuildError::IndistinguishableKeys { .. }),
            "{:?} / {:?}: {}",
            x,
            y,
            err
        );
    }

    // A lone key with trailing zeros is an ordinary key
    let table = PerfectHashTable::build(vec![Record::new("a\0", "z")]).unwrap();
    assert_eq!(table.search(b"a\0"), Some(&b"z"[..]));
    assert_eq!(table.search(b"a"), None);
}

#[test]
fn test_keys_differing_by_sub_table_size() {
    // 'Q' - 'A' = 16 = 4 · 2²
    match PerfectHashTable::build(vec![Record::new("A", "1"), Record::new("Q", "2")]) {
        Ok(table) => {
            assert_eq!(table.search(b"A"), Some(&b"1"[..]));
            assert_eq!(table.search(b"Q"), Some(&b"2"[..]));
        }
        Err(err) => assert!(matches!(err, BuildError::IndistinguishableKeys { modulus: 16, .. })),
    }

    // The second level alone cannot split them
    let mut rng = StdRng::seed_from_u64(8);
    let records = vec![Record::new("A", "1"), Record::new("Q", "2")];
    assert!(matches!(
        build_sub_table(0, records, 100, None, &mut rng),
        Err(BuildError::IndistinguishableKeys { modulus: 16, .. })
    ));
}

#[test]
fn test_numbered_keys_of_varying_length() {
    // "item-1", "item-10", "item-100" differ by multiples of '0' = 48
    let records: Vec<Record> = (0..1000)
        .map(|i| Record::new(format!("item-{}", i), format!("{}", i)))
        .collect();
    let table = seeded(21).build(records.clone()).unwrap();
    assert_eq!(table.len(), 1000);
    for record in &records {
        assert_eq!(table.search(record.key()), Some(record.value()));
    }
}

#[test]
fn test_nested_slots_are_collision_free() {
    let table = seeded(21).build(word_records(1000)).unwrap();

    let mut nested = 0;
    for (i, slot) in table.slots().iter().enumerate() {
        match slot {
            Slot::Empty => {}
            Slot::Single(record) => {
                assert_eq!(table.first_level().hash(record.key()).unwrap(), i);
            }
            Slot::Nested(sub) => {
                nested += 1;
                let c = sub.num_occupied();
                assert!(c >= 2);
                assert_eq!(sub.len(), 4 * c * c);
                for (j, entry) in sub.slots().iter().enumerate() {
                    if let Some(record) = entry {
                        assert_eq!(table.first_level().hash(record.key()).unwrap(), i);
                        assert_eq!(sub.coefficients().hash(record.key()).unwrap(), j);
                    }
                }
            }
        }
    }
    // 1000 keys in 1009 slots: some collisions are a practical certainty
    assert!(nested > 0);

    let stats = table.statistics();
    assert_eq!(stats.num_nested_slots, nested);
    assert_eq!(
        stats.num_empty_slots + stats.num_single_slots + stats.num_nested_slots,
        table.num_slots()
    );
    assert_eq!(table.iter().count(), 1000);
}

#[test]
fn test_repeated_search_is_stable() {
    let table = seeded(13).build(word_records(100)).unwrap();
    for key in ["word00000", "word00042", "word00099", "missing"] {
        let first = table.search(key.as_bytes());
        for _ in 0..10 {
            assert_eq!(table.search(key.as_bytes()), first);
        }
    }
}

#[test]
fn test_concurrent_readers() {
    let records = word_records(400);
    let table = seeded(77).build(records.clone()).unwrap();

    std::thread::scope(|s| {
        for chunk in records.chunks(100) {
            let table = &table;
            s.spawn(move || {
                for record in chunk {
                    assert_eq!(table.search(record.key()), Some(record.value()));
                }
            });
        }
    });
}
