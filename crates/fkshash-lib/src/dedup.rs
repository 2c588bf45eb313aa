//! First-occurrence-wins deduplication of input records

use crate::record::Record;
use ahash::AHashSet;

/// Keep only the first record for each distinct key, preserving input order
pub fn deduplicate<I>(records: I) -> Vec<Record>
where
    I: IntoIterator<Item = Record>,
{
    let records = records.into_iter();
    let mut seen: AHashSet<Vec<u8>> = AHashSet::with_capacity(records.size_hint().0);
    let mut unique = Vec::with_capacity(records.size_hint().0);

    for record in records {
        if seen.contains(record.key()) {
            continue;
        }
        seen.insert(record.key.clone());
        unique.push(record);
    }

    unique
}
