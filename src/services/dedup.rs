//! Entry deduplication
//!
//! Rotated, copied, or re-scanned log files can surface the same logical
//! event more than once; double-counting would inflate every cost and token
//! total. Runs before pricing and aggregation.

use std::collections::HashMap;

use crate::types::UsageEntry;

/// Collapse entries sharing an id down to at most one entry per id.
///
/// When two entries share an id but differ in content, the one observed
/// later in source-iteration order wins wholesale, treated as the corrected
/// version. The "later" relation is carried by an explicit sequence tag, not
/// by map insertion order. Output order follows the winning occurrence's
/// position, so repeated runs over the same sources are deterministic.
pub fn dedup_entries(entries: Vec<UsageEntry>) -> Vec<UsageEntry> {
    let mut latest: HashMap<String, (usize, UsageEntry)> = HashMap::new();

    for (seq, entry) in entries.into_iter().enumerate() {
        latest.insert(entry.id(), (seq, entry));
    }

    let mut deduped: Vec<(usize, UsageEntry)> = latest.into_values().collect();
    deduped.sort_by_key(|(seq, _)| *seq);
    deduped.into_iter().map(|(_, entry)| entry).collect()
}
