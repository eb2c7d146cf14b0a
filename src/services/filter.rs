//! Time range filtering

use chrono::{DateTime, Utc};

use crate::types::{TimeRange, UsageEntry};

/// Entries whose timestamp falls inside `[now - window, now]`, lower bound
/// inclusive. `now` is sampled once per call, so one invocation is internally
/// consistent. `TimeRange::All` returns every entry, future timestamps
/// included; bounded windows exclude them.
pub fn filter_by_time_range(entries: &[UsageEntry], range: TimeRange) -> Vec<UsageEntry> {
    filter_by_time_range_at(entries, range, Utc::now())
}

/// Range filter with an explicit reference instant.
pub fn filter_by_time_range_at(
    entries: &[UsageEntry],
    range: TimeRange,
    now: DateTime<Utc>,
) -> Vec<UsageEntry> {
    match range.duration() {
        None => entries.to_vec(),
        Some(window) => {
            let cutoff = now - window;
            entries
                .iter()
                .filter(|e| e.timestamp >= cutoff && e.timestamp <= now)
                .cloned()
                .collect()
        }
    }
}
