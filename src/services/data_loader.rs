//! Refresh pipeline: parse all sources, deduplicate, price
//!
//! Each call recomputes from a private working set, so concurrent refreshes
//! share nothing but the read-only pricing table. A superseded refresh is
//! simply discarded by its caller.

use std::path::PathBuf;

use crate::parsers::SessionLogParser;
use crate::services::dedup::dedup_entries;
use crate::services::pricing::{price_entries, PricingTable};
use crate::types::UsageEntry;

/// Recomputes the full deduplicated, priced entry set on demand.
pub struct UsageDataLoader {
    parser: SessionLogParser,
}

impl UsageDataLoader {
    pub fn new() -> Self {
        Self {
            parser: SessionLogParser::new(),
        }
    }

    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self {
            parser: SessionLogParser::with_data_dir(data_dir),
        }
    }

    /// Full entry set from every log source currently available. No usable
    /// source at all surfaces as an empty result, not an error.
    pub fn list_entries(&self) -> Vec<UsageEntry> {
        self.entries_from(&self.parser.collect_files())
    }

    /// Same pipeline over an explicit list of log sources. Dedup runs before
    /// pricing; no aggregation path bypasses it.
    pub fn entries_from(&self, files: &[PathBuf]) -> Vec<UsageEntry> {
        let parsed = self.parser.parse_files(files);
        let deduped = dedup_entries(parsed);
        price_entries(deduped, PricingTable::global())
    }
}

impl Default for UsageDataLoader {
    fn default() -> Self {
        Self::new()
    }
}
