//! Static pricing table and cost calculation
//!
//! Rates are USD per token, keyed by canonical model identifier. The table
//! is process-wide read-only state initialized once; unknown models resolve
//! to a zero-rate fallback so pricing never blocks ingestion.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::services::normalizer::normalize_model_name;
use crate::types::UsageEntry;

/// Per-entry costs round to this many decimal places at calculation time,
/// not at aggregation time.
const COST_SCALE: f64 = 10_000.0;

/// Rate card for one canonical model.
#[derive(Debug, Clone, PartialEq)]
pub struct PricingEntry {
    pub display_name: &'static str,
    pub input_rate: f64,
    pub output_rate: f64,
    pub cache_creation_rate: f64,
    pub cache_read_rate: f64,
}

const fn rates(
    display_name: &'static str,
    input_rate: f64,
    output_rate: f64,
    cache_creation_rate: f64,
    cache_read_rate: f64,
) -> PricingEntry {
    PricingEntry {
        display_name,
        input_rate,
        output_rate,
        cache_creation_rate,
        cache_read_rate,
    }
}

/// Lowest-confidence default for models the table does not know.
const FALLBACK: PricingEntry = rates("Unknown Model", 0.0, 0.0, 0.0, 0.0);

/// Read-only rate table: canonical identifiers plus known aliases.
pub struct PricingTable {
    models: HashMap<&'static str, PricingEntry>,
    aliases: HashMap<&'static str, &'static str>,
}

impl PricingTable {
    /// Built-in rate card. Rates are USD per token ($/1M in comments).
    fn builtin() -> Self {
        let mut models = HashMap::new();

        // Opus family: $15 / $75, cache $18.75 / $1.50
        models.insert(
            "claude-3-opus",
            rates("Claude 3 Opus", 0.000015, 0.000075, 0.00001875, 0.0000015),
        );
        models.insert(
            "claude-opus-4",
            rates("Claude Opus 4", 0.000015, 0.000075, 0.00001875, 0.0000015),
        );
        models.insert(
            "claude-opus-4-1",
            rates("Claude Opus 4.1", 0.000015, 0.000075, 0.00001875, 0.0000015),
        );

        // Sonnet family: $3 / $15, cache $3.75 / $0.30
        models.insert(
            "claude-3-sonnet",
            rates("Claude 3 Sonnet", 0.000003, 0.000015, 0.00000375, 0.0000003),
        );
        models.insert(
            "claude-3-5-sonnet",
            rates("Claude 3.5 Sonnet", 0.000003, 0.000015, 0.00000375, 0.0000003),
        );
        models.insert(
            "claude-3-7-sonnet",
            rates("Claude 3.7 Sonnet", 0.000003, 0.000015, 0.00000375, 0.0000003),
        );
        models.insert(
            "claude-sonnet-4",
            rates("Claude Sonnet 4", 0.000003, 0.000015, 0.00000375, 0.0000003),
        );
        models.insert(
            "claude-sonnet-4-5",
            rates("Claude Sonnet 4.5", 0.000003, 0.000015, 0.00000375, 0.0000003),
        );

        // Haiku family
        models.insert(
            "claude-3-haiku",
            rates(
                "Claude 3 Haiku",
                0.00000025,
                0.00000125,
                0.0000003,
                0.00000003,
            ),
        );
        models.insert(
            "claude-3-5-haiku",
            rates(
                "Claude 3.5 Haiku",
                0.0000008,
                0.000004,
                0.000001,
                0.00000008,
            ),
        );
        models.insert(
            "claude-haiku-4-5",
            rates("Claude Haiku 4.5", 0.000001, 0.000005, 0.00000125, 0.0000001),
        );

        let mut aliases = HashMap::new();
        aliases.insert("claude-opus-4-0", "claude-opus-4");
        aliases.insert("claude-sonnet-4-0", "claude-sonnet-4");
        aliases.insert("claude-3-5-sonnet-latest", "claude-3-5-sonnet");
        aliases.insert("claude-3-5-sonnet-v2", "claude-3-5-sonnet");
        aliases.insert("claude-3-5-haiku-latest", "claude-3-5-haiku");

        Self { models, aliases }
    }

    /// Shared process-wide table.
    pub fn global() -> &'static PricingTable {
        static TABLE: OnceLock<PricingTable> = OnceLock::new();
        TABLE.get_or_init(PricingTable::builtin)
    }

    /// Exact canonical match, then known-alias match. No fallback here; the
    /// caller decides what an unresolved identifier means.
    pub fn lookup(&self, model: &str) -> Option<&PricingEntry> {
        let canonical = normalize_model_name(model);
        if let Some(entry) = self.models.get(canonical.as_str()) {
            return Some(entry);
        }
        self.aliases
            .get(canonical.as_str())
            .and_then(|target| self.models.get(target))
    }

    /// Resolve an identifier to a rate card, never failing: exact match,
    /// alias match, family heuristic, zero-rate fallback, in that order.
    pub fn resolve(&self, model: &str) -> &PricingEntry {
        if let Some(entry) = self.lookup(model) {
            return entry;
        }
        self.family_default(&normalize_model_name(model))
            .unwrap_or(&FALLBACK)
    }

    /// Rate card for the model family named inside an otherwise unknown
    /// identifier (e.g. a dated preview build of an opus-class model).
    fn family_default(&self, canonical: &str) -> Option<&PricingEntry> {
        if canonical.contains("opus") {
            self.models.get("claude-opus-4")
        } else if canonical.contains("sonnet") {
            self.models.get("claude-sonnet-4")
        } else if canonical.contains("haiku") {
            self.models.get("claude-3-5-haiku")
        } else {
            None
        }
    }
}

/// Canonical grouping/pricing key for a raw model identifier: normalized
/// form with known aliases folded to their target. Unrecognized identifiers
/// stay in normalized form rather than being rejected.
pub fn canonical_model_name(model: &str) -> String {
    let normalized = normalize_model_name(model);
    match PricingTable::global().aliases.get(normalized.as_str()) {
        Some(target) => (*target).to_string(),
        None => normalized,
    }
}

fn round_cost(value: f64) -> f64 {
    (value * COST_SCALE).round() / COST_SCALE
}

/// Cost of one entry's token usage under the given table, rounded to the
/// fixed monetary precision.
pub fn calculate_cost(entry: &UsageEntry, table: &PricingTable) -> f64 {
    let pricing = table.resolve(&entry.model);
    round_cost(
        entry.input_tokens as f64 * pricing.input_rate
            + entry.output_tokens as f64 * pricing.output_rate
            + entry.cache_creation_tokens as f64 * pricing.cache_creation_rate
            + entry.cache_read_tokens as f64 * pricing.cache_read_rate,
    )
}

/// Attach a cost to every entry of a deduplicated batch. Runs once per
/// refresh; nothing downstream recomputes costs.
pub fn price_entries(entries: Vec<UsageEntry>, table: &PricingTable) -> Vec<UsageEntry> {
    entries
        .into_iter()
        .map(|mut entry| {
            entry.cost_usd = Some(calculate_cost(&entry, table));
            entry
        })
        .collect()
}

/// Human-readable label for a model identifier. Identifiers the table cannot
/// resolve display as themselves.
pub fn display_name(model: &str) -> String {
    match PricingTable::global().lookup(model) {
        Some(entry) => entry.display_name.to_string(),
        None => model.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn make_entry(model: &str, input: u64, output: u64, cache_w: u64, cache_r: u64) -> UsageEntry {
        UsageEntry {
            session_id: "s1".into(),
            message_id: "m1".into(),
            timestamp: Utc::now(),
            model: model.into(),
            input_tokens: input,
            output_tokens: output,
            cache_creation_tokens: cache_w,
            cache_read_tokens: cache_r,
            cost_usd: None,
            project_path: "/home/dev/alpha".into(),
        }
    }

    // ========== Resolution ==========

    #[test]
    fn test_resolve_exact_match() {
        let table = PricingTable::global();
        let entry = table.resolve("claude-3-opus");
        assert_eq!(entry.display_name, "Claude 3 Opus");
        assert!((entry.input_rate - 0.000015).abs() < 1e-12);
    }

    #[test]
    fn test_resolve_dated_identifier() {
        let table = PricingTable::global();
        let entry = table.resolve("claude-sonnet-4-20250514");
        assert_eq!(entry.display_name, "Claude Sonnet 4");
    }

    #[test]
    fn test_resolve_alias() {
        let table = PricingTable::global();
        let entry = table.resolve("claude-3-5-sonnet-latest");
        assert_eq!(entry.display_name, "Claude 3.5 Sonnet");
    }

    #[test]
    fn test_resolve_case_insensitive() {
        let table = PricingTable::global();
        let entry = table.resolve("Claude-3-Opus-20240229");
        assert_eq!(entry.display_name, "Claude 3 Opus");
    }

    #[test]
    fn test_resolve_family_heuristic() {
        let table = PricingTable::global();
        let entry = table.resolve("custom-opus-preview");
        assert!((entry.input_rate - 0.000015).abs() < 1e-12);
    }

    #[test]
    fn test_resolve_unknown_falls_back_to_zero_rates() {
        let table = PricingTable::global();
        let entry = table.resolve("unknown-model-x");
        assert!((entry.input_rate).abs() < f64::EPSILON);
        assert!((entry.output_rate).abs() < f64::EPSILON);
    }

    #[test]
    fn test_lookup_has_no_fallback() {
        let table = PricingTable::global();
        assert!(table.lookup("unknown-model-x").is_none());
        assert!(table.lookup("custom-opus-preview").is_none());
    }

    // ========== Cost calculation ==========

    #[test]
    fn test_calculate_cost_opus() {
        // 1000 * 0.000015 + 500 * 0.000075 = 0.0525
        let entry = make_entry("claude-3-opus", 1000, 500, 0, 0);
        let cost = calculate_cost(&entry, PricingTable::global());
        assert!((cost - 0.0525).abs() < 1e-10);
    }

    #[test]
    fn test_calculate_cost_all_categories() {
        // Sonnet: 1000*0.000003 + 500*0.000015 + 200*0.00000375 + 300*0.0000003
        // = 0.003 + 0.0075 + 0.00075 + 0.00009 = 0.01134 → rounds to 0.0113
        let entry = make_entry("claude-sonnet-4", 1000, 500, 200, 300);
        let cost = calculate_cost(&entry, PricingTable::global());
        assert!((cost - 0.0113).abs() < 1e-10);
    }

    #[test]
    fn test_calculate_cost_rounds_to_four_decimals() {
        // 1 input token of sonnet is 0.000003, below the precision floor
        let entry = make_entry("claude-sonnet-4", 1, 0, 0, 0);
        let cost = calculate_cost(&entry, PricingTable::global());
        assert!((cost).abs() < f64::EPSILON);
    }

    #[test]
    fn test_calculate_cost_unknown_model_is_zero() {
        let entry = make_entry("unknown-model-x", 1000, 500, 0, 0);
        let cost = calculate_cost(&entry, PricingTable::global());
        assert!((cost).abs() < f64::EPSILON);
    }

    #[test]
    fn test_price_entries_attaches_cost_once() {
        let entries = vec![
            make_entry("claude-3-opus", 1000, 500, 0, 0),
            make_entry("unknown-model-x", 10, 10, 0, 0),
        ];
        let priced = price_entries(entries, PricingTable::global());

        assert!((priced[0].cost_usd.unwrap() - 0.0525).abs() < 1e-10);
        assert!((priced[1].cost_usd.unwrap()).abs() < f64::EPSILON);
    }

    // ========== Canonicalization ==========

    #[test]
    fn test_canonical_model_name_folds_aliases() {
        assert_eq!(
            canonical_model_name("claude-3-5-sonnet-latest"),
            "claude-3-5-sonnet"
        );
        assert_eq!(canonical_model_name("claude-opus-4-0"), "claude-opus-4");
    }

    #[test]
    fn test_canonical_model_name_unknown_stays_normalized() {
        assert_eq!(
            canonical_model_name("Unknown-Model-X "),
            "unknown-model-x"
        );
    }

    // ========== Display names ==========

    #[test]
    fn test_display_name_known_model() {
        assert_eq!(display_name("claude-3-opus"), "Claude 3 Opus");
        assert_eq!(display_name("claude-opus-4-1-20250805"), "Claude Opus 4.1");
    }

    #[test]
    fn test_display_name_unknown_model_is_identity() {
        assert_eq!(display_name("unknown-model-x"), "unknown-model-x");
    }

    #[test]
    fn test_display_name_heuristic_match_stays_raw() {
        // Family-priced but not table-resolved: label stays verbatim
        assert_eq!(display_name("custom-opus-preview"), "custom-opus-preview");
    }
}
