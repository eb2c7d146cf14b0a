//! Usage aggregation: global totals plus ranked per-model and per-project
//! breakdowns

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use crate::services::pricing::display_name;
use crate::types::{
    project_name_of, ModelUsageRow, ProjectUsageRow, TokenTotals, UsageEntry, UsageStats,
};

/// Cost and token totals for one group of entries.
#[derive(Debug, Clone, Default)]
struct GroupTotals {
    cost: f64,
    tokens: TokenTotals,
}

impl GroupTotals {
    fn add(&mut self, entry: &UsageEntry) {
        self.cost += entry.cost_usd.unwrap_or(0.0);
        self.tokens.add(entry);
    }
}

/// Group entries by key, then rank: descending cost, ascending key on ties.
/// Shared by the model and project dimensions.
fn rank_by<F>(entries: &[UsageEntry], key: F) -> Vec<(String, GroupTotals)>
where
    F: Fn(&UsageEntry) -> String,
{
    let mut groups: HashMap<String, GroupTotals> = HashMap::new();
    for entry in entries {
        groups.entry(key(entry)).or_default().add(entry);
    }

    let mut ranked: Vec<(String, GroupTotals)> = groups.into_iter().collect();
    ranked.sort_by(|a, b| {
        b.1.cost
            .partial_cmp(&a.1.cost)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    ranked
}

/// Fold a filtered entry collection into one statistics record.
///
/// Empty input yields all-zero totals and empty breakdowns. Identical input
/// yields identical output; nothing here depends on ambient state beyond the
/// read-only pricing table used for display labels.
pub fn aggregate(entries: &[UsageEntry]) -> UsageStats {
    let mut stats = UsageStats::default();
    let mut sessions: HashSet<&str> = HashSet::new();

    for entry in entries {
        stats.total_cost += entry.cost_usd.unwrap_or(0.0);
        stats.total_input_tokens = stats.total_input_tokens.saturating_add(entry.input_tokens);
        stats.total_output_tokens = stats
            .total_output_tokens
            .saturating_add(entry.output_tokens);
        stats.total_cache_creation_tokens = stats
            .total_cache_creation_tokens
            .saturating_add(entry.cache_creation_tokens);
        stats.total_cache_read_tokens = stats
            .total_cache_read_tokens
            .saturating_add(entry.cache_read_tokens);
        stats.total_tokens = stats.total_tokens.saturating_add(entry.total_tokens());
        sessions.insert(entry.session_id.as_str());
    }
    stats.total_sessions = sessions.len() as u64;

    stats.by_model = rank_by(entries, |e| e.model.clone())
        .into_iter()
        .map(|(model, totals)| ModelUsageRow {
            display_name: display_name(&model),
            model,
            total_cost: totals.cost,
            tokens: totals.tokens,
        })
        .collect();

    stats.by_project = rank_by(entries, |e| e.project_path.clone())
        .into_iter()
        .map(|(path, totals)| ProjectUsageRow {
            project_name: project_name_of(&path).to_string(),
            project_path: path,
            total_cost: totals.cost,
            tokens: totals.tokens,
        })
        .collect();

    stats
}
