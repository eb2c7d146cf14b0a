//! Usage types for cost and token tracking

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// One recorded unit of assistant usage.
///
/// Created by the parser from a single transcript record, priced exactly once
/// by the cost calculator, then held read-only. `session_id` + `message_id`
/// identify the logical event across rotated or re-scanned log files.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UsageEntry {
    pub session_id: String,
    pub message_id: String,
    pub timestamp: DateTime<Utc>,
    /// Canonical model identifier after normalization
    pub model: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cache_creation_tokens: u64,
    pub cache_read_tokens: u64,
    /// None until the pricing pass has run
    pub cost_usd: Option<f64>,
    /// Absolute path of the originating project; may be empty
    pub project_path: String,
}

impl UsageEntry {
    /// Deduplication key: one logical event per session/message pair.
    pub fn id(&self) -> String {
        format!("{}:{}", self.session_id, self.message_id)
    }

    pub fn total_tokens(&self) -> u64 {
        self.input_tokens
            .saturating_add(self.output_tokens)
            .saturating_add(self.cache_creation_tokens)
            .saturating_add(self.cache_read_tokens)
    }

    /// Last segment of `project_path`, or a fallback label when empty.
    pub fn project_name(&self) -> &str {
        project_name_of(&self.project_path)
    }
}

/// Derive a display label from a project path.
pub fn project_name_of(path: &str) -> &str {
    let name = path
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(path);
    if name.is_empty() {
        "unknown"
    } else {
        name
    }
}

/// Per-category token totals for one group of entries.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenTotals {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cache_creation_tokens: u64,
    pub cache_read_tokens: u64,
}

impl TokenTotals {
    pub fn add(&mut self, entry: &UsageEntry) {
        self.input_tokens = self.input_tokens.saturating_add(entry.input_tokens);
        self.output_tokens = self.output_tokens.saturating_add(entry.output_tokens);
        self.cache_creation_tokens = self
            .cache_creation_tokens
            .saturating_add(entry.cache_creation_tokens);
        self.cache_read_tokens = self
            .cache_read_tokens
            .saturating_add(entry.cache_read_tokens);
    }

    pub fn total(&self) -> u64 {
        self.input_tokens
            .saturating_add(self.output_tokens)
            .saturating_add(self.cache_creation_tokens)
            .saturating_add(self.cache_read_tokens)
    }
}

/// Relative lookback window bounding which entries enter an aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TimeRange {
    /// Last 7 days
    #[value(name = "7d")]
    SevenDays,
    /// Last 30 days
    #[value(name = "30d")]
    ThirtyDays,
    /// No time bound
    All,
}

impl TimeRange {
    /// Window length; `None` for `All`.
    pub fn duration(self) -> Option<Duration> {
        match self {
            TimeRange::SevenDays => Some(Duration::days(7)),
            TimeRange::ThirtyDays => Some(Duration::days(30)),
            TimeRange::All => None,
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TimeRange::SevenDays => "7d",
            TimeRange::ThirtyDays => "30d",
            TimeRange::All => "all",
        };
        write!(f, "{}", label)
    }
}

impl FromStr for TimeRange {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "7d" => Ok(TimeRange::SevenDays),
            "30d" => Ok(TimeRange::ThirtyDays),
            "all" => Ok(TimeRange::All),
            other => Err(format!("unknown time range '{}'", other)),
        }
    }
}

/// One row of the ranked per-model breakdown.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ModelUsageRow {
    pub model: String,
    pub display_name: String,
    pub total_cost: f64,
    pub tokens: TokenTotals,
}

/// One row of the ranked per-project breakdown.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProjectUsageRow {
    pub project_path: String,
    pub project_name: String,
    pub total_cost: f64,
    pub tokens: TokenTotals,
}

/// Aggregation result for one time window. Recomputed fully on every
/// request; both breakdowns are sorted by descending cost, ascending key on
/// ties.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct UsageStats {
    pub total_cost: f64,
    pub total_sessions: u64,
    pub total_tokens: u64,
    pub total_input_tokens: u64,
    pub total_output_tokens: u64,
    pub total_cache_creation_tokens: u64,
    pub total_cache_read_tokens: u64,
    pub by_model: Vec<ModelUsageRow>,
    pub by_project: Vec<ProjectUsageRow>,
}
