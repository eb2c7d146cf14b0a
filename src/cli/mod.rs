use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::services::{aggregate, filter_by_time_range, UsageDataLoader};
use crate::types::{TimeRange, UsageStats};

/// Token & cost statistics for Claude Code usage logs
#[derive(Parser)]
#[command(name = "costlens")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Log directory to scan (default: ~/.claude/projects)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Usage summary with top models and projects (default)
    Summary {
        /// Time window to report on
        #[arg(long, value_enum, default_value_t = TimeRange::ThirtyDays)]
        range: TimeRange,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Ranked per-model breakdown
    Models {
        /// Time window to report on
        #[arg(long, value_enum, default_value_t = TimeRange::ThirtyDays)]
        range: TimeRange,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Ranked per-project breakdown
    Projects {
        /// Time window to report on
        #[arg(long, value_enum, default_value_t = TimeRange::ThirtyDays)]
        range: TimeRange,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        let loader = match &self.data_dir {
            Some(dir) => UsageDataLoader::with_data_dir(dir.clone()),
            None => UsageDataLoader::new(),
        };

        let command = self.command.unwrap_or(Commands::Summary {
            range: TimeRange::ThirtyDays,
            json: false,
        });

        match command {
            Commands::Summary { range, json } => {
                let stats = stats_for(&loader, range);
                if json {
                    println!("{}", serde_json::to_string_pretty(&stats)?);
                } else {
                    render_summary(&stats, range);
                }
            }
            Commands::Models { range, json } => {
                let stats = stats_for(&loader, range);
                if json {
                    println!("{}", serde_json::to_string_pretty(&stats.by_model)?);
                } else {
                    render_models(&stats, range);
                }
            }
            Commands::Projects { range, json } => {
                let stats = stats_for(&loader, range);
                if json {
                    println!("{}", serde_json::to_string_pretty(&stats.by_project)?);
                } else {
                    render_projects(&stats, range);
                }
            }
        }

        Ok(())
    }
}

/// One refresh: ingest, filter to the window, aggregate.
fn stats_for(loader: &UsageDataLoader, range: TimeRange) -> UsageStats {
    let entries = loader.list_entries();
    let filtered = filter_by_time_range(&entries, range);
    aggregate(&filtered)
}

/// "$0.0525": four decimal places, same precision as per-entry costs.
pub fn format_cost(cost: f64) -> String {
    format!("${:.4}", cost)
}

/// Abbreviate token counts: 999 → "999", 1500 → "1.5K", 2_300_000 → "2.3M".
pub fn format_tokens(tokens: u64) -> String {
    if tokens >= 1_000_000 {
        format!("{:.1}M", tokens as f64 / 1_000_000.0)
    } else if tokens >= 1_000 {
        format!("{:.1}K", tokens as f64 / 1_000.0)
    } else {
        tokens.to_string()
    }
}

fn render_summary(stats: &UsageStats, range: TimeRange) {
    if stats.total_sessions == 0 {
        println!("No usage data found for range '{}'", range);
        return;
    }

    println!("Usage summary ({})", range);
    println!();
    println!("Total cost   {}", format_cost(stats.total_cost));
    println!("Sessions     {}", stats.total_sessions);
    println!("Tokens       {}", format_tokens(stats.total_tokens));
    println!(
        "             In {} / Out {} / Cache W {} / Cache R {}",
        format_tokens(stats.total_input_tokens),
        format_tokens(stats.total_output_tokens),
        format_tokens(stats.total_cache_creation_tokens),
        format_tokens(stats.total_cache_read_tokens),
    );

    if !stats.by_model.is_empty() {
        println!();
        println!("Top models");
        for row in stats.by_model.iter().take(3) {
            println!(
                "  {:<28} {}",
                row.display_name,
                format_cost(row.total_cost)
            );
        }
    }

    if !stats.by_project.is_empty() {
        println!();
        println!("Top projects");
        for row in stats.by_project.iter().take(3) {
            println!(
                "  {:<28} {}",
                row.project_name,
                format_cost(row.total_cost)
            );
        }
    }
}

fn render_models(stats: &UsageStats, range: TimeRange) {
    if stats.by_model.is_empty() {
        println!("No usage data found for range '{}'", range);
        return;
    }

    println!(
        "{:<32} {:>12} {:>10} {:>10}",
        "Model", "Cost", "In", "Out"
    );
    for row in &stats.by_model {
        println!(
            "{:<32} {:>12} {:>10} {:>10}",
            row.display_name,
            format_cost(row.total_cost),
            format_tokens(row.tokens.input_tokens),
            format_tokens(row.tokens.output_tokens),
        );
    }
}

fn render_projects(stats: &UsageStats, range: TimeRange) {
    if stats.by_project.is_empty() {
        println!("No usage data found for range '{}'", range);
        return;
    }

    println!("{:<32} {:>12} {:>10}", "Project", "Cost", "Tokens");
    for row in &stats.by_project {
        println!(
            "{:<32} {:>12} {:>10}",
            row.project_name,
            format_cost(row.total_cost),
            format_tokens(row.tokens.total()),
        );
    }
}
