//! Session-log ingestion for Claude Code JSONL transcripts

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::Deserialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::services::pricing::canonical_model_name;
use crate::types::{CostlensError, Result, UsageEntry};

/// Transcript line shape (assistant messages carrying usage data).
/// Extra fields are ignored; the format is an external contract that keeps
/// growing.
#[derive(Deserialize)]
struct RawRecord<'a> {
    #[serde(rename = "sessionId", borrow)]
    session_id: Option<&'a str>,
    #[serde(borrow)]
    timestamp: Option<&'a str>,
    #[serde(borrow)]
    cwd: Option<&'a str>,
    #[serde(borrow)]
    message: Option<RawMessage<'a>>,
}

#[derive(Deserialize)]
struct RawMessage<'a> {
    #[serde(borrow)]
    id: Option<&'a str>,
    #[serde(borrow)]
    model: Option<&'a str>,
    usage: Option<RawUsage>,
}

#[derive(Deserialize)]
struct RawUsage {
    input_tokens: u64,
    output_tokens: u64,
    cache_creation_input_tokens: Option<u64>,
    cache_read_input_tokens: Option<u64>,
}

/// Parser for Claude Code session transcripts.
pub struct SessionLogParser {
    data_dir: PathBuf,
}

impl SessionLogParser {
    /// Parser over the default data directory (~/.claude/projects/).
    pub fn new() -> Self {
        let home = directories::BaseDirs::new()
            .map(|d| d.home_dir().to_path_buf())
            .unwrap_or_else(|| {
                eprintln!("[costlens] Warning: could not determine home directory");
                PathBuf::from(".")
            });
        Self {
            data_dir: home.join(".claude").join("projects"),
        }
    }

    /// Parser over a custom data directory.
    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// All transcript files under the data directory, in deterministic
    /// order. Deduplication's later-source-wins tie-break depends on this
    /// order being stable across runs.
    pub fn collect_files(&self) -> Vec<PathBuf> {
        let pattern = self.data_dir.join("**/*.jsonl");
        let mut files: Vec<PathBuf> = glob::glob(&pattern.to_string_lossy())
            .map(|paths| paths.filter_map(|e| e.ok()).collect())
            .unwrap_or_default();
        files.sort();
        files
    }

    /// Parse a single transcript line into zero or one entry (zero-copy with
    /// borrowed strings).
    ///
    /// Records missing a required field, with a malformed timestamp, or with
    /// negative token counts fail to decode and are skipped; parsing
    /// continues with the rest of the source.
    fn parse_line(&self, line: &mut [u8]) -> Option<UsageEntry> {
        if line.is_empty() {
            return None;
        }

        let record: RawRecord = simd_json::from_slice(line).ok()?;

        let session_id = record.session_id?;
        let message = record.message?;
        let message_id = message.id?;
        let model = message.model?;
        let usage = message.usage?;

        // Synthetic responses carry no API usage
        if model == "<synthetic>" {
            return None;
        }

        let raw_ts = record.timestamp?;
        let timestamp = match DateTime::parse_from_rfc3339(raw_ts) {
            Ok(dt) => dt.with_timezone(&Utc),
            Err(_) => {
                eprintln!(
                    "[costlens] Warning: invalid timestamp '{}', skipping record",
                    raw_ts
                );
                return None;
            }
        };

        Some(UsageEntry {
            session_id: session_id.to_string(),
            message_id: message_id.to_string(),
            timestamp,
            model: canonical_model_name(model),
            input_tokens: usage.input_tokens,
            output_tokens: usage.output_tokens,
            cache_creation_tokens: usage.cache_creation_input_tokens.unwrap_or(0),
            cache_read_tokens: usage.cache_read_input_tokens.unwrap_or(0),
            cost_usd: None,
            project_path: record.cwd.unwrap_or("").to_string(),
        })
    }

    /// Parse one transcript file, streaming line-by-line. Malformed lines
    /// are skipped, never fatal.
    pub fn parse_file(&self, path: &Path) -> Result<Vec<UsageEntry>> {
        let file = File::open(path).map_err(CostlensError::Io)?;
        let reader = BufReader::new(file);
        let mut entries = Vec::new();

        for line_result in reader.lines() {
            let line = match line_result {
                Ok(l) => l,
                Err(_) => continue,
            };

            if line.is_empty() {
                continue;
            }

            let mut line_bytes = line.into_bytes();
            if let Some(entry) = self.parse_line(&mut line_bytes) {
                entries.push(entry);
            }
        }

        Ok(entries)
    }

    /// Parse many sources with parallel reads. An unreadable source
    /// contributes nothing; the remaining sources still count. Output
    /// preserves the order of `files`.
    pub fn parse_files(&self, files: &[PathBuf]) -> Vec<UsageEntry> {
        files
            .par_iter()
            .flat_map(|f| match self.parse_file(f) {
                Ok(entries) => entries,
                Err(e) => {
                    eprintln!("[costlens] Warning: failed to read {:?}: {}", f, e);
                    Vec::new()
                }
            })
            .collect()
    }

    /// Parse every transcript under the data directory.
    pub fn parse_all(&self) -> Vec<UsageEntry> {
        self.parse_files(&self.collect_files())
    }
}

impl Default for SessionLogParser {
    fn default() -> Self {
        Self::new()
    }
}
