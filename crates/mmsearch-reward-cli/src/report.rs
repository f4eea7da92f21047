use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use mmsearch_reward_core::{ScoreBreakdown, ScoringConfig};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::batch::EpisodeOutcome;

pub const SUMMARY_SCHEMA_VERSION: &str = "1";

/// Aggregate view of one batch run, written next to the per-episode output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BatchSummary {
    pub schema_version: String,
    pub generated_at: DateTime<Utc>,
    /// SHA-256 hex digest of the input file.
    pub input_digest: String,
    pub config: ScoringConfig,
    pub total_episodes: usize,
    pub scored_episodes: usize,
    pub rejected_episodes: usize,
    /// Means below are taken over scored episodes only.
    pub mean_reward: f64,
    pub format_compliance_rate: f64,
    pub search_rate: f64,
}

impl BatchSummary {
    pub fn from_outcomes(outcomes: &[EpisodeOutcome], input: &[u8], config: ScoringConfig) -> Self {
        let scored: Vec<&ScoreBreakdown> =
            outcomes.iter().filter_map(|o| o.breakdown.as_ref()).collect();
        let n = scored.len();

        Self {
            schema_version: SUMMARY_SCHEMA_VERSION.to_string(),
            generated_at: Utc::now(),
            input_digest: sha256_hex(input),
            config,
            total_episodes: outcomes.len(),
            scored_episodes: n,
            rejected_episodes: outcomes.len() - n,
            mean_reward: mean_of(&scored, |b| b.reward),
            format_compliance_rate: mean_of(&scored, |b| b.format_score),
            search_rate: mean_of(&scored, |b| if b.search_count > 0 { 1.0 } else { 0.0 }),
        }
    }
}

fn mean_of(scored: &[&ScoreBreakdown], f: impl Fn(&ScoreBreakdown) -> f64) -> f64 {
    if scored.is_empty() {
        return 0.0;
    }
    scored.iter().map(|&b| f(b)).sum::<f64>() / scored.len() as f64
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Write the summary in pretty JSON format.
pub fn write_summary_json(path: &Path, summary: &BatchSummary) -> Result<()> {
    let content = serde_json::to_string_pretty(summary).context("serialize batch summary")?;
    std::fs::write(path, content).with_context(|| format!("write {:?}", path))?;
    Ok(())
}
