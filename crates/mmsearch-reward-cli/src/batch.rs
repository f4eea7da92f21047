//! Sharded scoring of JSONL episode files.
//!
//! Each non-blank line is an independent episode. Lines are scored on
//! blocking worker tasks, at most `concurrency` at a time, and the outcomes
//! are returned in input order.

use std::sync::Arc;

use anyhow::{Context, Result};
use mmsearch_reward_core::obs::EpisodeSpan;
use mmsearch_reward_core::{Episode, ScoreBreakdown, ScoringConfig};
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::debug;

/// Batch runner settings.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Maximum episodes scored concurrently.
    pub concurrency: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            concurrency: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4),
        }
    }
}

/// Result for one input line: a breakdown, or the reason it was refused.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EpisodeOutcome {
    /// 1-based line number in the input file.
    pub line: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<ScoreBreakdown>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EpisodeOutcome {
    pub fn is_scored(&self) -> bool {
        self.breakdown.is_some()
    }
}

/// Score every episode in `input` (JSONL).
pub async fn run_batch(
    input: &str,
    base: ScoringConfig,
    config: &BatchConfig,
) -> Result<Vec<EpisodeOutcome>> {
    let semaphore = Arc::new(Semaphore::new(config.concurrency.max(1)));
    let mut tasks = JoinSet::new();

    for (idx, raw) in input.lines().enumerate() {
        if raw.trim().is_empty() {
            continue;
        }
        let permit = Arc::clone(&semaphore)
            .acquire_owned()
            .await
            .context("batch semaphore closed")?;
        let raw = raw.to_string();
        tasks.spawn_blocking(move || {
            let _permit = permit;
            score_line(idx + 1, &raw, &base)
        });
    }

    let mut outcomes = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        outcomes.push(joined.context("scoring task failed")?);
    }
    outcomes.sort_by_key(|o| o.line);
    Ok(outcomes)
}

fn score_line(line: usize, raw: &str, base: &ScoringConfig) -> EpisodeOutcome {
    let episode = match Episode::from_json(raw) {
        Ok(episode) => episode,
        Err(e) => {
            debug!(line = line, error = %e, "skipping unparsable episode");
            return EpisodeOutcome {
                line,
                id: None,
                breakdown: None,
                error: Some(e.to_string()),
            };
        }
    };

    let _span = episode.id.as_deref().map(EpisodeSpan::enter);
    match episode.score_breakdown(base) {
        Ok(breakdown) => EpisodeOutcome {
            line,
            id: episode.id,
            breakdown: Some(breakdown),
            error: None,
        },
        Err(e) => EpisodeOutcome {
            line,
            id: episode.id,
            breakdown: None,
            error: Some(e.to_string()),
        },
    }
}

/// Render outcomes as JSONL, one object per line.
pub fn render_jsonl(outcomes: &[EpisodeOutcome]) -> Result<String> {
    let mut out = String::new();
    for outcome in outcomes {
        out.push_str(&serde_json::to_string(outcome).context("serialize outcome")?);
        out.push('\n');
    }
    Ok(out)
}
