//! Structured observability hooks for episode scoring.
//!
//! Per-episode events are emitted at `debug!` so that training loops scoring
//! millions of episodes stay quiet at the default level. Contract violations
//! are emitted at `warn!`, batch summaries at `info!`.

use tracing::{debug, info, warn};

use crate::domain::ContractViolation;
use crate::reward::ScoreBreakdown;

/// RAII guard that enters an episode-scoped tracing span.
///
/// # Example
///
/// ```ignore
/// let _span = EpisodeSpan::enter("fvqa_train_0001");
/// // events emitted while scoring are tagged with episode_id
/// ```
pub struct EpisodeSpan {
    _span: tracing::span::EnteredSpan,
}

impl EpisodeSpan {
    pub fn enter(episode_id: &str) -> Self {
        let span = tracing::info_span!("mmsr.episode", episode_id = %episode_id);
        Self {
            _span: span.entered(),
        }
    }
}

/// Emit event: one episode scored.
pub fn emit_episode_scored(turns: usize, breakdown: &ScoreBreakdown) {
    debug!(
        event = "episode.scored",
        turns = turns,
        shape = ?breakdown.shape,
        answered = breakdown.answer.is_some(),
        correct = breakdown.correct,
        format_score = breakdown.format_score,
        search_count = breakdown.search_count,
        reward = breakdown.reward,
    );
}

/// Emit event: an episode was refused (warning level).
pub fn emit_contract_violation(violation: &ContractViolation) {
    warn!(event = "episode.contract_violation", error = %violation);
}

/// Emit event: a batch of episodes finished scoring.
pub fn emit_batch_finished(total: usize, failed: usize, mean_reward: f64, duration_ms: u64) {
    info!(
        event = "batch.finished",
        total = total,
        failed = failed,
        mean_reward = mean_reward,
        duration_ms = duration_ms,
    );
}
