//! Reward composition.
//!
//! ```text
//! correct  = 1 if the last turn's answer matches a gold answer, else 0
//! correct *= (1 - search_penalty)   when a search was used and correct > 0.99
//! reward   = (1 - format_penalty) * correct + format_penalty * format_score
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{ContractViolation, GoldAnswerSet, Result, ScoringConfig};
use crate::extract::extract_answer;
use crate::grammar::{validate_transcript, TranscriptShape};
use crate::obs;

/// Correctness above this counts as "answered correctly" for the search penalty.
pub const CORRECT_THRESHOLD: f64 = 0.99;

/// Every intermediate signal of one scoring call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Extracted final answer, `None` if the last turn had no answer span.
    pub answer: Option<String>,
    /// Correctness after the search penalty.
    pub correct: f64,
    pub format_score: f64,
    pub search_count: u32,
    pub shape: TranscriptShape,
    pub reward: f64,
}

/// Score one episode.
pub fn score<S: AsRef<str>>(
    turns: &[S],
    golds: &GoldAnswerSet,
    config: &ScoringConfig,
) -> Result<f64> {
    Ok(score_breakdown(turns, golds, config)?.reward)
}

/// Score one episode and keep the intermediate signals.
///
/// # Errors
///
/// - `ContractViolation::EmptyTranscript`: `turns` is empty.
/// - `ContractViolation::UnsupportedTurnCount`: more than two turns.
/// - `ContractViolation::InvalidConfigValue`: a penalty outside `[0, 1]`.
pub fn score_breakdown<S: AsRef<str>>(
    turns: &[S],
    golds: &GoldAnswerSet,
    config: &ScoringConfig,
) -> Result<ScoreBreakdown> {
    let Some(last) = turns.last() else {
        obs::emit_contract_violation(&ContractViolation::EmptyTranscript);
        return Err(ContractViolation::EmptyTranscript.into());
    };
    config.validate()?;

    let answer = extract_answer(last.as_ref());
    let mut correct = match &answer {
        Some(a) if config.reward_mode.is_match(a, golds) => 1.0,
        _ => 0.0,
    };

    let report = validate_transcript(turns).map_err(|violation| {
        obs::emit_contract_violation(&violation);
        violation
    })?;
    let format_score = if report.format_compliant() { 1.0 } else { 0.0 };

    // Incorrect answers already score 0; only correct ones pay for searching.
    if report.search_invoked() && correct > CORRECT_THRESHOLD {
        let discount = 1.0 - config.search_penalty;
        if config.use_search_count_penalty {
            for _ in 0..report.search_count {
                correct *= discount;
            }
        } else {
            correct *= discount;
        }
    }

    let reward = (1.0 - config.format_penalty) * correct + config.format_penalty * format_score;

    let breakdown = ScoreBreakdown {
        answer,
        correct,
        format_score,
        search_count: report.search_count,
        shape: report.shape,
        reward,
    };
    obs::emit_episode_scored(turns.len(), &breakdown);
    Ok(breakdown)
}

/// Score with the config taken from a rollout sample's `extra_info` map.
pub fn compute_score<S: AsRef<str>>(
    turns: &[S],
    golds: &GoldAnswerSet,
    extra_info: Option<&Value>,
) -> Result<f64> {
    if turns.is_empty() {
        obs::emit_contract_violation(&ContractViolation::EmptyTranscript);
        return Err(ContractViolation::EmptyTranscript.into());
    }
    let config = ScoringConfig::from_extra_info(extra_info)?;
    score(turns, golds, &config)
}
