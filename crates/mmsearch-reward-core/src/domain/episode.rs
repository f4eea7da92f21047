//! Per-sample input record as produced by the rollout system.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::answers::GoldAnswerSet;
use super::config::ScoringConfig;
use super::error::Result;
use crate::reward::{score_breakdown, ScoreBreakdown};

/// One episode: the agent's turns, the reference answers and any per-sample
/// config overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    /// Caller-assigned identifier, echoed back in reports.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Agent responses in order, one per turn.
    pub responses: Vec<String>,

    pub ground_truth: GoldAnswerSet,

    /// Free-form sample metadata; the recognized scoring keys are read from it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_info: Option<Value>,
}

impl Episode {
    pub fn new(responses: Vec<String>, ground_truth: impl Into<GoldAnswerSet>) -> Self {
        Self {
            id: None,
            responses,
            ground_truth: ground_truth.into(),
            extra_info: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_extra_info(mut self, extra_info: Value) -> Self {
        self.extra_info = Some(extra_info);
        self
    }

    /// Parse an episode from a JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Effective config: `extra_info` overrides applied on top of `base`.
    pub fn config(&self, base: &ScoringConfig) -> Result<ScoringConfig> {
        let config = match &self.extra_info {
            Some(info) => base.overlay_extra_info(info)?,
            None => {
                base.validate()?;
                *base
            }
        };
        Ok(config)
    }

    pub fn score_breakdown(&self, base: &ScoringConfig) -> Result<ScoreBreakdown> {
        let config = self.config(base)?;
        score_breakdown(&self.responses, &self.ground_truth, &config)
    }

    pub fn score(&self, base: &ScoringConfig) -> Result<f64> {
        Ok(self.score_breakdown(base)?.reward)
    }
}
