//! Scoring configuration.
//!
//! Configuration is always passed explicitly. The rollout system ships its
//! per-sample overrides in an `extra_info` JSON map; [`ScoringConfig::from_extra_info`]
//! and [`ScoringConfig::overlay_extra_info`] read the recognized keys from it
//! and ignore everything else.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::ContractViolation;

pub const DEFAULT_SEARCH_PENALTY: f64 = 0.1;
pub const DEFAULT_FORMAT_PENALTY: f64 = 0.1;

pub const KEY_REWARD_MODE: &str = "reward_mode";
pub const KEY_SEARCH_PENALTY: &str = "search_penalty";
pub const KEY_FORMAT_PENALTY: &str = "format_penalty";
pub const KEY_USE_SEARCH_COUNT_PENALTY: &str = "use_search_count_penalty";

/// Correctness predicate used by the compositor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RewardMode {
    /// Normalized prediction must equal a normalized gold answer.
    #[default]
    #[serde(rename = "EM")]
    ExactMatch,

    /// A normalized gold answer must occur inside the normalized prediction.
    #[serde(rename = "SubEM")]
    SubstringMatch,
}

impl RewardMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ExactMatch => "EM",
            Self::SubstringMatch => "SubEM",
        }
    }
}

impl fmt::Display for RewardMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RewardMode {
    type Err = ContractViolation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "EM" => Ok(Self::ExactMatch),
            "SubEM" => Ok(Self::SubstringMatch),
            other => Err(ContractViolation::UnknownRewardMode {
                mode: other.to_string(),
            }),
        }
    }
}

/// Knobs of the reward formula.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Correctness predicate.
    pub reward_mode: RewardMode,

    /// Multiplicative discount on a correct answer when a search was used.
    pub search_penalty: f64,

    /// Weight of the format-compliance term in the final blend.
    pub format_penalty: f64,

    /// Apply the search discount once per counted search invocation.
    pub use_search_count_penalty: bool,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            reward_mode: RewardMode::ExactMatch,
            search_penalty: DEFAULT_SEARCH_PENALTY,
            format_penalty: DEFAULT_FORMAT_PENALTY,
            use_search_count_penalty: false,
        }
    }
}

impl ScoringConfig {
    pub fn with_reward_mode(mut self, reward_mode: RewardMode) -> Self {
        self.reward_mode = reward_mode;
        self
    }

    pub fn with_search_penalty(mut self, search_penalty: f64) -> Self {
        self.search_penalty = search_penalty;
        self
    }

    pub fn with_format_penalty(mut self, format_penalty: f64) -> Self {
        self.format_penalty = format_penalty;
        self
    }

    pub fn with_search_count_penalty(mut self, enabled: bool) -> Self {
        self.use_search_count_penalty = enabled;
        self
    }

    /// Check that both penalties are finite and within `[0, 1]`.
    ///
    /// Keeps the final reward inside `[0, 1]`.
    pub fn validate(&self) -> Result<(), ContractViolation> {
        check_unit_interval(KEY_SEARCH_PENALTY, self.search_penalty)?;
        check_unit_interval(KEY_FORMAT_PENALTY, self.format_penalty)?;
        Ok(())
    }

    /// Build a config from an optional `extra_info` map, falling back to the
    /// documented defaults for every key that is missing or `null`.
    pub fn from_extra_info(extra_info: Option<&Value>) -> Result<Self, ContractViolation> {
        match extra_info {
            Some(info) => Self::default().overlay_extra_info(info),
            None => Ok(Self::default()),
        }
    }

    /// Apply the recognized keys of `extra_info` on top of `self`.
    ///
    /// Unrecognized keys are ignored. A value that is not a JSON object
    /// carries no overrides.
    pub fn overlay_extra_info(self, extra_info: &Value) -> Result<Self, ContractViolation> {
        let Some(map) = extra_info.as_object() else {
            return Ok(self);
        };
        let mut config = self;

        if let Some(value) = present(map.get(KEY_REWARD_MODE)) {
            let mode = value
                .as_str()
                .ok_or_else(|| ContractViolation::UnknownRewardMode {
                    mode: value.to_string(),
                })?;
            config.reward_mode = mode.parse()?;
        }
        if let Some(value) = present(map.get(KEY_SEARCH_PENALTY)) {
            config.search_penalty = number(KEY_SEARCH_PENALTY, value)?;
        }
        if let Some(value) = present(map.get(KEY_FORMAT_PENALTY)) {
            config.format_penalty = number(KEY_FORMAT_PENALTY, value)?;
        }
        if let Some(value) = present(map.get(KEY_USE_SEARCH_COUNT_PENALTY)) {
            config.use_search_count_penalty =
                value
                    .as_bool()
                    .ok_or_else(|| ContractViolation::InvalidConfigValue {
                        key: KEY_USE_SEARCH_COUNT_PENALTY.to_string(),
                        reason: format!("expected a boolean, got {value}"),
                    })?;
        }

        config.validate()?;
        Ok(config)
    }
}

fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

fn number(key: &str, value: &Value) -> Result<f64, ContractViolation> {
    value
        .as_f64()
        .ok_or_else(|| ContractViolation::InvalidConfigValue {
            key: key.to_string(),
            reason: format!("expected a number, got {value}"),
        })
}

fn check_unit_interval(key: &str, value: f64) -> Result<(), ContractViolation> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ContractViolation::InvalidConfigValue {
            key: key.to_string(),
            reason: format!("{value} is outside [0, 1]"),
        })
    }
}
