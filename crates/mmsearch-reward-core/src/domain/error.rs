//! Error taxonomy for the scoring engine.
//!
//! Only contract violations are errors. A transcript that breaks the turn
//! grammar, or a final turn with no answer span, is a scored outcome and
//! never surfaces here.

/// Inputs the engine refuses to score.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ContractViolation {
    #[error("transcript is empty: at least one agent turn is required")]
    EmptyTranscript,

    #[error("unsupported number of turns: {turns} (only 1 or 2 are allowed)")]
    UnsupportedTurnCount { turns: usize },

    #[error("reward mode {mode:?} not recognized (expected \"EM\" or \"SubEM\")")]
    UnknownRewardMode { mode: String },

    #[error("invalid value for config key {key}: {reason}")]
    InvalidConfigValue { key: String, reason: String },
}

/// Crate-level errors.
#[derive(Debug, thiserror::Error)]
pub enum RewardError {
    #[error("contract violation: {0}")]
    Contract(#[from] ContractViolation),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RewardError {
    /// The contract violation behind this error, if that is what it is.
    pub fn as_contract_violation(&self) -> Option<&ContractViolation> {
        match self {
            Self::Contract(v) => Some(v),
            Self::Serialization(_) => None,
        }
    }
}

/// Result type for scoring operations.
pub type Result<T> = std::result::Result<T, RewardError>;
