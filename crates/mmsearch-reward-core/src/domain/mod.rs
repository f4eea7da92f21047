//! Domain model for transcript scoring.
//!
//! - `ScoringConfig`: knobs of the reward formula
//! - `GoldAnswerSet`: acceptable reference answers
//! - `Episode`: one rollout sample (turns, answers, overrides)
//! - `ContractViolation` / `RewardError`: the error taxonomy

pub mod answers;
pub mod config;
pub mod episode;
pub mod error;

pub use answers::GoldAnswerSet;
pub use config::{RewardMode, ScoringConfig};
pub use episode::Episode;
pub use error::{ContractViolation, RewardError, Result};
