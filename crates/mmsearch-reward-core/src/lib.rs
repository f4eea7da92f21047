//! MMSearch Reward Core
//!
//! Scores the transcript of a search-augmented agent episode into a single
//! reward in `[0, 1]`:
//!
//! - [`normalize`]: answer canonicalization
//! - [`matcher`]: exact and substring match predicates
//! - [`extract`]: final-answer extraction from the last turn
//! - [`grammar`]: the two legal transcript shapes
//! - [`reward`]: composition of correctness, format and search signals
//!
//! Every scoring function is pure and touches no shared state, so callers
//! may score episodes on any number of threads.

pub mod domain;
pub mod extract;
pub mod grammar;
pub mod matcher;
pub mod normalize;
pub mod obs;
pub mod reward;
pub mod telemetry;

pub use domain::{
    ContractViolation, Episode, GoldAnswerSet, Result, RewardError, RewardMode, ScoringConfig,
};
pub use extract::extract_answer;
pub use grammar::{validate_transcript, Block, GrammarReport, TranscriptShape, TurnKind};
pub use matcher::{exact_match, substring_match};
pub use normalize::normalize_answer;
pub use reward::{compute_score, score, score_breakdown, ScoreBreakdown, CORRECT_THRESHOLD};
pub use telemetry::init_tracing;
