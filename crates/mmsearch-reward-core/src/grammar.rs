//! Turn grammar for agent transcripts.
//!
//! Two transcript shapes are legal:
//!
//! - **Direct answer** (one turn): `<think>…</think> … <answer>…</answer>`
//!   with no search markers.
//! - **Search then answer** (two turns): the first turn is
//!   `<think>…</think> … <text_search>…</text_search>` with no answer
//!   markers, the second is a direct-answer turn.
//!
//! Every turn is trimmed before its rule runs. Each rule also requires the
//! think and terminal markers to occur exactly once.

use serde::{Deserialize, Serialize};

use crate::domain::ContractViolation;
use crate::normalize::trim_space;

/// A delimited block inside a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Block {
    Think,
    Answer,
    TextSearch,
}

impl Block {
    pub const fn open(self) -> &'static str {
        match self {
            Self::Think => "<think>",
            Self::Answer => "<answer>",
            Self::TextSearch => "<text_search>",
        }
    }

    pub const fn close(self) -> &'static str {
        match self {
            Self::Think => "</think>",
            Self::Answer => "</answer>",
            Self::TextSearch => "</text_search>",
        }
    }

    /// Both markers occur somewhere in `turn`.
    pub fn is_invoked_in(self, turn: &str) -> bool {
        turn.contains(self.open()) && turn.contains(self.close())
    }

    /// Either marker occurs somewhere in `turn`.
    fn is_mentioned_in(self, turn: &str) -> bool {
        turn.contains(self.open()) || turn.contains(self.close())
    }

    /// Exactly one open and one close marker; returns their byte offsets.
    fn single_span_in(self, turn: &str) -> Option<(usize, usize)> {
        if turn.matches(self.open()).count() != 1 || turn.matches(self.close()).count() != 1 {
            return None;
        }
        Some((turn.find(self.open())?, turn.find(self.close())?))
    }
}

/// Per-turn rule: a think block followed by one terminal block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnKind {
    /// Ends in an answer block; search markers are forbidden.
    DirectAnswer,
    /// Ends in a search block; answer markers are forbidden.
    TextSearch,
}

impl TurnKind {
    pub const fn terminal(self) -> Block {
        match self {
            Self::DirectAnswer => Block::Answer,
            Self::TextSearch => Block::TextSearch,
        }
    }

    pub const fn forbidden(self) -> Block {
        match self {
            Self::DirectAnswer => Block::TextSearch,
            Self::TextSearch => Block::Answer,
        }
    }

    /// Whether `turn` (trimmed) satisfies this rule.
    pub fn accepts(self, turn: &str) -> bool {
        let turn = trim_space(turn);
        let terminal = self.terminal();

        if self.forbidden().is_mentioned_in(turn) {
            return false;
        }
        if !turn.starts_with(Block::Think.open()) || !turn.ends_with(terminal.close()) {
            return false;
        }

        let Some((think_open, think_close)) = Block::Think.single_span_in(turn) else {
            return false;
        };
        let Some((term_open, term_close)) = terminal.single_span_in(turn) else {
            return false;
        };

        // Non-overlapping and in order: <think> </think> <term> </term>.
        think_open + Block::Think.open().len() <= think_close
            && think_close + Block::Think.close().len() <= term_open
            && term_open + terminal.open().len() <= term_close
    }
}

/// Which legal shape a transcript takes, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranscriptShape {
    /// One direct-answer turn.
    DirectAnswer,
    /// A text-search turn followed by a direct-answer turn.
    SearchThenAnswer,
    /// Supported turn count, but the turns break the grammar.
    Invalid,
}

/// Outcome of validating a transcript against the turn grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrammarReport {
    pub shape: TranscriptShape,
    /// Search invocations observed in the first turn (0 or 1).
    pub search_count: u32,
}

impl GrammarReport {
    pub fn format_compliant(&self) -> bool {
        self.shape != TranscriptShape::Invalid
    }

    pub fn search_invoked(&self) -> bool {
        self.search_count > 0
    }
}

/// Classify `turns` against the two legal shapes.
///
/// # Errors
///
/// `ContractViolation::UnsupportedTurnCount` when the transcript does not
/// have exactly one or two turns.
pub fn validate_transcript<S: AsRef<str>>(turns: &[S]) -> Result<GrammarReport, ContractViolation> {
    let shape = match turns {
        [only] => {
            if TurnKind::DirectAnswer.accepts(only.as_ref()) {
                TranscriptShape::DirectAnswer
            } else {
                TranscriptShape::Invalid
            }
        }
        [first, second] => {
            if TurnKind::TextSearch.accepts(first.as_ref())
                && TurnKind::DirectAnswer.accepts(second.as_ref())
            {
                TranscriptShape::SearchThenAnswer
            } else {
                TranscriptShape::Invalid
            }
        }
        _ => {
            return Err(ContractViolation::UnsupportedTurnCount { turns: turns.len() });
        }
    };

    // Only the first turn can carry a search call under this grammar.
    let search_count = u32::from(Block::TextSearch.is_invoked_in(turns[0].as_ref()));

    Ok(GrammarReport {
        shape,
        search_count,
    })
}
