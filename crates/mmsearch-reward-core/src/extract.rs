//! Final-answer extraction from the last agent turn.

use std::sync::OnceLock;

use regex::Regex;

use crate::grammar::Block;
use crate::normalize::trim_space;

fn answer_span() -> &'static Regex {
    static ANSWER_SPAN: OnceLock<Regex> = OnceLock::new();
    ANSWER_SPAN.get_or_init(|| {
        let pattern = format!(
            "(?s){}(.*?){}",
            regex::escape(Block::Answer.open()),
            regex::escape(Block::Answer.close())
        );
        Regex::new(&pattern).expect("answer span pattern is valid")
    })
}

/// Trimmed content of the last `<answer>…</answer>` span in `turn`.
///
/// Returns `None` when the turn has no complete answer span, which is
/// distinct from `Some("")` for an empty one.
pub fn extract_answer(turn: &str) -> Option<String> {
    answer_span()
        .captures_iter(turn)
        .last()
        .and_then(|caps| caps.get(1))
        .map(|m| trim_space(m.as_str()).to_string())
}
