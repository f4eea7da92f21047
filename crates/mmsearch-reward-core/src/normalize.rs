//! Answer normalization for literal comparison.
//!
//! Steps run in a fixed order: lowercase, strip ASCII punctuation, drop the
//! articles `a`/`an`/`the`, collapse whitespace.

use std::sync::OnceLock;

use regex::Regex;

fn word_runs() -> &'static Regex {
    static WORD_RUNS: OnceLock<Regex> = OnceLock::new();
    WORD_RUNS.get_or_init(|| Regex::new(r"[\p{L}\p{N}_]+").expect("word pattern is valid"))
}

/// Whitespace for splitting and trimming answers: Unicode `White_Space`
/// plus the ASCII information separators U+001C..=U+001F.
pub fn is_space(c: char) -> bool {
    c.is_whitespace() || ('\u{1c}'..='\u{1f}').contains(&c)
}

/// Trim [`is_space`] characters from both ends.
pub fn trim_space(text: &str) -> &str {
    text.trim_matches(is_space)
}

/// Replace every standalone article with a space.
///
/// A word is a maximal run of letters, numbers and `_`; combining marks and
/// other connector punctuation separate words.
fn remove_articles(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for word in word_runs().find_iter(text) {
        if matches!(word.as_str(), "a" | "an" | "the") {
            out.push_str(&text[last..word.start()]);
            out.push(' ');
            last = word.end();
        }
    }
    out.push_str(&text[last..]);
    out
}

/// Canonicalize `text` for exact and substring matching.
pub fn normalize_answer(text: &str) -> String {
    let lowered = text.to_lowercase();
    let unpunctuated: String = lowered
        .chars()
        .filter(|c| !c.is_ascii_punctuation())
        .collect();
    remove_articles(&unpunctuated)
        .split(is_space)
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
