//! Correctness predicates over normalized strings.

use crate::domain::{GoldAnswerSet, RewardMode};
use crate::normalize::normalize_answer;

/// True iff the normalized prediction equals some normalized gold answer.
pub fn exact_match(prediction: &str, golds: &GoldAnswerSet) -> bool {
    let prediction = normalize_answer(prediction);
    golds.iter().any(|gold| normalize_answer(gold) == prediction)
}

/// True iff some normalized gold answer occurs inside the normalized prediction.
pub fn substring_match(prediction: &str, golds: &GoldAnswerSet) -> bool {
    let prediction = normalize_answer(prediction);
    golds
        .iter()
        .any(|gold| prediction.contains(normalize_answer(gold).as_str()))
}

impl RewardMode {
    /// Apply the predicate this mode selects.
    pub fn is_match(self, prediction: &str, golds: &GoldAnswerSet) -> bool {
        match self {
            Self::ExactMatch => exact_match(prediction, golds),
            Self::SubstringMatch => substring_match(prediction, golds),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match_after_normalization() {
        let golds = GoldAnswerSet::from("Paris");
        assert!(exact_match("  the PARIS. ", &golds));
        assert!(!exact_match("The capital is Paris.", &golds));
    }

    #[test]
    fn test_substring_match() {
        let golds = GoldAnswerSet::from("Paris");
        assert!(substring_match("The capital is Paris.", &golds));
        assert!(!substring_match("London", &golds));
    }

    #[test]
    fn test_any_gold_suffices() {
        let golds = GoldAnswerSet::new(["Lyon", "Paris", "Paris"]);
        assert!(exact_match("paris", &golds));
        assert!(substring_match("it is paris", &golds));
    }

    #[test]
    fn test_empty_gold_set_never_matches() {
        let golds = GoldAnswerSet::default();
        assert!(!exact_match("", &golds));
        assert!(!substring_match("anything", &golds));
    }

    #[test]
    fn test_gold_that_normalizes_to_empty_is_a_substring_of_everything() {
        let golds = GoldAnswerSet::from("The");
        assert!(substring_match("London", &golds));
        assert!(!exact_match("London", &golds));
    }

    #[test]
    fn test_exact_implies_substring() {
        let cases = [
            ("Paris", vec!["paris"]),
            ("The Cat!", vec!["cat", "dog"]),
            ("New  York", vec!["new york"]),
        ];
        for (prediction, golds) in cases {
            let golds = GoldAnswerSet::new(golds);
            if exact_match(prediction, &golds) {
                assert!(substring_match(prediction, &golds), "{prediction:?}");
            }
        }
    }

    #[test]
    fn test_reward_mode_dispatch() {
        let golds = GoldAnswerSet::from("Paris");
        assert!(!RewardMode::ExactMatch.is_match("The capital is Paris.", &golds));
        assert!(RewardMode::SubstringMatch.is_match("The capital is Paris.", &golds));
    }
}
