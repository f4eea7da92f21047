//! Reference answers for one episode.

use serde::{Deserialize, Serialize};

/// One or more acceptable reference answers.
///
/// Order and duplicates carry no meaning; matching succeeds if any member
/// matches. On the wire this is either a single string or a list of strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "GoldAnswersRepr", into = "Vec<String>")]
pub struct GoldAnswerSet {
    answers: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum GoldAnswersRepr {
    Single(String),
    Many(Vec<String>),
}

impl From<GoldAnswersRepr> for GoldAnswerSet {
    fn from(repr: GoldAnswersRepr) -> Self {
        match repr {
            GoldAnswersRepr::Single(answer) => Self::from(answer),
            GoldAnswersRepr::Many(answers) => Self::from(answers),
        }
    }
}

impl GoldAnswerSet {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        answers.into_iter().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.answers.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for GoldAnswerSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            answers: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<&str> for GoldAnswerSet {
    fn from(answer: &str) -> Self {
        Self {
            answers: vec![answer.to_string()],
        }
    }
}

impl From<String> for GoldAnswerSet {
    fn from(answer: String) -> Self {
        Self {
            answers: vec![answer],
        }
    }
}

impl From<Vec<String>> for GoldAnswerSet {
    fn from(answers: Vec<String>) -> Self {
        Self { answers }
    }
}

impl From<GoldAnswerSet> for Vec<String> {
    fn from(set: GoldAnswerSet) -> Self {
        set.answers
    }
}
