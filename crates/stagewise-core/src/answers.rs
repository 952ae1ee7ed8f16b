//! # Answer Record
//!
//! Question id -> selected option index. Last write wins.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Answers recorded so far, keyed by question id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerRecord {
    answers: BTreeMap<String, usize>,
}

impl AnswerRecord {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an answer. Returns the previously selected option, if any.
    pub fn record(&mut self, question: impl Into<String>, option: usize) -> Option<usize> {
        self.answers.insert(question.into(), option)
    }

    /// Selected option for a question.
    #[must_use]
    pub fn get(&self, question: &str) -> Option<usize> {
        self.answers.get(question).copied()
    }

    #[must_use]
    pub fn contains(&self, question: &str) -> bool {
        self.answers.contains_key(question)
    }

    /// Number of answered questions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.answers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    /// `(question, option)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.answers.iter().map(|(id, option)| (id.as_str(), *option))
    }

    pub fn clear(&mut self) {
        self.answers.clear();
    }
}

impl<K: Into<String>> FromIterator<(K, usize)> for AnswerRecord {
    fn from_iter<I: IntoIterator<Item = (K, usize)>>(iter: I) -> Self {
        Self {
            answers: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_write_wins() {
        let mut answers = AnswerRecord::new();
        assert_eq!(answers.record("q1", 0), None);
        assert_eq!(answers.record("q1", 3), Some(0));
        assert_eq!(answers.get("q1"), Some(3));
        assert_eq!(answers.len(), 1);
    }

    #[test]
    fn collects_from_pairs() {
        let answers: AnswerRecord = [("q2", 1), ("q1", 0)].into_iter().collect();
        let ids: Vec<_> = answers.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["q1", "q2"]);
    }
}
