//! # Questions and Option Weights
//!
//! The immutable inputs of an assessment: the ordered question bank and the
//! table that maps every answer option to the stage it contributes to.
//!
//! The weight table is injected configuration. A question without an
//! explicit entry falls back to the positional mapping: option `i`
//! contributes weight 1 to `Stage::ALL[i]`.

use crate::error::{DefinitionError, QuestionBankError, WeightTableError};
use crate::stage::Stage;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// QUESTION
// =============================================================================

/// A single questionnaire item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Unique identifier within a bank.
    pub id: String,
    /// Prompt text shown to the respondent.
    pub prompt: String,
    /// Optional longer explanation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Answer option labels, in display order.
    pub options: Vec<String>,
}

impl Question {
    /// Create a question with the given options.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        prompt: impl Into<String>,
        options: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            id: id.into(),
            prompt: prompt.into(),
            description: None,
            options: options.into_iter().map(Into::into).collect(),
        }
    }

    /// Attach a description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Number of selectable options.
    #[must_use]
    pub fn option_count(&self) -> usize {
        self.options.len()
    }
}

// =============================================================================
// QUESTION BANK
// =============================================================================

/// A validated, ordered, non-empty list of questions with unique ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Question>", into = "Vec<Question>")]
pub struct QuestionBank {
    questions: Vec<Question>,
    index: BTreeMap<String, usize>,
}

impl QuestionBank {
    /// Validate and build a bank.
    pub fn new(questions: Vec<Question>) -> Result<Self, QuestionBankError> {
        if questions.is_empty() {
            return Err(QuestionBankError::Empty);
        }

        let mut index = BTreeMap::new();
        for (position, question) in questions.iter().enumerate() {
            if question.options.is_empty() {
                return Err(QuestionBankError::NoOptions(question.id.clone()));
            }
            if index.insert(question.id.clone(), position).is_some() {
                return Err(QuestionBankError::DuplicateId(question.id.clone()));
            }
        }

        Ok(Self { questions, index })
    }

    /// Number of questions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Always false for a constructed bank.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Look up a question by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Question> {
        self.index.get(id).map(|&position| &self.questions[position])
    }

    /// Position of a question in the sequence.
    #[must_use]
    pub fn position(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Question at a sequence position.
    #[must_use]
    pub fn at(&self, position: usize) -> Option<&Question> {
        self.questions.get(position)
    }

    /// Questions in sequence order.
    pub fn iter(&self) -> impl Iterator<Item = &Question> {
        self.questions.iter()
    }

    /// Whether the bank contains a question id.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }
}

impl TryFrom<Vec<Question>> for QuestionBank {
    type Error = QuestionBankError;

    fn try_from(questions: Vec<Question>) -> Result<Self, Self::Error> {
        Self::new(questions)
    }
}

impl From<QuestionBank> for Vec<Question> {
    fn from(bank: QuestionBank) -> Self {
        bank.questions
    }
}

// =============================================================================
// WEIGHT TABLE
// =============================================================================

/// What one answer option contributes: a stage and a positive weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionWeight {
    pub stage: Stage,
    pub weight: u32,
}

impl OptionWeight {
    #[must_use]
    pub const fn new(stage: Stage, weight: u32) -> Self {
        Self { stage, weight }
    }
}

/// Per-question option -> stage/weight table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, Vec<OptionWeight>>", into = "BTreeMap<String, Vec<OptionWeight>>")]
pub struct WeightTable {
    entries: BTreeMap<String, Vec<OptionWeight>>,
}

impl WeightTable {
    /// An empty table: every question uses the positional mapping.
    #[must_use]
    pub fn positional() -> Self {
        Self::default()
    }

    /// Add or replace the explicit mapping for one question.
    pub fn with_question(
        mut self,
        question: impl Into<String>,
        options: Vec<OptionWeight>,
    ) -> Result<Self, WeightTableError> {
        let question = question.into();
        if let Some(option) = options.iter().position(|o| o.weight == 0) {
            return Err(WeightTableError::ZeroWeight { question, option });
        }
        self.entries.insert(question, options);
        Ok(self)
    }

    /// Resolve what an option contributes.
    ///
    /// Explicit entries are authoritative; only questions without one use
    /// the positional fallback.
    #[must_use]
    pub fn resolve(&self, question: &str, option: usize) -> Option<OptionWeight> {
        match self.entries.get(question) {
            Some(options) => options.get(option).copied(),
            None => Stage::ALL
                .get(option)
                .map(|&stage| OptionWeight::new(stage, 1)),
        }
    }

    /// Whether a question has an explicit entry.
    #[must_use]
    pub fn has_entry(&self, question: &str) -> bool {
        self.entries.contains_key(question)
    }

    /// Check that the table only names known questions, that explicit
    /// entries have one weight per option, and that every option of every
    /// question resolves.
    pub fn validate(&self, bank: &QuestionBank) -> Result<(), WeightTableError> {
        if let Some(unknown) = self.entries.keys().find(|id| !bank.contains(id)) {
            return Err(WeightTableError::UnknownQuestion(unknown.clone()));
        }

        for question in bank.iter() {
            if let Some(options) = self
                .entries
                .get(&question.id)
                .filter(|options| options.len() != question.option_count())
            {
                return Err(WeightTableError::OptionCountMismatch {
                    question: question.id.clone(),
                    expected: question.option_count(),
                    found: options.len(),
                });
            }
            for option in 0..question.option_count() {
                if self.resolve(&question.id, option).is_none() {
                    return Err(WeightTableError::UnmappedOption {
                        question: question.id.clone(),
                        option,
                    });
                }
            }
        }

        Ok(())
    }
}

impl TryFrom<BTreeMap<String, Vec<OptionWeight>>> for WeightTable {
    type Error = WeightTableError;

    fn try_from(entries: BTreeMap<String, Vec<OptionWeight>>) -> Result<Self, Self::Error> {
        entries
            .into_iter()
            .try_fold(Self::default(), |table, (question, options)| {
                table.with_question(question, options)
            })
    }
}

impl From<WeightTable> for BTreeMap<String, Vec<OptionWeight>> {
    fn from(table: WeightTable) -> Self {
        table.entries
    }
}

// =============================================================================
// ASSESSMENT DEFINITION
// =============================================================================

/// A question bank paired with a weight table that fully covers it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawDefinition", into = "RawDefinition")]
pub struct AssessmentDefinition {
    bank: QuestionBank,
    weights: WeightTable,
}

impl AssessmentDefinition {
    /// Pair a bank with its weights, checking coverage.
    pub fn new(bank: QuestionBank, weights: WeightTable) -> Result<Self, WeightTableError> {
        weights.validate(&bank)?;
        Ok(Self { bank, weights })
    }

    #[must_use]
    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    #[must_use]
    pub fn weights(&self) -> &WeightTable {
        &self.weights
    }

    /// Split into parts.
    #[must_use]
    pub fn into_parts(self) -> (QuestionBank, WeightTable) {
        (self.bank, self.weights)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawDefinition {
    questions: Vec<Question>,
    #[serde(default)]
    weights: BTreeMap<String, Vec<OptionWeight>>,
}

impl TryFrom<RawDefinition> for AssessmentDefinition {
    type Error = DefinitionError;

    fn try_from(raw: RawDefinition) -> Result<Self, Self::Error> {
        let bank = QuestionBank::new(raw.questions)?;
        let weights = WeightTable::try_from(raw.weights)?;
        Ok(Self::new(bank, weights)?)
    }
}

impl From<AssessmentDefinition> for RawDefinition {
    fn from(def: AssessmentDefinition) -> Self {
        Self {
            questions: def.bank.into(),
            weights: def.weights.into(),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
