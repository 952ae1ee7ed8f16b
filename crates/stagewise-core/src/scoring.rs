//! # Scoring Model
//!
//! Pure transformation from a complete answer record into a stage
//! distribution and a dominant stage.
//!
//! ## Algorithm
//!
//! 1. Every question in the bank must have an answer (defensive check).
//! 2. Each answer is resolved through the weight table to `(stage, weight)`.
//! 3. Weights are summed per stage.
//! 4. Totals are normalized with largest-remainder rounding
//!    (see [`StageDistribution::from_totals`]).
//! 5. The dominant stage is the arg-max, ties going to stage priority order.

use crate::answers::AnswerRecord;
use crate::error::ScoringError;
use crate::question::{QuestionBank, WeightTable};
use crate::stage::{Stage, StageDistribution};
use serde::{Deserialize, Serialize};

// =============================================================================
// ASSESSMENT RESULT
// =============================================================================

/// The frozen outcome of one completed assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentResult {
    pub distribution: StageDistribution,
    pub dominant_stage: Stage,
}

impl AssessmentResult {
    /// Wrap a distribution, deriving its dominant stage.
    #[must_use]
    pub fn from_distribution(distribution: StageDistribution) -> Self {
        Self {
            dominant_stage: distribution.dominant(),
            distribution,
        }
    }
}

// =============================================================================
// SCORING MODEL
// =============================================================================

/// Data-driven scorer built around an injected weight table.
#[derive(Debug, Clone, Default)]
pub struct ScoringModel {
    weights: WeightTable,
}

impl ScoringModel {
    #[must_use]
    pub fn new(weights: WeightTable) -> Self {
        Self { weights }
    }

    #[must_use]
    pub fn weights(&self) -> &WeightTable {
        &self.weights
    }

    /// Score a complete answer record.
    pub fn score(
        &self,
        bank: &QuestionBank,
        answers: &AnswerRecord,
    ) -> Result<AssessmentResult, ScoringError> {
        let missing: Vec<String> = bank
            .iter()
            .filter(|q| !answers.contains(&q.id))
            .map(|q| q.id.clone())
            .collect();
        if !missing.is_empty() {
            return Err(ScoringError::IncompleteAnswers { missing });
        }

        if let Some((stray, _)) = answers.iter().find(|(id, _)| !bank.contains(id)) {
            return Err(ScoringError::UnknownQuestion(stray.to_string()));
        }

        let totals = self.stage_totals(bank, answers)?;
        let distribution =
            StageDistribution::from_totals(totals).ok_or(ScoringError::ZeroTotalWeight)?;

        Ok(AssessmentResult::from_distribution(distribution))
    }

    /// Raw weight per stage, in [`Stage::ALL`] order.
    fn stage_totals(
        &self,
        bank: &QuestionBank,
        answers: &AnswerRecord,
    ) -> Result<[u64; 4], ScoringError> {
        let mut totals = [0u64; 4];

        for question in bank.iter() {
            let Some(option) = answers.get(&question.id) else {
                continue;
            };
            let unmapped = || ScoringError::UnmappedOption {
                question: question.id.clone(),
                option,
            };
            if option >= question.option_count() {
                return Err(unmapped());
            }
            let contribution = self
                .weights
                .resolve(&question.id, option)
                .ok_or_else(unmapped)?;
            let slot = &mut totals[contribution.stage.index()];
            *slot = slot.saturating_add(u64::from(contribution.weight));
        }

        Ok(totals)
    }
}

// =============================================================================
// TESTS
// =============================================================================
