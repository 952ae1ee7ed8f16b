//! # Error Types
//!
//! One error enum per concern. Every error here is local and recoverable:
//! the operation that produced it has not changed any state.

use thiserror::Error;

// =============================================================================
// DISTRIBUTION
// =============================================================================

/// A stage distribution that violates the 100-point invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DistributionError {
    /// The four percentages do not add up to 100.
    #[error("stage percentages sum to {sum}, expected 100")]
    BadSum { sum: u16 },
}

// =============================================================================
// QUESTION BANK / WEIGHTS
// =============================================================================

/// Errors building a question bank.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuestionBankError {
    /// A bank must hold at least one question.
    #[error("question bank is empty")]
    Empty,

    /// Two questions share an identifier.
    #[error("duplicate question id '{0}'")]
    DuplicateId(String),

    /// A question offers no options to choose from.
    #[error("question '{0}' has no answer options")]
    NoOptions(String),
}

/// Errors building a weight table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WeightTableError {
    /// Option weights must be positive.
    #[error("question '{question}' option {option} has zero weight")]
    ZeroWeight { question: String, option: usize },

    /// The table references a question the bank does not contain.
    #[error("weight table references unknown question '{0}'")]
    UnknownQuestion(String),

    /// A question's options cannot all be resolved to a stage.
    #[error("question '{question}' option {option} has no stage mapping")]
    UnmappedOption { question: String, option: usize },

    /// An explicit entry does not line up with the question's options.
    #[error("question '{question}' has {expected} option(s) but {found} weight(s)")]
    OptionCountMismatch {
        question: String,
        expected: usize,
        found: usize,
    },
}

/// Errors loading a full assessment definition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    #[error(transparent)]
    Questions(#[from] QuestionBankError),

    #[error(transparent)]
    Weights(#[from] WeightTableError),
}

// =============================================================================
// SCORING
// =============================================================================

/// Errors from the scoring model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoringError {
    /// Scoring was invoked before every question had an answer.
    #[error("{} question(s) unanswered: {}", .missing.len(), .missing.join(", "))]
    IncompleteAnswers { missing: Vec<String> },

    /// An answer refers to a question outside the bank.
    #[error("answer for unknown question '{0}'")]
    UnknownQuestion(String),

    /// The selected option is not one of the question's options, or has
    /// no stage mapping.
    #[error("question '{question}' option {option} has no stage mapping")]
    UnmappedOption { question: String, option: usize },

    /// Every answered option carried zero weight.
    #[error("total answer weight is zero")]
    ZeroTotalWeight,
}

// =============================================================================
// STORE
// =============================================================================

/// Errors from a durable position store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The underlying redb database failed.
    #[error("store backend error: {0}")]
    Backend(#[from] redb::Error),

    /// Any other backend failure.
    #[error("store error: {0}")]
    Other(String),
}

// =============================================================================
// SESSION
// =============================================================================

/// Errors from the assessment session controller.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The session has not been started yet.
    #[error("assessment has not been started")]
    NotStarted,

    /// `start`/`resume` called on a session that is already running or done.
    #[error("assessment already started")]
    AlreadyStarted,

    /// The session is completed and read-only until reset.
    #[error("assessment already submitted")]
    AlreadyCompleted,

    /// Navigation outside `[0, total)`.
    #[error("question index {requested} out of bounds (0..{total})")]
    NavigationBounds { requested: i64, total: usize },

    /// Submit called before every question was answered.
    #[error("cannot submit: {answered} of {total} questions answered")]
    IncompleteSubmission { answered: usize, total: usize },

    /// Answer for a question id outside the bank.
    #[error("unknown question '{0}'")]
    UnknownQuestion(String),

    /// Option index outside the question's option list.
    #[error("question '{question}' has {available} options, got index {option}")]
    InvalidOption {
        question: String,
        option: usize,
        available: usize,
    },

    /// Scoring failed during submission.
    #[error(transparent)]
    Scoring(#[from] ScoringError),

    /// Persisting the position failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl SessionError {
    /// Whether this error is a plain guard rejection (as opposed to an
    /// infrastructure failure such as the store).
    #[must_use]
    pub fn is_guard(&self) -> bool {
        !matches!(self, Self::Store(_) | Self::Scoring(_))
    }
}

/// Helper used by store implementations to fold redb's error family.
pub(crate) fn backend(err: impl Into<redb::Error>) -> StoreError {
    StoreError::Backend(err.into())
}

