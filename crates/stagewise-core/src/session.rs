//! # Assessment Session Controller
//!
//! Owns the mutable state of one assessment attempt.
//!
//! ## State Machine
//!
//! ```text
//!               start() / resume()             submit()
//! NotStarted ───────────────────► InProgress ───────────► Completed
//!     ▲                              │  ▲                     │
//!     │                              └──┘ answer(),           │
//!     │                                   go_to_previous(),   │
//!     │                                   go_to_question()    │
//!     └──────────────────── reset() ──────────────────────────┘
//! ```
//!
//! ## Guarantees
//!
//! - `0 <= current_index <= total` at all times
//! - Every rejected call returns a typed [`SessionError`] and changes nothing
//! - The pointer is written to the store before it changes in memory, so a
//!   failed write also changes nothing
//! - Answers live in memory only; the store holds the pointer alone
//! - Scoring runs once per completed session and the result is frozen

use crate::answers::AnswerRecord;
use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::question::{AssessmentDefinition, Question, QuestionBank};
use crate::scoring::{AssessmentResult, ScoringModel};
use crate::store::PositionStore;
use serde::Serialize;
use tracing::{debug, info, warn};

// =============================================================================
// STATE & PROGRESS
// =============================================================================

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionState {
    NotStarted,
    InProgress,
    Completed,
}

/// Derived progress snapshot for presentation layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    /// 0-based pointer; equals `total` once past the last question.
    pub current_index: usize,
    pub total: usize,
    pub answered: usize,
    /// `answered * 100 / total`, rounded half up.
    pub percent_complete: u8,
}

impl Progress {
    fn new(current_index: usize, total: usize, answered: usize) -> Self {
        let percent_complete = if total == 0 {
            0
        } else {
            // round half up without leaving integer arithmetic
            ((answered * 200 + total) / (total * 2)).min(100) as u8
        };
        Self {
            current_index,
            total,
            answered,
            percent_complete,
        }
    }
}

// =============================================================================
// SESSION
// =============================================================================

/// One assessment attempt, generic over its position store.
pub struct AssessmentSession<S: PositionStore> {
    bank: QuestionBank,
    model: ScoringModel,
    store: S,
    config: SessionConfig,
    user: Option<String>,
    key: String,
    state: SessionState,
    pointer: usize,
    answers: AnswerRecord,
    result: Option<AssessmentResult>,
}

impl<S: PositionStore> AssessmentSession<S> {
    /// Mount a session for an anonymous user with the default config.
    pub fn new(definition: AssessmentDefinition, store: S) -> Self {
        let (bank, weights) = definition.into_parts();
        let config = SessionConfig::default();
        let key = config.key_for(None);
        Self {
            bank,
            model: ScoringModel::new(weights),
            store,
            config,
            user: None,
            key,
            state: SessionState::NotStarted,
            pointer: 0,
            answers: AnswerRecord::new(),
            result: None,
        }
    }

    /// Use a custom configuration.
    #[must_use]
    pub fn with_config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self.key = self.config.key_for(self.user.as_deref());
        self
    }

    /// Attach the authenticated user's identity.
    #[must_use]
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self.key = self.config.key_for(self.user.as_deref());
        self
    }

    // -------------------------------------------------------------------------
    // Transitions
    // -------------------------------------------------------------------------

    /// Begin a fresh attempt at question 0.
    pub fn start(&mut self) -> Result<(), SessionError> {
        self.require_not_started()?;
        self.persist(0)?;

        self.pointer = 0;
        self.answers.clear();
        self.state = SessionState::InProgress;
        info!(key = %self.key, total = self.total(), "assessment started");
        Ok(())
    }

    /// Begin at the persisted pointer, if any. Answers start empty.
    ///
    /// A stored value that does not parse or lies outside `0..=total` is
    /// ignored and the session starts at 0. Returns the pointer used.
    pub fn resume(&mut self) -> Result<usize, SessionError> {
        self.require_not_started()?;

        let stored = self.store.get(&self.key)?;
        let pointer = match stored.as_deref().map(str::parse::<usize>) {
            None => 0,
            Some(Ok(index)) if index <= self.total() => index,
            Some(_) => {
                warn!(
                    key = %self.key,
                    value = stored.as_deref().unwrap_or_default(),
                    "ignoring unusable persisted position"
                );
                0
            }
        };

        self.persist(pointer)?;
        self.pointer = pointer;
        self.answers.clear();
        self.state = SessionState::InProgress;
        info!(key = %self.key, pointer, total = self.total(), "assessment resumed");
        Ok(pointer)
    }

    /// Record (or overwrite) an answer and advance the pointer by one,
    /// stopping at `total`.
    pub fn answer(&mut self, question_id: &str, option: usize) -> Result<Progress, SessionError> {
        self.require_in_progress()?;

        let question = self
            .bank
            .get(question_id)
            .ok_or_else(|| SessionError::UnknownQuestion(question_id.to_string()))
            .map_err(|err| self.rejected(err))?;
        let available = question.option_count();
        if option >= available {
            return Err(self.rejected(SessionError::InvalidOption {
                question: question_id.to_string(),
                option,
                available,
            }));
        }

        let next = (self.pointer + 1).min(self.total());
        if next != self.pointer {
            self.persist(next)?;
        }

        let previous = self.answers.record(question_id, option);
        self.pointer = next;
        debug!(
            question = question_id,
            option,
            ?previous,
            pointer = self.pointer,
            "answer recorded"
        );
        Ok(self.progress())
    }

    /// Step back one question. Fails at question 0.
    pub fn go_to_previous(&mut self) -> Result<usize, SessionError> {
        self.require_in_progress()?;

        let Some(target) = self.pointer.checked_sub(1) else {
            return Err(self.rejected(SessionError::NavigationBounds {
                requested: -1,
                total: self.total(),
            }));
        };

        self.move_to(target)?;
        Ok(target)
    }

    /// Jump directly to a question. Fails unless `index < total`.
    pub fn go_to_question(&mut self, index: usize) -> Result<usize, SessionError> {
        self.require_in_progress()?;

        if index >= self.total() {
            return Err(self.rejected(SessionError::NavigationBounds {
                requested: i64::try_from(index).unwrap_or(i64::MAX),
                total: self.total(),
            }));
        }

        self.move_to(index)?;
        Ok(index)
    }

    /// Score and freeze the session. Requires every question answered.
    pub fn submit(&mut self) -> Result<AssessmentResult, SessionError> {
        self.require_in_progress()?;

        if !self.can_submit() {
            return Err(self.rejected(SessionError::IncompleteSubmission {
                answered: self.answers.len(),
                total: self.total(),
            }));
        }

        let result = self.model.score(&self.bank, &self.answers)?;
        self.store.delete(&self.key)?;

        self.result = Some(result);
        self.state = SessionState::Completed;
        info!(
            key = %self.key,
            dominant = %result.dominant_stage,
            distribution = %result.distribution,
            "assessment submitted"
        );
        Ok(result)
    }

    /// Discard everything and return to `NotStarted`. Valid in any state.
    pub fn reset(&mut self) -> Result<(), SessionError> {
        self.store.delete(&self.key)?;

        self.state = SessionState::NotStarted;
        self.pointer = 0;
        self.answers.clear();
        self.result = None;
        info!(key = %self.key, "assessment reset");
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Read side
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn progress(&self) -> Progress {
        Progress::new(self.pointer, self.total(), self.answers.len())
    }

    /// 0-based pointer into the question sequence.
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.pointer
    }

    /// The question under the pointer while in progress. `None` before
    /// start, after completion, or once the pointer is past the last
    /// question.
    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        match self.state {
            SessionState::InProgress => self.bank.at(self.pointer),
            SessionState::NotStarted | SessionState::Completed => None,
        }
    }

    #[must_use]
    pub fn answers(&self) -> &AnswerRecord {
        &self.answers
    }

    /// Whether the session has been submitted.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.state == SessionState::Completed
    }

    /// Whether `submit()` would pass its guard right now.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        self.state == SessionState::InProgress && self.answers.len() == self.total()
    }

    /// The frozen result, once completed.
    #[must_use]
    pub fn result(&self) -> Option<&AssessmentResult> {
        self.result.as_ref()
    }

    #[must_use]
    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.bank.len()
    }

    /// Store key this session writes its pointer under.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Give back the store.
    pub fn into_store(self) -> S {
        self.store
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn move_to(&mut self, target: usize) -> Result<(), SessionError> {
        self.persist(target)?;
        debug!(from = self.pointer, to = target, "pointer moved");
        self.pointer = target;
        Ok(())
    }

    fn persist(&mut self, pointer: usize) -> Result<(), SessionError> {
        self.store
            .set(&self.key, &pointer.to_string())
            .map_err(|err| {
                warn!(key = %self.key, error = %err, "failed to persist position");
                SessionError::from(err)
            })
    }

    fn require_not_started(&self) -> Result<(), SessionError> {
        match self.state {
            SessionState::NotStarted => Ok(()),
            SessionState::InProgress | SessionState::Completed => {
                Err(self.rejected(SessionError::AlreadyStarted))
            }
        }
    }

    fn require_in_progress(&self) -> Result<(), SessionError> {
        match self.state {
            SessionState::InProgress => Ok(()),
            SessionState::NotStarted => Err(self.rejected(SessionError::NotStarted)),
            SessionState::Completed => Err(self.rejected(SessionError::AlreadyCompleted)),
        }
    }

    fn rejected(&self, err: SessionError) -> SessionError {
        warn!(key = %self.key, state = ?self.state, error = %err, "operation rejected");
        err
    }
}

// =============================================================================
// TESTS
// =============================================================================
