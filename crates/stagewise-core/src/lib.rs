//! # Stagewise Core
//!
//! Deterministic engine behind the organizational-health assessment.
//!
//! The crate turns questionnaire answers into a stage-distribution profile
//! and drives one assessment attempt from start to submission:
//!
//! ```text
//! ┌──────────────┐   answers    ┌──────────────┐   distribution   ┌──────────────┐
//! │ Session      │ ───────────► │ ScoringModel │ ───────────────► │ Gap / Rollup │
//! │ (controller) │              │ (pure)       │                  │ (pure)       │
//! └──────┬───────┘              └──────────────┘                  └──────────────┘
//!        │ pointer
//!        ▼
//! ┌──────────────┐
//! │ PositionStore│  (injected: MemoryStore, RedbStore, ...)
//! └──────────────┘
//! ```
//!
//! ## Design Principles
//!
//! - Integer arithmetic only; percentages are whole numbers that sum to 100
//! - BTreeMap for every map whose order can be observed
//! - Every rejected operation leaves the session untouched

pub mod aggregate;
pub mod answers;
pub mod config;
pub mod error;
pub mod gap;
pub mod question;
pub mod scoring;
pub mod session;
pub mod stage;
pub mod store;

pub use aggregate::{DepartmentRollup, DepartmentSummary, aggregate};
pub use answers::AnswerRecord;
pub use config::SessionConfig;
pub use error::{
    DefinitionError, DistributionError, QuestionBankError, ScoringError, SessionError,
    StoreError, WeightTableError,
};
pub use gap::{
    Direction, GapReport, Recommendation, Severity, StageDelta, classify_severity, gap, recommend,
    total_gap_magnitude,
};
pub use question::{AssessmentDefinition, OptionWeight, Question, QuestionBank, WeightTable};
pub use scoring::{AssessmentResult, ScoringModel};
pub use session::{AssessmentSession, Progress, SessionState};
pub use stage::{Stage, StageDistribution};
pub use store::{ANONYMOUS_IDENTITY, MemoryStore, PositionStore, RedbStore, position_key};
