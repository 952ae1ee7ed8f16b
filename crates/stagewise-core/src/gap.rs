//! # Gap Analysis
//!
//! Compares a current stage distribution against a target one.
//!
//! All functions here are pure and total for valid distributions. Because
//! both inputs sum to 100, the total gap magnitude stays within 0..=200
//! and in practice rarely exceeds 100.

use crate::stage::{Stage, StageDistribution};
use serde::Serialize;
use std::fmt;
use std::ops::Neg;

// =============================================================================
// SEVERITY THRESHOLDS
// =============================================================================

/// Upper bound (inclusive) of [`Severity::Low`].
pub const LOW_MAX: u16 = 20;

/// Upper bound (inclusive) of [`Severity::Moderate`].
pub const MODERATE_MAX: u16 = 40;

/// Upper bound (inclusive) of [`Severity::High`].
pub const HIGH_MAX: u16 = 60;

// =============================================================================
// STAGE DELTA
// =============================================================================

/// Signed per-stage difference, `target - current`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "RawDelta")]
pub struct StageDelta {
    deltas: [i16; 4],
}

impl StageDelta {
    /// Build from deltas in [`Stage::ALL`] order.
    #[must_use]
    pub const fn from_array(deltas: [i16; 4]) -> Self {
        Self { deltas }
    }

    #[must_use]
    pub fn get(&self, stage: Stage) -> i16 {
        self.deltas[stage.index()]
    }

    #[must_use]
    pub fn as_array(&self) -> [i16; 4] {
        self.deltas
    }

    /// `(stage, delta)` pairs in priority order.
    pub fn iter(&self) -> impl Iterator<Item = (Stage, i16)> + '_ {
        Stage::ALL.into_iter().map(|stage| (stage, self.get(stage)))
    }
}

impl Neg for StageDelta {
    type Output = Self;

    fn neg(self) -> Self {
        Self {
            deltas: self.deltas.map(|d| -d),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "kebab-case")]
struct RawDelta {
    honeymoon: i16,
    self_reflection: i16,
    soul_searching: i16,
    steady_state: i16,
}

impl From<StageDelta> for RawDelta {
    fn from(delta: StageDelta) -> Self {
        let [honeymoon, self_reflection, soul_searching, steady_state] = delta.deltas;
        Self {
            honeymoon,
            self_reflection,
            soul_searching,
            steady_state,
        }
    }
}

/// Per-stage `target - current`.
#[must_use]
pub fn gap(current: &StageDistribution, target: &StageDistribution) -> StageDelta {
    let mut deltas = [0i16; 4];
    for stage in Stage::ALL {
        deltas[stage.index()] = i16::from(target.get(stage)) - i16::from(current.get(stage));
    }
    StageDelta { deltas }
}

/// Sum of absolute per-stage deltas.
#[must_use]
pub fn total_gap_magnitude(delta: &StageDelta) -> u16 {
    delta.deltas.iter().map(|d| d.unsigned_abs()).sum()
}

// =============================================================================
// SEVERITY
// =============================================================================

/// How far a current profile sits from its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Severity {
    Low,
    Moderate,
    High,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Low => "low",
            Severity::Moderate => "moderate",
            Severity::High => "high",
            Severity::Critical => "critical",
        };
        f.write_str(label)
    }
}

/// Bucket a magnitude: `<=20` Low, `<=40` Moderate, `<=60` High, else Critical.
#[must_use]
pub fn classify_severity(magnitude: u16) -> Severity {
    match magnitude {
        0..=LOW_MAX => Severity::Low,
        m if m <= MODERATE_MAX => Severity::Moderate,
        m if m <= HIGH_MAX => Severity::High,
        _ => Severity::Critical,
    }
}

// =============================================================================
// RECOMMENDATIONS
// =============================================================================

/// Which way a stage has to move to reach its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    Increase,
    Decrease,
}

/// Guidance for closing the gap on one stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    pub stage: Stage,
    pub delta: i16,
    pub direction: Direction,
    /// Severity of this stage's own gap.
    pub severity: Severity,
    pub focus: &'static str,
}

fn focus(stage: Stage, direction: Direction) -> &'static str {
    match (stage, direction) {
        (Stage::Honeymoon, Direction::Increase) => {
            "Renew shared enthusiasm by celebrating early wins and onboarding energy"
        }
        (Stage::Honeymoon, Direction::Decrease) => {
            "Temper optimism with realistic expectations and clear priorities"
        }
        (Stage::SelfReflection, Direction::Increase) => {
            "Make room for retrospectives and honest feedback loops"
        }
        (Stage::SelfReflection, Direction::Decrease) => {
            "Turn open reviews into decisions with named owners"
        }
        (Stage::SoulSearching, Direction::Increase) => {
            "Revisit mission and values with teams to deepen commitment"
        }
        (Stage::SoulSearching, Direction::Decrease) => {
            "Settle open identity questions by clarifying purpose and roles"
        }
        (Stage::SteadyState, Direction::Increase) => {
            "Stabilize routines and codify the processes that already work"
        }
        (Stage::SteadyState, Direction::Decrease) => {
            "Introduce fresh challenges before routine turns into stagnation"
        }
    }
}

/// One recommendation per stage with a non-zero delta, largest first.
/// Equal magnitudes keep stage priority order.
#[must_use]
pub fn recommend(delta: &StageDelta) -> Vec<Recommendation> {
    let mut out: Vec<Recommendation> = delta
        .iter()
        .filter(|(_, d)| *d != 0)
        .map(|(stage, d)| {
            let direction = if d > 0 {
                Direction::Increase
            } else {
                Direction::Decrease
            };
            Recommendation {
                stage,
                delta: d,
                direction,
                severity: classify_severity(d.unsigned_abs()),
                focus: focus(stage, direction),
            }
        })
        .collect();

    // stable sort keeps priority order among equals
    out.sort_by(|a, b| b.delta.unsigned_abs().cmp(&a.delta.unsigned_abs()));
    out
}

// =============================================================================
// GAP REPORT
// =============================================================================

/// Everything a gap-analysis view needs for one current/target pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GapReport {
    pub current: StageDistribution,
    pub target: StageDistribution,
    pub delta: StageDelta,
    pub magnitude: u16,
    pub severity: Severity,
    pub recommendations: Vec<Recommendation>,
}

impl GapReport {
    #[must_use]
    pub fn new(current: StageDistribution, target: StageDistribution) -> Self {
        let delta = gap(&current, &target);
        let magnitude = total_gap_magnitude(&delta);
        Self {
            current,
            target,
            delta,
            magnitude,
            severity: classify_severity(magnitude),
            recommendations: recommend(&delta),
        }
    }

    /// Whether current already matches target exactly.
    #[must_use]
    pub fn is_on_target(&self) -> bool {
        self.magnitude == 0
    }
}

// =============================================================================
// TESTS
// =============================================================================
