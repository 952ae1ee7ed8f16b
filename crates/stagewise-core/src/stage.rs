//! # Stages
//!
//! The closed set of organizational stages and the percentage profile
//! over them.
//!
//! Stage declaration order doubles as tie-break priority everywhere a
//! single stage has to be picked out of equals.

use crate::error::DistributionError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Index;
use std::str::FromStr;

// =============================================================================
// STAGE
// =============================================================================

/// One of the four organizational stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    Honeymoon,
    SelfReflection,
    SoulSearching,
    SteadyState,
}

impl Stage {
    /// All stages in priority order.
    pub const ALL: [Stage; 4] = [
        Stage::Honeymoon,
        Stage::SelfReflection,
        Stage::SoulSearching,
        Stage::SteadyState,
    ];

    /// Position of this stage in [`Stage::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Stage::Honeymoon => 0,
            Stage::SelfReflection => 1,
            Stage::SoulSearching => 2,
            Stage::SteadyState => 3,
        }
    }

    /// The stage's wire label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Stage::Honeymoon => "honeymoon",
            Stage::SelfReflection => "self-reflection",
            Stage::SoulSearching => "soul-searching",
            Stage::SteadyState => "steady-state",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error for an unrecognized stage label.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown stage '{0}'")]
pub struct ParseStageError(pub String);

impl FromStr for Stage {
    type Err = ParseStageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Stage::ALL
            .into_iter()
            .find(|stage| stage.label() == s.trim())
            .ok_or_else(|| ParseStageError(s.to_string()))
    }
}

// =============================================================================
// STAGE DISTRIBUTION
// =============================================================================

/// Whole-number percentage per stage. The four values always sum to 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawDistribution", into = "RawDistribution")]
pub struct StageDistribution {
    percents: [u8; 4],
}

impl StageDistribution {
    /// Build a distribution from percentages in [`Stage::ALL`] order.
    pub fn new(percents: [u8; 4]) -> Result<Self, DistributionError> {
        let sum: u16 = percents.iter().map(|p| u16::from(*p)).sum();
        if sum != 100 {
            return Err(DistributionError::BadSum { sum });
        }
        Ok(Self { percents })
    }

    /// Normalize raw per-stage totals to percentages with largest-remainder
    /// rounding.
    ///
    /// Each stage first receives `floor(total * 100 / sum)`. The points lost
    /// to flooring (at most three) go one each to the stages with the
    /// largest remainders; equal remainders are resolved in stage priority
    /// order. Returns `None` when every total is zero.
    #[must_use]
    pub fn from_totals(totals: [u64; 4]) -> Option<Self> {
        let sum: u128 = totals.iter().map(|t| u128::from(*t)).sum();
        if sum == 0 {
            return None;
        }

        let mut percents = [0u8; 4];
        let mut remainders = [0u128; 4];
        let mut assigned: u32 = 0;

        for (slot, total) in totals.iter().enumerate() {
            let scaled = u128::from(*total) * 100;
            // floor is at most 100
            let floor = (scaled / sum) as u8;
            percents[slot] = floor;
            remainders[slot] = scaled % sum;
            assigned += u32::from(floor);
        }

        let leftover = 100u32.saturating_sub(assigned) as usize;
        let mut order = [0usize, 1, 2, 3];
        order.sort_by(|a, b| remainders[*b].cmp(&remainders[*a]).then(a.cmp(b)));
        for slot in order.into_iter().take(leftover) {
            percents[slot] = percents[slot].saturating_add(1);
        }

        Some(Self { percents })
    }

    /// Percentage for one stage.
    #[must_use]
    pub fn get(&self, stage: Stage) -> u8 {
        self.percents[stage.index()]
    }

    /// Percentages in [`Stage::ALL`] order.
    #[must_use]
    pub fn as_array(&self) -> [u8; 4] {
        self.percents
    }

    /// `(stage, percent)` pairs in priority order.
    pub fn iter(&self) -> impl Iterator<Item = (Stage, u8)> + '_ {
        Stage::ALL.into_iter().map(|stage| (stage, self.get(stage)))
    }

    /// The stage with the highest percentage; ties go to the stage that
    /// comes first in priority order.
    #[must_use]
    pub fn dominant(&self) -> Stage {
        let mut best = Stage::Honeymoon;
        for stage in Stage::ALL {
            if self.get(stage) > self.get(best) {
                best = stage;
            }
        }
        best
    }
}

impl Index<Stage> for StageDistribution {
    type Output = u8;

    fn index(&self, stage: Stage) -> &u8 {
        &self.percents[stage.index()]
    }
}

impl fmt::Display for StageDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .iter()
            .map(|(stage, percent)| format!("{stage}: {percent}%"))
            .collect();
        f.write_str(&parts.join(", "))
    }
}

/// Wire form: an object keyed by stage label.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct RawDistribution {
    honeymoon: u8,
    self_reflection: u8,
    soul_searching: u8,
    steady_state: u8,
}

impl TryFrom<RawDistribution> for StageDistribution {
    type Error = DistributionError;

    fn try_from(raw: RawDistribution) -> Result<Self, Self::Error> {
        Self::new([
            raw.honeymoon,
            raw.self_reflection,
            raw.soul_searching,
            raw.steady_state,
        ])
    }
}

impl From<StageDistribution> for RawDistribution {
    fn from(dist: StageDistribution) -> Self {
        let [honeymoon, self_reflection, soul_searching, steady_state] = dist.percents;
        Self {
            honeymoon,
            self_reflection,
            soul_searching,
            steady_state,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
