//! # Aggregation
//!
//! Department- and organization-level views over individual results.
//!
//! Every respondent counts equally: per-stage percentages are summed across
//! respondents and normalized again with the same largest-remainder rule
//! the scoring model uses, so aggregates also sum to exactly 100.

use crate::stage::StageDistribution;
use serde::Serialize;
use std::collections::BTreeMap;

/// Combine distributions with equal weight per respondent.
///
/// Returns `None` for an empty slice.
#[must_use]
pub fn aggregate(distributions: &[StageDistribution]) -> Option<StageDistribution> {
    let mut totals = [0u64; 4];
    for dist in distributions {
        for (slot, percent) in dist.as_array().into_iter().enumerate() {
            totals[slot] = totals[slot].saturating_add(u64::from(percent));
        }
    }
    StageDistribution::from_totals(totals)
}

// =============================================================================
// DEPARTMENT ROLLUP
// =============================================================================

/// Aggregate view of one department.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepartmentSummary {
    pub department: String,
    pub respondents: usize,
    pub distribution: StageDistribution,
}

/// Collects individual results per department.
///
/// Departments iterate in name order.
#[derive(Debug, Clone, Default)]
pub struct DepartmentRollup {
    departments: BTreeMap<String, Vec<StageDistribution>>,
}

impl DepartmentRollup {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one respondent's distribution.
    pub fn add(&mut self, department: impl Into<String>, distribution: StageDistribution) {
        self.departments
            .entry(department.into())
            .or_default()
            .push(distribution);
    }

    /// Number of respondents in a department.
    #[must_use]
    pub fn respondents(&self, department: &str) -> usize {
        self.departments.get(department).map_or(0, Vec::len)
    }

    /// Total respondents across the organization.
    #[must_use]
    pub fn total_respondents(&self) -> usize {
        self.departments.values().map(Vec::len).sum()
    }

    /// Aggregate for one department.
    #[must_use]
    pub fn department(&self, department: &str) -> Option<StageDistribution> {
        self.departments
            .get(department)
            .and_then(|results| aggregate(results))
    }

    /// Summaries for every department, in name order.
    #[must_use]
    pub fn summaries(&self) -> Vec<DepartmentSummary> {
        self.departments
            .iter()
            .filter_map(|(name, results)| {
                aggregate(results).map(|distribution| DepartmentSummary {
                    department: name.clone(),
                    respondents: results.len(),
                    distribution,
                })
            })
            .collect()
    }

    /// Organization-wide aggregate over every respondent.
    #[must_use]
    pub fn overall(&self) -> Option<StageDistribution> {
        let all: Vec<StageDistribution> = self.departments.values().flatten().copied().collect();
        aggregate(&all)
    }
}

impl<K: Into<String>> Extend<(K, StageDistribution)> for DepartmentRollup {
    fn extend<I: IntoIterator<Item = (K, StageDistribution)>>(&mut self, iter: I) {
        for (department, distribution) in iter {
            self.add(department, distribution);
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn dist(values: [u8; 4]) -> StageDistribution {
        StageDistribution::new(values).expect("valid distribution")
    }

    #[test]
    fn aggregate_empty_is_none() {
        assert_eq!(aggregate(&[]), None);
    }

    #[test]
    fn aggregate_averages_evenly() {
        let combined = aggregate(&[dist([100, 0, 0, 0]), dist([0, 0, 0, 100])]);
        assert_eq!(combined.map(|d| d.as_array()), Some([50, 0, 0, 50]));
    }

    #[test]
    fn aggregate_keeps_sum_at_100() {
        let combined = aggregate(&[
            dist([34, 33, 33, 0]),
            dist([0, 34, 33, 33]),
            dist([33, 0, 34, 33]),
        ]);
        let sum: u16 = combined
            .map(|d| d.as_array().iter().map(|p| u16::from(*p)).sum())
            .unwrap_or(0);
        assert_eq!(sum, 100);
    }

    #[test]
    fn rollup_by_department() {
        let mut rollup = DepartmentRollup::new();
        rollup.extend([
            ("engineering", dist([60, 20, 10, 10])),
            ("engineering", dist([40, 20, 30, 10])),
            ("sales", dist([10, 10, 10, 70])),
        ]);

        assert_eq!(rollup.respondents("engineering"), 2);
        assert_eq!(rollup.respondents("finance"), 0);
        assert_eq!(rollup.total_respondents(), 3);
        assert_eq!(
            rollup.department("engineering").map(|d| d.as_array()),
            Some([50, 20, 20, 10])
        );

        let names: Vec<_> = rollup
            .summaries()
            .into_iter()
            .map(|s| s.department)
            .collect();
        assert_eq!(names, vec!["engineering", "sales"]);

        // totals 110/50/50/90 of 300; two leftover points, equal remainders
        assert_eq!(
            rollup.overall().map(|d| d.as_array()),
            Some([37, 17, 16, 30])
        );
    }
}
