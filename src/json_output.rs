//! JSON output format for analysis results
//!
//! `--format json` implementation: serde views over the analysis structures,
//! shaped for machine consumption rather than the text report layout.

use crate::distribution::CumulativePoint;
use crate::grouping::Group;
use crate::schedule::RunnerAssignment;
use crate::stats::RunSummary;
use serde::{Deserialize, Serialize};

/// One test in a JSON report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonTest {
    pub name: String,
    pub duration: f64,
}

/// One group (class or package) in a JSON report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonGroup {
    pub name: String,
    pub total_duration: f64,
    pub test_count: usize,
    /// Share of the run's total duration, in percent.
    pub percentage: f64,
    /// Member tests, present only when the caller asked for them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tests: Option<Vec<JsonTest>>,
}

/// One cumulative-distribution milestone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonCumulativePoint {
    pub item_count: usize,
    pub cumulative_pct: f64,
    pub cumulative_duration: f64,
}

/// A suggested split for one runner count.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSplitPlan {
    pub runner_count: usize,
    pub runners: Vec<RunnerAssignment>,
}

/// Complete grouped-analysis report (`by-class` / `by-package`).
#[derive(Debug, Clone, Serialize)]
pub struct JsonGroupReport {
    /// Grouping level: "class" or "package".
    pub grouping: String,
    pub summary: RunSummary,
    pub group_count: usize,
    pub groups: Vec<JsonGroup>,
    pub cumulative: Vec<JsonCumulativePoint>,
    pub splits: Vec<JsonSplitPlan>,
}

/// Single-run report (`tests` subcommand).
#[derive(Debug, Clone, Serialize)]
pub struct JsonRunReport {
    pub summary: RunSummary,
    pub slow_tests: Vec<crate::stats::ThresholdCount>,
    /// Slowest tests, descending, truncated to the requested top-N.
    pub top_tests: Vec<JsonTest>,
}

impl JsonGroup {
    /// Build a group view; `include_tests` controls member serialization.
    pub fn from_group(name: &str, group: &Group, total_duration: f64, include_tests: bool) -> Self {
        Self {
            name: name.to_string(),
            total_duration: group.total_duration,
            test_count: group.test_count,
            percentage: if total_duration > 0.0 {
                group.total_duration / total_duration * 100.0
            } else {
                0.0
            },
            tests: include_tests.then(|| {
                group
                    .tests
                    .iter()
                    .map(|t| JsonTest {
                        name: t.name.clone(),
                        duration: t.duration,
                    })
                    .collect()
            }),
        }
    }
}

impl From<&CumulativePoint> for JsonCumulativePoint {
    fn from(point: &CumulativePoint) -> Self {
        Self {
            item_count: point.item_count,
            cumulative_pct: point.cumulative_pct,
            cumulative_duration: point.cumulative_duration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::DurationRecord;

    #[test]
    fn test_group_view_includes_percentage() {
        let group = Group {
            total_duration: 25.0,
            test_count: 2,
            tests: vec![DurationRecord {
                name: "a.B.m".to_string(),
                duration: 25.0,
            }],
        };
        let view = JsonGroup::from_group("a.B", &group, 100.0, false);
        assert_eq!(view.percentage, 25.0);
        assert!(view.tests.is_none());
    }

    #[test]
    fn test_tests_omitted_from_json_unless_requested() {
        let group = Group {
            total_duration: 1.0,
            test_count: 1,
            tests: vec![DurationRecord {
                name: "a.B.m".to_string(),
                duration: 1.0,
            }],
        };
        let view = JsonGroup::from_group("a.B", &group, 1.0, false);
        let json = serde_json::to_string(&view).unwrap();
        assert!(!json.contains("\"tests\""));

        let view = JsonGroup::from_group("a.B", &group, 1.0, true);
        let json = serde_json::to_string(&view).unwrap();
        assert!(json.contains("\"tests\""));
    }
}
