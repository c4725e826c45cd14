//! Cross-run trend and regression analysis
//!
//! Given the same suite parsed from several logs in chronological order,
//! computes per-test trajectories (baseline vs current, variance-based
//! volatility), detects regressions and improvements against configurable
//! thresholds, and reports tests added or removed between the endpoints.

use crate::parser::DurationRecord;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use trueno::Vector;

/// Classification of one test's trajectory across runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendClass {
    Stable,
    Improving,
    Degrading,
    Volatile,
}

impl std::fmt::Display for TrendClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            TrendClass::Stable => "stable",
            TrendClass::Improving => "improving",
            TrendClass::Degrading => "degrading",
            TrendClass::Volatile => "volatile",
        };
        f.write_str(label)
    }
}

/// Thresholds for trend classification and regression detection.
///
/// # Example
/// ```
/// use reparto::trends::TrendConfig;
///
/// let config = TrendConfig::default();
/// assert_eq!(config.threshold_pct, 20.0);
/// assert_eq!(config.threshold_abs, 5.0);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendConfig {
    /// Relative change (percent) beyond which a test counts as a
    /// regression/improvement. Default: 20%.
    pub threshold_pct: f64,

    /// Absolute change (seconds) beyond which a test counts as a
    /// regression/improvement regardless of percentage. Default: 5s.
    ///
    /// The OR of the two thresholds catches both a 30s test growing 25%
    /// and a 2s test growing 6s (300%).
    pub threshold_abs: f64,

    /// Coefficient of variation (percent) above which a test with 3+
    /// observations is classified volatile, overriding the endpoint-based
    /// classes. Default: 30%.
    pub volatile_cv: f64,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            threshold_pct: 20.0,
            threshold_abs: 5.0,
            volatile_cv: 30.0,
        }
    }
}

impl TrendConfig {
    /// Stricter thresholds: flag smaller shifts, tolerate less variance.
    pub fn strict() -> Self {
        Self {
            threshold_pct: 10.0,
            threshold_abs: 2.0,
            volatile_cv: 20.0,
        }
    }

    /// Looser thresholds for noisy suites.
    pub fn permissive() -> Self {
        Self {
            threshold_pct: 50.0,
            threshold_abs: 15.0,
            volatile_cv: 50.0,
        }
    }

    /// Validate threshold ranges.
    pub fn validate(&self) -> Result<(), String> {
        if self.threshold_pct < 0.0 {
            return Err(format!(
                "threshold_pct must be non-negative, got {}",
                self.threshold_pct
            ));
        }
        if self.threshold_abs < 0.0 {
            return Err(format!(
                "threshold_abs must be non-negative, got {}",
                self.threshold_abs
            ));
        }
        if self.volatile_cv <= 0.0 {
            return Err(format!(
                "volatile_cv must be positive, got {}",
                self.volatile_cv
            ));
        }
        Ok(())
    }
}

/// Trajectory of one test across the analyzed runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestTrend {
    /// Durations in chronological run order.
    pub history: Vec<f64>,
    /// Duration in the first run.
    pub baseline: f64,
    /// Duration in the last run.
    pub current: f64,
    /// `current - baseline` in seconds.
    pub absolute_change: f64,
    /// Change as a percentage of baseline; 0 when the baseline is 0.
    pub relative_change: f64,
    /// Sample variance; only defined with 3+ observations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variance: Option<f64>,
    /// Sample standard deviation; only defined with 3+ observations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stdev: Option<f64>,
    /// Mean duration; only defined with 3+ observations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean: Option<f64>,
    /// Coefficient of variation (stdev/mean, percent); only defined with
    /// 3+ observations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cv: Option<f64>,
    pub trend: TrendClass,
    /// Number of runs this test appeared in.
    pub occurrences: usize,
}

/// A test present in only one endpoint run, with its single known duration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedDuration {
    pub name: String,
    pub duration: f64,
}

/// Per-run metadata carried into the trend report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunMetadata {
    /// Caller-supplied label, usually the log file path.
    pub label: String,
    pub test_count: usize,
    pub total_duration: f64,
}

/// One parsed log with its label, in chronological (caller-supplied) order.
#[derive(Debug, Clone)]
pub struct ParsedRun {
    pub label: String,
    pub records: Vec<DurationRecord>,
}

/// Complete result of a multi-run trend analysis.
#[derive(Debug, Clone, Serialize)]
pub struct TrendAnalysis {
    pub runs: Vec<RunMetadata>,
    /// Trends for tests present in both the first and last run.
    pub trends: HashMap<String, TestTrend>,
    /// Regressed tests, worst absolute change first.
    pub regressions: Vec<(String, TestTrend)>,
    /// Improved tests, best (most negative) absolute change first.
    pub improvements: Vec<(String, TestTrend)>,
    /// Tests in the last run only, slowest first.
    pub new_tests: Vec<NamedDuration>,
    /// Tests in the first run only, slowest (at baseline) first.
    pub removed_tests: Vec<NamedDuration>,
    /// Tests whose CV exceeds the volatility threshold, highest CV first.
    pub volatile_tests: Vec<(String, TestTrend)>,
}

/// Compute per-test trends for tests present in both endpoint runs.
///
/// `history` maps test name to `(run_index, duration)` observations; indices
/// are the chronological run positions. Observations are sorted by run index
/// here, so callers may accumulate them in any order. Variance, stdev, mean
/// and CV require 3+ observations and are `None` below that, not zero.
pub fn calculate_test_trends(
    history: &HashMap<String, Vec<(usize, f64)>>,
    baseline_tests: &HashSet<String>,
    current_tests: &HashSet<String>,
    config: &TrendConfig,
) -> HashMap<String, TestTrend> {
    let mut trends = HashMap::new();

    for (name, observations) in history {
        if !baseline_tests.contains(name) || !current_tests.contains(name) {
            continue;
        }

        let mut sorted = observations.clone();
        sorted.sort_by_key(|&(run_idx, _)| run_idx);
        let durations: Vec<f64> = sorted.iter().map(|&(_, d)| d).collect();

        let baseline = durations[0];
        let current = durations[durations.len() - 1];
        let absolute_change = current - baseline;
        let relative_change = if baseline > 0.0 {
            absolute_change / baseline * 100.0
        } else {
            0.0
        };

        let (variance, stdev, mean, cv) = if durations.len() >= 3 {
            let (variance, stdev, mean) = sample_statistics(&durations);
            let cv = if mean > 0.0 { stdev / mean * 100.0 } else { 0.0 };
            (Some(variance), Some(stdev), Some(mean), Some(cv))
        } else {
            (None, None, None, None)
        };

        // Volatility wins over the endpoint classes: a test that swings
        // wildly between runs is untrustworthy even when first and last
        // happen to agree.
        let trend = if cv.is_some_and(|cv| cv > config.volatile_cv) {
            TrendClass::Volatile
        } else if relative_change.abs() < 10.0 && absolute_change.abs() < 2.0 {
            TrendClass::Stable
        } else if relative_change < 0.0 {
            TrendClass::Improving
        } else {
            TrendClass::Degrading
        };

        trends.insert(
            name.clone(),
            TestTrend {
                occurrences: durations.len(),
                history: durations,
                baseline,
                current,
                absolute_change,
                relative_change,
                variance,
                stdev,
                mean,
                cv,
                trend,
            },
        );
    }

    trends
}

// Sample (Bessel-corrected) variance, stdev and mean. Uses trueno's SIMD
// vector ops; trueno reports population variance, corrected here by
// n/(n-1). Caller guarantees n >= 3. Durations narrow to f32 for the
// vector path; millisecond-resolution inputs keep ~7 significant digits,
// which holds through any realistic history length.
fn sample_statistics(durations: &[f64]) -> (f64, f64, f64) {
    let samples: Vec<f32> = durations.iter().map(|&d| d as f32).collect();
    let v = Vector::from_slice(&samples);

    let mean = v.mean().unwrap_or(0.0) as f64;
    let population_variance = v.variance().unwrap_or(0.0) as f64;

    let n = durations.len() as f64;
    let variance = population_variance * n / (n - 1.0);
    (variance, variance.sqrt(), mean)
}

/// Tests whose change exceeds either threshold upward, worst first.
pub fn detect_regressions(
    trends: &HashMap<String, TestTrend>,
    config: &TrendConfig,
) -> Vec<(String, TestTrend)> {
    let mut regressions: Vec<(String, TestTrend)> = trends
        .iter()
        .filter(|(_, t)| {
            t.relative_change > config.threshold_pct || t.absolute_change > config.threshold_abs
        })
        .map(|(name, t)| (name.clone(), t.clone()))
        .collect();

    regressions.sort_by(|a, b| {
        b.1.absolute_change
            .partial_cmp(&a.1.absolute_change)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    regressions
}

/// Tests whose change exceeds either threshold downward, best first.
pub fn detect_improvements(
    trends: &HashMap<String, TestTrend>,
    config: &TrendConfig,
) -> Vec<(String, TestTrend)> {
    let mut improvements: Vec<(String, TestTrend)> = trends
        .iter()
        .filter(|(_, t)| {
            t.relative_change < -config.threshold_pct || t.absolute_change < -config.threshold_abs
        })
        .map(|(name, t)| (name.clone(), t.clone()))
        .collect();

    improvements.sort_by(|a, b| {
        a.1.absolute_change
            .partial_cmp(&b.1.absolute_change)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    improvements
}

/// Analyze an ordered sequence of parsed runs end to end.
///
/// Runs must be supplied oldest first; run order is the chronological order
/// every baseline/current comparison relies on. Trend computation is
/// restricted to tests present in both endpoint runs; tests present in only
/// one endpoint surface as new or removed instead.
pub fn analyze_runs(runs: &[ParsedRun], config: &TrendConfig) -> TrendAnalysis {
    let mut history: HashMap<String, Vec<(usize, f64)>> = HashMap::new();
    let mut metadata = Vec::with_capacity(runs.len());

    for (run_idx, run) in runs.iter().enumerate() {
        let total_duration: f64 = run.records.iter().map(|r| r.duration).sum();
        metadata.push(RunMetadata {
            label: run.label.clone(),
            test_count: run.records.len(),
            total_duration,
        });

        for record in &run.records {
            history
                .entry(record.name.clone())
                .or_default()
                .push((run_idx, record.duration));
        }
    }

    let baseline_tests: HashSet<String> = runs
        .first()
        .map(|r| r.records.iter().map(|rec| rec.name.clone()).collect())
        .unwrap_or_default();
    let current_tests: HashSet<String> = runs
        .last()
        .map(|r| r.records.iter().map(|rec| rec.name.clone()).collect())
        .unwrap_or_default();

    let trends = calculate_test_trends(&history, &baseline_tests, &current_tests, config);
    let regressions = detect_regressions(&trends, config);
    let improvements = detect_improvements(&trends, config);

    // New tests report their current duration, removed tests their baseline
    // one; each has exactly one endpoint observation to draw from.
    let mut new_tests: Vec<NamedDuration> = current_tests
        .difference(&baseline_tests)
        .map(|name| NamedDuration {
            name: name.clone(),
            duration: last_observation(&history, name),
        })
        .collect();
    new_tests.sort_by(|a, b| {
        b.duration
            .partial_cmp(&a.duration)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut removed_tests: Vec<NamedDuration> = baseline_tests
        .difference(&current_tests)
        .map(|name| NamedDuration {
            name: name.clone(),
            duration: first_observation(&history, name),
        })
        .collect();
    removed_tests.sort_by(|a, b| {
        b.duration
            .partial_cmp(&a.duration)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut volatile_tests: Vec<(String, TestTrend)> = trends
        .iter()
        .filter(|(_, t)| t.cv.is_some_and(|cv| cv > config.volatile_cv))
        .map(|(name, t)| (name.clone(), t.clone()))
        .collect();
    volatile_tests.sort_by(|a, b| {
        b.1.cv
            .partial_cmp(&a.1.cv)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    TrendAnalysis {
        runs: metadata,
        trends,
        regressions,
        improvements,
        new_tests,
        removed_tests,
        volatile_tests,
    }
}

fn first_observation(history: &HashMap<String, Vec<(usize, f64)>>, name: &str) -> f64 {
    history
        .get(name)
        .and_then(|obs| obs.iter().min_by_key(|&&(idx, _)| idx))
        .map(|&(_, d)| d)
        .unwrap_or(0.0)
}

fn last_observation(history: &HashMap<String, Vec<(usize, f64)>>, name: &str) -> f64 {
    history
        .get(name)
        .and_then(|obs| obs.iter().max_by_key(|&&(idx, _)| idx))
        .map(|&(_, d)| d)
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(label: &str, tests: &[(&str, f64)]) -> ParsedRun {
        ParsedRun {
            label: label.to_string(),
            records: tests
                .iter()
                .map(|&(name, duration)| DurationRecord {
                    name: name.to_string(),
                    duration,
                })
                .collect(),
        }
    }

    #[test]
    fn test_default_config() {
        let config = TrendConfig::default();
        assert_eq!(config.threshold_pct, 20.0);
        assert_eq!(config.threshold_abs, 5.0);
        assert_eq!(config.volatile_cv, 30.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = TrendConfig {
            threshold_pct: -1.0,
            ..TrendConfig::default()
        };
        assert!(config.validate().is_err());

        let config = TrendConfig {
            volatile_cv: 0.0,
            ..TrendConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_constant_history_is_stable_with_zero_cv() {
        let runs = [
            run("r1", &[("a.B.t", 10.0)]),
            run("r2", &[("a.B.t", 10.0)]),
            run("r3", &[("a.B.t", 10.0)]),
        ];
        let analysis = analyze_runs(&runs, &TrendConfig::default());
        let trend = &analysis.trends["a.B.t"];

        assert_eq!(trend.trend, TrendClass::Stable);
        assert_eq!(trend.cv, Some(0.0));
        assert_eq!(trend.variance, Some(0.0));
        assert_eq!(trend.occurrences, 3);
    }

    #[test]
    fn test_large_growth_is_degrading() {
        let runs = [run("r1", &[("a.B.t", 10.0)]), run("r2", &[("a.B.t", 25.0)])];
        let analysis = analyze_runs(&runs, &TrendConfig::default());
        let trend = &analysis.trends["a.B.t"];

        assert_eq!(trend.relative_change, 150.0);
        assert_eq!(trend.absolute_change, 15.0);
        assert_eq!(trend.trend, TrendClass::Degrading);
        assert_eq!(analysis.regressions[0].0, "a.B.t");
    }

    #[test]
    fn test_shrink_is_improving() {
        let runs = [run("r1", &[("a.B.t", 20.0)]), run("r2", &[("a.B.t", 10.0)])];
        let analysis = analyze_runs(&runs, &TrendConfig::default());
        assert_eq!(analysis.trends["a.B.t"].trend, TrendClass::Improving);
        assert_eq!(analysis.improvements.len(), 1);
    }

    #[test]
    fn test_small_change_is_stable() {
        // +5% and +0.5s: under both stability bounds.
        let runs = [run("r1", &[("a.B.t", 10.0)]), run("r2", &[("a.B.t", 10.5)])];
        let analysis = analyze_runs(&runs, &TrendConfig::default());
        assert_eq!(analysis.trends["a.B.t"].trend, TrendClass::Stable);
        assert!(analysis.regressions.is_empty());
    }

    #[test]
    fn test_volatility_overrides_stable_endpoints() {
        // First and last agree, but the middle swings: CV far above 30%.
        let runs = [
            run("r1", &[("a.B.t", 10.0)]),
            run("r2", &[("a.B.t", 60.0)]),
            run("r3", &[("a.B.t", 10.0)]),
        ];
        let analysis = analyze_runs(&runs, &TrendConfig::default());
        let trend = &analysis.trends["a.B.t"];

        assert_eq!(trend.trend, TrendClass::Volatile);
        assert_eq!(analysis.volatile_tests.len(), 1);
    }

    #[test]
    fn test_variance_statistics_accuracy() {
        // Sample variance of [10, 12, 14] is 4 exactly; the f32 vector path
        // must stay within rounding noise of it.
        let runs = [
            run("r1", &[("a.B.t", 10.0)]),
            run("r2", &[("a.B.t", 12.0)]),
            run("r3", &[("a.B.t", 14.0)]),
        ];
        let analysis = analyze_runs(&runs, &TrendConfig::default());
        let trend = &analysis.trends["a.B.t"];

        assert!((trend.variance.unwrap() - 4.0).abs() < 1e-3);
        assert!((trend.stdev.unwrap() - 2.0).abs() < 1e-3);
        assert!((trend.mean.unwrap() - 12.0).abs() < 1e-3);
        assert!((trend.cv.unwrap() - 100.0 / 6.0).abs() < 1e-3);
    }

    #[test]
    fn test_two_observations_have_no_variance_stats() {
        let runs = [run("r1", &[("a.B.t", 10.0)]), run("r2", &[("a.B.t", 12.0)])];
        let analysis = analyze_runs(&runs, &TrendConfig::default());
        let trend = &analysis.trends["a.B.t"];

        assert!(trend.variance.is_none());
        assert!(trend.stdev.is_none());
        assert!(trend.mean.is_none());
        assert!(trend.cv.is_none());
    }

    #[test]
    fn test_zero_baseline_reports_zero_relative_change() {
        let runs = [run("r1", &[("a.B.t", 0.0)]), run("r2", &[("a.B.t", 1.0)])];
        let analysis = analyze_runs(&runs, &TrendConfig::default());
        assert_eq!(analysis.trends["a.B.t"].relative_change, 0.0);
    }

    #[test]
    fn test_new_and_removed_tests() {
        let runs = [
            run("r1", &[("a.B.old", 3.0), ("a.B.kept", 1.0)]),
            run("r2", &[("a.B.kept", 1.0), ("a.B.new", 7.0)]),
        ];
        let analysis = analyze_runs(&runs, &TrendConfig::default());

        assert_eq!(analysis.new_tests.len(), 1);
        assert_eq!(analysis.new_tests[0].name, "a.B.new");
        assert_eq!(analysis.new_tests[0].duration, 7.0);

        assert_eq!(analysis.removed_tests.len(), 1);
        assert_eq!(analysis.removed_tests[0].name, "a.B.old");
        assert_eq!(analysis.removed_tests[0].duration, 3.0);

        // Endpoint-only tests never get a trend.
        assert_eq!(analysis.trends.len(), 1);
        assert!(analysis.trends.contains_key("a.B.kept"));
    }

    #[test]
    fn test_test_missing_from_middle_run_still_trended() {
        let runs = [
            run("r1", &[("a.B.t", 10.0)]),
            run("r2", &[]),
            run("r3", &[("a.B.t", 12.0)]),
        ];
        let analysis = analyze_runs(&runs, &TrendConfig::default());
        let trend = &analysis.trends["a.B.t"];
        assert_eq!(trend.occurrences, 2);
        assert_eq!(trend.baseline, 10.0);
        assert_eq!(trend.current, 12.0);
    }

    #[test]
    fn test_regressions_ordered_by_absolute_impact() {
        let runs = [
            run("r1", &[("a.B.small", 1.0), ("a.B.big", 10.0)]),
            run("r2", &[("a.B.small", 7.0), ("a.B.big", 40.0)]),
        ];
        let analysis = analyze_runs(&runs, &TrendConfig::default());
        let names: Vec<_> = analysis.regressions.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["a.B.big", "a.B.small"]);
    }

    #[test]
    fn test_absolute_threshold_catches_slow_small_percentage() {
        // +6s on a 60s test is only +10% but over the 5s absolute bound.
        let runs = [run("r1", &[("a.B.t", 60.0)]), run("r2", &[("a.B.t", 66.0)])];
        let analysis = analyze_runs(&runs, &TrendConfig::default());
        assert_eq!(analysis.regressions.len(), 1);
    }

    #[test]
    fn test_run_metadata() {
        let runs = [
            run("logs/150", &[("a.B.t", 1.0), ("a.B.u", 2.0)]),
            run("logs/176", &[("a.B.t", 1.5)]),
        ];
        let analysis = analyze_runs(&runs, &TrendConfig::default());
        assert_eq!(analysis.runs.len(), 2);
        assert_eq!(analysis.runs[0].label, "logs/150");
        assert_eq!(analysis.runs[0].test_count, 2);
        assert_eq!(analysis.runs[0].total_duration, 3.0);
    }
}
