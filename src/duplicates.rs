//! Overlap detection across parallel runner logs
//!
//! When a suite is split across runners, every test should execute exactly
//! once. Given one log per runner this module finds tests (and their
//! classes/packages) that ran in more than one log, and accounts for the
//! time wasted on the extra executions.

use crate::keys::{class_key, package_key};
use crate::trends::ParsedRun;
use serde::Serialize;
use std::collections::HashMap;

/// A name appearing in more than one log, with the log labels it hit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overlap {
    pub name: String,
    pub logs: Vec<String>,
}

/// Per-log counts for the duplicate report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogCoverage {
    pub label: String,
    pub test_count: usize,
    pub class_count: usize,
    pub package_count: usize,
    pub total_duration: f64,
    /// Share of the combined duration across all logs, in percent.
    pub percentage: f64,
}

/// How evenly the total duration spreads across the runner logs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalanceMetrics {
    pub max_duration: f64,
    pub min_duration: f64,
    pub avg_duration: f64,
    /// `min/max` of the per-log totals; 1.0 is a perfect balance.
    pub ratio: f64,
}

/// Result of a cross-log duplicate analysis.
#[derive(Debug, Clone, Serialize)]
pub struct DuplicateAnalysis {
    pub logs: Vec<LogCoverage>,
    pub unique_tests: usize,
    pub unique_classes: usize,
    pub unique_packages: usize,
    /// Tests executed by more than one runner, most-duplicated first.
    pub duplicate_tests: Vec<Overlap>,
    /// Classes split across runners (may be intentional if splits are at
    /// test rather than class granularity).
    pub duplicate_classes: Vec<Overlap>,
    /// Packages split across runners.
    pub duplicate_packages: Vec<Overlap>,
    /// Seconds spent re-running duplicated tests (first-seen duration times
    /// the number of extra executions).
    pub wasted_duration: f64,
    /// Mean number of logs each duplicated test appears in; absent without
    /// duplicates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_duplications: Option<f64>,
    /// Absent when the logs carry no duration at all.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance: Option<BalanceMetrics>,
}

/// Analyze runner logs for overlapping coverage.
///
/// Unlike trend analysis, log order carries no meaning here; each log is one
/// runner's slice of the same suite execution.
pub fn analyze_duplicates(runs: &[ParsedRun]) -> DuplicateAnalysis {
    // name -> labels of the logs it appeared in, insertion-ordered per name
    let mut test_logs: HashMap<String, Vec<String>> = HashMap::new();
    let mut class_logs: HashMap<String, Vec<String>> = HashMap::new();
    let mut package_logs: HashMap<String, Vec<String>> = HashMap::new();
    let mut first_duration: HashMap<String, f64> = HashMap::new();
    let mut logs = Vec::with_capacity(runs.len());

    for run in runs {
        let mut classes: Vec<String> = run.records.iter().map(|r| class_key(&r.name)).collect();
        classes.sort();
        classes.dedup();
        let mut packages: Vec<String> = run.records.iter().map(|r| package_key(&r.name)).collect();
        packages.sort();
        packages.dedup();

        logs.push(LogCoverage {
            label: run.label.clone(),
            test_count: run.records.len(),
            class_count: classes.len(),
            package_count: packages.len(),
            total_duration: run.records.iter().map(|r| r.duration).sum(),
            percentage: 0.0,
        });

        for record in &run.records {
            test_logs
                .entry(record.name.clone())
                .or_default()
                .push(run.label.clone());
            first_duration.entry(record.name.clone()).or_insert(record.duration);
        }
        for class in classes {
            class_logs.entry(class).or_default().push(run.label.clone());
        }
        for package in packages {
            package_logs.entry(package).or_default().push(run.label.clone());
        }
    }

    let total_duration_all: f64 = logs.iter().map(|l| l.total_duration).sum();
    for log in &mut logs {
        log.percentage = if total_duration_all > 0.0 {
            log.total_duration / total_duration_all * 100.0
        } else {
            0.0
        };
    }
    let balance = (total_duration_all > 0.0).then(|| {
        let max = logs.iter().map(|l| l.total_duration).fold(f64::NEG_INFINITY, f64::max);
        let min = logs.iter().map(|l| l.total_duration).fold(f64::INFINITY, f64::min);
        BalanceMetrics {
            max_duration: max,
            min_duration: min,
            avg_duration: total_duration_all / logs.len() as f64,
            ratio: if max > 0.0 { min / max } else { 0.0 },
        }
    });

    let wasted_duration = test_logs
        .iter()
        .filter(|(_, files)| files.len() > 1)
        .map(|(name, files)| first_duration.get(name).copied().unwrap_or(0.0) * (files.len() - 1) as f64)
        .sum();

    let duplicated = test_logs.values().filter(|files| files.len() > 1).count();
    let duplicate_hits: usize = test_logs
        .values()
        .filter(|files| files.len() > 1)
        .map(Vec::len)
        .sum();
    let avg_duplications = (duplicated > 0).then(|| duplicate_hits as f64 / duplicated as f64);

    DuplicateAnalysis {
        unique_tests: test_logs.len(),
        unique_classes: class_logs.len(),
        unique_packages: package_logs.len(),
        duplicate_tests: collect_overlaps(test_logs),
        duplicate_classes: collect_overlaps(class_logs),
        duplicate_packages: collect_overlaps(package_logs),
        wasted_duration,
        avg_duplications,
        balance,
        logs,
    }
}

fn collect_overlaps(occurrences: HashMap<String, Vec<String>>) -> Vec<Overlap> {
    let mut overlaps: Vec<Overlap> = occurrences
        .into_iter()
        .filter(|(_, logs)| logs.len() > 1)
        .map(|(name, logs)| Overlap { name, logs })
        .collect();
    overlaps.sort_by(|a, b| b.logs.len().cmp(&a.logs.len()).then_with(|| a.name.cmp(&b.name)));
    overlaps
}
