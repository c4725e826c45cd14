//! Summary statistics for a single parsed run

use crate::parser::DurationRecord;
use serde::Serialize;
use trueno::Vector;

/// Aggregate statistics over one run's duration records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub test_count: usize,
    pub total_duration: f64,
    pub avg_duration: f64,
    pub min_duration: f64,
    pub max_duration: f64,
}

/// How many tests exceed a duration threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThresholdCount {
    /// Threshold in seconds.
    pub threshold: f64,
    pub label: &'static str,
    pub count: usize,
    /// Share of all tests, in percent.
    pub percentage: f64,
}

// Breakdown thresholds for the single-run report.
const SLOW_THRESHOLDS: [(f64, &str); 4] = [
    (60.0, "Tests over 1 minute"),
    (120.0, "Tests over 2 minutes"),
    (300.0, "Tests over 5 minutes"),
    (600.0, "Tests over 10 minutes"),
];

/// Summarize one run using trueno's SIMD vector ops.
///
/// Returns `None` for an empty run; every statistic is undefined without
/// records. Min and max come from the f32 vector path; only the total is
/// accumulation-sensitive and is summed in f64.
pub fn summarize(records: &[DurationRecord]) -> Option<RunSummary> {
    if records.is_empty() {
        return None;
    }

    let durations: Vec<f32> = records.iter().map(|r| r.duration as f32).collect();
    let v = Vector::from_slice(&durations);

    // Sum in f64: a long suite accumulates thousands of sub-second values.
    let total_duration: f64 = records.iter().map(|r| r.duration).sum();
    let min_duration = v.min().unwrap_or(0.0) as f64;
    let max_duration = v.max().unwrap_or(0.0) as f64;

    Some(RunSummary {
        test_count: records.len(),
        total_duration,
        avg_duration: total_duration / records.len() as f64,
        min_duration,
        max_duration,
    })
}

/// Count tests exceeding each slow-test threshold; thresholds with no tests
/// over them are omitted.
pub fn slow_test_breakdown(records: &[DurationRecord]) -> Vec<ThresholdCount> {
    let total = records.len();
    SLOW_THRESHOLDS
        .iter()
        .filter_map(|&(threshold, label)| {
            let count = records.iter().filter(|r| r.duration > threshold).count();
            (count > 0).then(|| ThresholdCount {
                threshold,
                label,
                count,
                percentage: count as f64 / total as f64 * 100.0,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, duration: f64) -> DurationRecord {
        DurationRecord {
            name: name.to_string(),
            duration,
        }
    }

    #[test]
    fn test_summarize_basic() {
        let records = vec![record("a.B.m1", 1.0), record("a.B.m2", 3.0)];
        let summary = summarize(&records).unwrap();

        assert_eq!(summary.test_count, 2);
        assert_eq!(summary.total_duration, 4.0);
        assert_eq!(summary.avg_duration, 2.0);
        assert_eq!(summary.min_duration, 1.0);
        assert_eq!(summary.max_duration, 3.0);
    }

    #[test]
    fn test_summarize_empty() {
        assert!(summarize(&[]).is_none());
    }

    #[test]
    fn test_slow_test_breakdown() {
        let records = vec![
            record("a.B.fast", 5.0),
            record("a.B.slow", 90.0),
            record("a.B.slower", 400.0),
        ];
        let breakdown = slow_test_breakdown(&records);

        // 2 over 1m, 1 over 2m, 1 over 5m, none over 10m.
        assert_eq!(breakdown.len(), 3);
        assert_eq!(breakdown[0].count, 2);
        assert_eq!(breakdown[1].count, 1);
        assert_eq!(breakdown[2].count, 1);
        assert!((breakdown[0].percentage - 66.666).abs() < 0.01);
    }

    #[test]
    fn test_breakdown_omits_empty_thresholds() {
        let records = vec![record("a.B.fast", 1.0)];
        assert!(slow_test_breakdown(&records).is_empty());
    }
}
