//! Human-readable report rendering
//!
//! Pure `render_*` functions build report sections as strings so tests can
//! assert on content; the CLI prints them verbatim. Layout follows the
//! original capacity-planning reports: 80-column rule lines, top-N tables,
//! bar charts scaled to the largest value.

use crate::distribution::{CumulativePoint, Histogram};
use crate::grouping::Group;
use crate::schedule::RunnerAssignment;
use crate::stats::{RunSummary, ThresholdCount};
use crate::trends::{TrendAnalysis, TrendConfig};
use std::fmt::Write as _;

const RULE: &str = "================================================================================";
const BAR_WIDTH: usize = 40;

/// Format a duration as a compact human-readable string.
///
/// `90.5` → `"1m 30.50s"`, `8130.0` → `"2h 15m 30.00s"`.
pub fn format_duration(seconds: f64) -> String {
    if seconds < 60.0 {
        format!("{seconds:.2}s")
    } else if seconds < 3600.0 {
        let minutes = (seconds / 60.0).floor() as u64;
        let secs = seconds % 60.0;
        format!("{minutes}m {secs:.2}s")
    } else {
        let hours = (seconds / 3600.0).floor() as u64;
        let minutes = ((seconds % 3600.0) / 60.0).floor() as u64;
        let secs = seconds % 60.0;
        format!("{hours}h {minutes}m {secs:.2}s")
    }
}

/// Format a duration change with direction indicator:
/// `"+15.30s (+45.2%) ⬆"` or `"-2m 0.00s (-12.5%) ⬇"`.
pub fn format_change(change_seconds: f64, change_pct: f64) -> String {
    let sign = if change_seconds >= 0.0 { "+" } else { "-" };
    let indicator = if change_seconds > 0.0 {
        "⬆"
    } else if change_seconds < 0.0 {
        "⬇"
    } else {
        "➡"
    };
    format!(
        "{sign}{} ({sign}{:.1}%) {indicator}",
        format_duration(change_seconds.abs()),
        change_pct.abs()
    )
}

fn section(title: &str) -> String {
    format!("\n{RULE}\n{title}\n{RULE}\n")
}

/// Overall statistics for one run, plus the slow-test breakdown.
pub fn render_run_summary(summary: &RunSummary, breakdown: &[ThresholdCount]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\nTotal tests found: {}", summary.test_count);
    let _ = writeln!(out, "Total duration: {}", format_duration(summary.total_duration));
    let _ = writeln!(out, "Average duration: {}", format_duration(summary.avg_duration));
    let _ = writeln!(out, "Max duration: {}", format_duration(summary.max_duration));
    let _ = writeln!(out, "Min duration: {}", format_duration(summary.min_duration));

    if !breakdown.is_empty() {
        out.push_str(&section("DURATION BREAKDOWN"));
        for entry in breakdown {
            let _ = writeln!(
                out,
                "{}: {} ({:.1}%)",
                entry.label, entry.count, entry.percentage
            );
        }
    }
    out
}

/// Top-N slowest individual tests, rank/duration/name columns.
pub fn render_top_tests(sorted_desc: &[(&str, f64)], top_n: usize) -> String {
    let shown = top_n.min(sorted_desc.len());
    let mut out = section(&format!("TOP {shown} LONGEST RUNNING TESTS"));
    let _ = writeln!(out, "{:<6} {:<15} Test Name", "Rank", "Duration");
    out.push_str("--------------------------------------------------------------------------------\n");

    for (i, (name, duration)) in sorted_desc.iter().take(top_n).enumerate() {
        let _ = writeln!(out, "{:<6} {:<15} {}", i + 1, format_duration(*duration), name);
    }
    out
}

/// Top-N groups by total duration. `kind` names the grouping level
/// ("classes", "packages") for the section titles.
pub fn render_group_report(
    kind: &str,
    sorted_groups: &[(&str, &Group)],
    total_duration: f64,
    top_n: usize,
    show_tests: bool,
) -> String {
    let shown = top_n.min(sorted_groups.len());
    let mut out = section(&format!(
        "TOP {shown} TEST {} BY TOTAL DURATION",
        kind.to_uppercase()
    ));
    let _ = writeln!(
        out,
        "{:<6} {:<15} {:<8} {:<12} {:<8} Name",
        "Rank", "Duration", "Tests", "Avg/Test", "%"
    );
    out.push_str("--------------------------------------------------------------------------------\n");

    for (i, (name, group)) in sorted_groups.iter().take(top_n).enumerate() {
        let avg = group.total_duration / group.test_count as f64;
        let pct = if total_duration > 0.0 {
            group.total_duration / total_duration * 100.0
        } else {
            0.0
        };
        let _ = writeln!(
            out,
            "{:<6} {:<15} {:<8} {:<12} {:>6.2}%  {}",
            i + 1,
            format_duration(group.total_duration),
            group.test_count,
            format_duration(avg),
            pct,
            name
        );

        if show_tests {
            let mut tests: Vec<_> = group.tests.iter().collect();
            tests.sort_by(|a, b| {
                b.duration
                    .partial_cmp(&a.duration)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
            for test in tests.iter().take(5) {
                let short = test.name.strip_prefix(&format!("{name}.")).unwrap_or(&test.name);
                let _ = writeln!(out, "       ├─ {:<12} {}", format_duration(test.duration), short);
            }
            if tests.len() > 5 {
                let _ = writeln!(out, "       └─ ... and {} more tests", tests.len() - 5);
            }
        }
    }
    out
}

/// Cumulative-distribution milestones for parallel-execution planning.
pub fn render_cumulative(points: &[CumulativePoint], kind: &str) -> String {
    let mut out = section("CUMULATIVE DISTRIBUTION (for parallel execution planning)");
    for point in points {
        let _ = writeln!(
            out,
            "Top {} {kind} account for {:.1}% of total duration ({})",
            point.item_count,
            point.cumulative_pct,
            format_duration(point.cumulative_duration)
        );
    }
    out
}

/// Suggested split for one runner count.
pub fn render_splits(splits: &[RunnerAssignment], total_duration: f64, kind: &str) -> String {
    let mut out = String::new();
    let target = total_duration / splits.len().max(1) as f64;
    let _ = writeln!(
        out,
        "\nFor {} parallel runners (target: {} each):",
        splits.len(),
        format_duration(target)
    );
    for (i, split) in splits.iter().enumerate() {
        let _ = writeln!(
            out,
            "  Runner {}: {:<12} ({:>5.1}%) - {} {kind}",
            i + 1,
            format_duration(split.duration),
            split.percentage,
            split.items.len()
        );
    }
    out
}

/// ASCII histogram, bars scaled to the largest bucket. Consecutive empty
/// buckets collapse into a single `...` line.
pub fn render_histogram(hist: &Histogram, title: &str) -> String {
    let mut out = section(title);
    let max_count = hist.counts.iter().copied().max().unwrap_or(1).max(1);

    let mut i = 0;
    while i < hist.buckets.len() {
        let count = hist.counts[i];
        if count == 0 {
            while i < hist.counts.len() && hist.counts[i] == 0 {
                i += 1;
            }
            let _ = writeln!(out, "{:<14}", "...");
        } else {
            let bar_len = count * BAR_WIDTH / max_count;
            let bar = "█".repeat(bar_len);
            let pct = count as f64 / hist.total_items as f64 * 100.0;
            let _ = writeln!(
                out,
                "[{:<12}] {:<width$} {:>5} ({:>5.1}%)",
                hist.buckets[i].label,
                bar,
                count,
                pct,
                width = BAR_WIDTH
            );
            i += 1;
        }
    }
    out
}

/// Full trend report: per-run stats, regressions, improvements, new/removed
/// tests, volatility.
pub fn render_trend_report(analysis: &TrendAnalysis, config: &TrendConfig, show_details: bool) -> String {
    let mut out = section(&format!(
        "PERFORMANCE TREND ANALYSIS ACROSS {} LOG FILES",
        analysis.runs.len()
    ));

    for (i, run) in analysis.runs.iter().enumerate() {
        let label = if i == 0 {
            "(baseline)"
        } else if i == analysis.runs.len() - 1 {
            "(current)"
        } else {
            ""
        };
        let _ = writeln!(
            out,
            "Run {} {:<12}: {:4} tests, {}",
            i + 1,
            label,
            run.test_count,
            format_duration(run.total_duration)
        );
    }

    if let (Some(first), Some(last)) = (analysis.runs.first(), analysis.runs.last()) {
        let change = last.total_duration - first.total_duration;
        let change_pct = if first.total_duration > 0.0 {
            change / first.total_duration * 100.0
        } else {
            0.0
        };
        let _ = writeln!(out, "\nTotal duration change: {}", format_change(change, change_pct));
        let _ = writeln!(
            out,
            "Total test count change: {:+} tests",
            last.test_count as i64 - first.test_count as i64
        );
        out.push_str(&render_duration_trend_bars(analysis));
    }

    out.push_str(&section(&format!(
        "PERFORMANCE REGRESSIONS (>{:.0}% or >{} slower)",
        config.threshold_pct,
        format_duration(config.threshold_abs)
    )));
    let _ = writeln!(out, "Found {} test regressions", analysis.regressions.len());
    if analysis.regressions.is_empty() {
        out.push_str("  ✓ No significant regressions detected!\n");
    } else {
        let shown = if show_details {
            analysis.regressions.len()
        } else {
            analysis.regressions.len().min(20)
        };
        for (i, (name, trend)) in analysis.regressions.iter().take(shown).enumerate() {
            let _ = writeln!(out, "\n  {}. {}", i + 1, name);
            let _ = writeln!(
                out,
                "     Baseline: {} → Current: {}",
                format_duration(trend.baseline),
                format_duration(trend.current)
            );
            let _ = writeln!(
                out,
                "     Change: {}",
                format_change(trend.absolute_change, trend.relative_change)
            );
        }
        let added: f64 = analysis.regressions.iter().map(|(_, t)| t.absolute_change).sum();
        let _ = writeln!(out, "\n  Total time added by regressions: {}", format_duration(added));
    }

    out.push_str(&section(&format!(
        "PERFORMANCE IMPROVEMENTS (>{:.0}% or >{} faster)",
        config.threshold_pct,
        format_duration(config.threshold_abs)
    )));
    let _ = writeln!(out, "Found {} test improvements", analysis.improvements.len());
    if !analysis.improvements.is_empty() {
        let shown = if show_details {
            analysis.improvements.len()
        } else {
            analysis.improvements.len().min(10)
        };
        for (i, (name, trend)) in analysis.improvements.iter().take(shown).enumerate() {
            let _ = writeln!(out, "\n  {}. {}", i + 1, name);
            let _ = writeln!(
                out,
                "     Change: {}",
                format_change(trend.absolute_change, trend.relative_change)
            );
        }
        let saved: f64 = analysis.improvements.iter().map(|(_, t)| -t.absolute_change).sum();
        let _ = writeln!(out, "\n  Total time saved by improvements: {}", format_duration(saved));
    }

    if !analysis.new_tests.is_empty() {
        out.push_str(&section("NEW TESTS (added since baseline)"));
        let total: f64 = analysis.new_tests.iter().map(|t| t.duration).sum();
        let _ = writeln!(out, "{} new tests added", analysis.new_tests.len());
        let _ = writeln!(out, "Total time for new tests: {}", format_duration(total));
        for test in analysis.new_tests.iter().take(10) {
            let _ = writeln!(out, "  {} - {}", test.name, format_duration(test.duration));
        }
    }

    if !analysis.removed_tests.is_empty() {
        out.push_str(&section("REMOVED TESTS (present in baseline, missing from current)"));
        let total: f64 = analysis.removed_tests.iter().map(|t| t.duration).sum();
        let _ = writeln!(out, "{} tests removed", analysis.removed_tests.len());
        let _ = writeln!(out, "Total time freed by removed tests: {}", format_duration(total));
        for test in analysis.removed_tests.iter().take(10) {
            let _ = writeln!(out, "  - {} (was {})", test.name, format_duration(test.duration));
        }
    }

    if !analysis.volatile_tests.is_empty() {
        out.push_str(&section("MOST VOLATILE TESTS (high duration variance)"));
        let _ = writeln!(
            out,
            "{} tests with significant variance (CV > {:.0}%)",
            analysis.volatile_tests.len(),
            config.volatile_cv
        );
        for (i, (name, trend)) in analysis.volatile_tests.iter().take(10).enumerate() {
            let _ = writeln!(out, "\n  {}. {}", i + 1, name);
            let min_dur = trend.history.iter().cloned().fold(f64::INFINITY, f64::min);
            let max_dur = trend.history.iter().cloned().fold(0.0, f64::max);
            let variation = if min_dur > 0.0 { max_dur / min_dur } else { 0.0 };
            let _ = writeln!(
                out,
                "     Range: {} - {} ({variation:.1}x variation)",
                format_duration(min_dur),
                format_duration(max_dur)
            );
            if let (Some(mean), Some(stdev), Some(cv)) = (trend.mean, trend.stdev, trend.cv) {
                let _ = writeln!(
                    out,
                    "     Mean: {}, StdDev: {}, CV: {:.1}%",
                    format_duration(mean),
                    format_duration(stdev),
                    cv
                );
            }
            if show_details {
                let history = trend
                    .history
                    .iter()
                    .map(|&d| format_duration(d))
                    .collect::<Vec<_>>()
                    .join(" → ");
                let _ = writeln!(out, "     History: {history}");
            }
        }
    }

    out.push_str(&render_trend_summary(analysis, config));
    out
}

// Closing section: overall verdict, findings, recommendations, and the
// regressions worth immediate attention.
fn render_trend_summary(analysis: &TrendAnalysis, config: &TrendConfig) -> String {
    let mut out = section("SUMMARY & RECOMMENDATIONS");

    let change_pct = match (analysis.runs.first(), analysis.runs.last()) {
        (Some(first), Some(last)) if first.total_duration > 0.0 => {
            (last.total_duration - first.total_duration) / first.total_duration * 100.0
        }
        _ => 0.0,
    };
    let trend_label = if change_pct.abs() < 5.0 {
        "➡ STABLE".to_string()
    } else if change_pct > 0.0 {
        format!("⬆ DEGRADATION ({change_pct:+.1}% slower)")
    } else {
        format!("⬇ IMPROVEMENT ({change_pct:+.1}% faster)")
    };
    let _ = writeln!(out, "\nOverall Trend: {trend_label}");

    // Volatility needs 3+ runs before CV means anything.
    let high_volatility = if analysis.runs.len() >= 3 {
        analysis
            .trends
            .values()
            .filter(|t| t.cv.is_some_and(|cv| cv > 50.0))
            .count()
    } else {
        0
    };

    let mut findings = Vec::new();
    if !analysis.regressions.is_empty() {
        findings.push(format!(
            "⚠ {} test regressions detected (threshold: >{:.0}% or >{})",
            analysis.regressions.len(),
            config.threshold_pct,
            format_duration(config.threshold_abs)
        ));
    }
    if high_volatility > 0 {
        findings.push(format!("⚠ {high_volatility} tests are highly volatile (CV > 50%)"));
    }
    if !analysis.improvements.is_empty() {
        findings.push(format!("✓ {} tests improved significantly", analysis.improvements.len()));
    }
    if !analysis.new_tests.is_empty() {
        findings.push(format!("ℹ {} new tests added", analysis.new_tests.len()));
    }
    if !analysis.removed_tests.is_empty() {
        findings.push(format!("ℹ {} tests removed", analysis.removed_tests.len()));
    }
    if !findings.is_empty() {
        out.push_str("\nFindings:\n");
        for finding in &findings {
            let _ = writeln!(out, "  {finding}");
        }
    }

    let mut recommendations = Vec::new();
    if !analysis.regressions.is_empty() {
        let top = &analysis.regressions[..analysis.regressions.len().min(5)];
        let impact: f64 = top.iter().map(|(_, t)| t.absolute_change).sum();
        recommendations.push(format!(
            "Investigate top {} regressions - they account for {} of added time",
            top.len(),
            format_duration(impact)
        ));
    }
    if analysis.new_tests.len() > 10 {
        let total: f64 = analysis.new_tests.iter().map(|t| t.duration).sum();
        recommendations.push(format!(
            "Review new tests - {} tests added contribute {}",
            analysis.new_tests.len(),
            format_duration(total)
        ));
    }
    if high_volatility > 0 {
        recommendations
            .push("Consider stabilizing tests with high variance for more predictable CI times".to_string());
    }
    if change_pct > 10.0 {
        recommendations.push(format!(
            "Overall test suite is {change_pct:.1}% slower - consider optimization effort"
        ));
    }
    if !recommendations.is_empty() {
        out.push_str("\nRecommendations:\n");
        for (i, rec) in recommendations.iter().enumerate() {
            let _ = writeln!(out, "  {}. {rec}", i + 1);
        }
    }

    if findings.is_empty() && recommendations.is_empty() {
        out.push_str("\n✓ Test suite performance is stable - no significant issues detected!\n");
    }

    let critical: Vec<_> = analysis
        .regressions
        .iter()
        .filter(|(_, t)| t.relative_change > 50.0 || t.absolute_change > 30.0)
        .collect();
    if !critical.is_empty() {
        out.push_str("\nCritical regressions to investigate immediately:\n");
        for (i, (name, trend)) in critical.iter().take(5).enumerate() {
            let _ = writeln!(
                out,
                "  {}. {} ({})",
                i + 1,
                name,
                format_change(trend.absolute_change, trend.relative_change)
            );
        }
    }

    out
}

// Bar chart of per-run total durations, scaled to the slowest run.
fn render_duration_trend_bars(analysis: &TrendAnalysis) -> String {
    if analysis.runs.len() < 2 {
        return String::new();
    }

    let max_duration = analysis
        .runs
        .iter()
        .map(|r| r.total_duration)
        .fold(0.0, f64::max);

    let mut out = String::from("\nTotal Duration Trend:\n");
    for (i, run) in analysis.runs.iter().enumerate() {
        let bar_len = if max_duration > 0.0 {
            (run.total_duration / max_duration * 50.0) as usize
        } else {
            0
        };
        let _ = writeln!(
            out,
            "  Run {} ({:>30}): {:<50} {}",
            i + 1,
            truncate_left(&run.label, 30),
            "█".repeat(bar_len),
            format_duration(run.total_duration)
        );
    }
    out
}

/// Duplicate/overlap report across runner logs.
pub fn render_duplicate_report(
    analysis: &crate::duplicates::DuplicateAnalysis,
    show_details: bool,
) -> String {
    let mut out = section(&format!(
        "DUPLICATE TEST ANALYSIS ACROSS {} LOG FILES",
        analysis.logs.len()
    ));

    for log in &analysis.logs {
        let _ = writeln!(
            out,
            "{}: {} tests, {} classes, {} packages, {}",
            log.label,
            log.test_count,
            log.class_count,
            log.package_count,
            format_duration(log.total_duration)
        );
    }

    let _ = writeln!(out, "\nTotal unique tests: {}", analysis.unique_tests);
    let _ = writeln!(out, "Total unique classes: {}", analysis.unique_classes);
    let _ = writeln!(out, "Total unique packages: {}", analysis.unique_packages);

    if analysis.duplicate_tests.is_empty() {
        out.push_str("\n  ✓ No duplicate tests found - excellent!\n");
    } else {
        let _ = writeln!(
            out,
            "\n  WARNING: {} tests appear in multiple log files!",
            analysis.duplicate_tests.len()
        );
        let _ = writeln!(
            out,
            "  Wasted time from duplicates: {}",
            format_duration(analysis.wasted_duration)
        );
        if let Some(avg) = analysis.avg_duplications {
            let _ = writeln!(out, "  Average duplications per test: {avg:.1}");
        }
        if show_details {
            for overlap in analysis.duplicate_tests.iter().take(20) {
                let _ = writeln!(out, "    {} ({} logs)", overlap.name, overlap.logs.len());
            }
        }
    }

    if analysis.duplicate_classes.is_empty() {
        out.push_str("  ✓ No classes span multiple logs\n");
    } else {
        let _ = writeln!(
            out,
            "  {} classes appear in multiple log files (consider class-level split boundaries)",
            analysis.duplicate_classes.len()
        );
    }

    out.push_str(&section("DISTRIBUTION ANALYSIS"));
    let _ = writeln!(out, "{:<40} {:<10} {:<15} {:<8}", "Log File", "Tests", "Duration", "%");
    out.push_str("--------------------------------------------------------------------------------\n");
    for log in &analysis.logs {
        let _ = writeln!(
            out,
            "{:<40} {:<10} {:<15} {:>6.2}%",
            truncate_left(&log.label, 37),
            log.test_count,
            format_duration(log.total_duration),
            log.percentage
        );
    }

    if let Some(balance) = &analysis.balance {
        out.push_str("\nBalance metrics:\n");
        let _ = writeln!(out, "  Max duration: {}", format_duration(balance.max_duration));
        let _ = writeln!(out, "  Min duration: {}", format_duration(balance.min_duration));
        let _ = writeln!(out, "  Avg duration: {}", format_duration(balance.avg_duration));
        let _ = writeln!(out, "  Balance ratio: {:.2} (1.0 = perfect balance)", balance.ratio);

        let verdict = if balance.ratio < 0.8 {
            "⚠ Poor balance - consider redistributing tests"
        } else if balance.ratio < 0.9 {
            "⚠ Moderate balance - some improvement possible"
        } else {
            "✓ Good balance"
        };
        let _ = writeln!(out, "  {verdict}");
    }

    out
}

fn truncate_left(s: &str, max: usize) -> &str {
    let len = s.chars().count();
    if len <= max {
        s
    } else {
        let skip = len - max;
        let (idx, _) = s.char_indices().nth(skip).unwrap_or((0, ' '));
        &s[idx..]
    }
}
