use anyhow::Result;
use clap::Parser;
use reparto::cli::{Cli, Command, OutputFormat};
use reparto::json_output::{JsonCumulativePoint, JsonGroup, JsonGroupReport, JsonRunReport, JsonSplitPlan, JsonTest};
use reparto::trends::{ParsedRun, TrendConfig};
use reparto::{distribution, duplicates, grouping, keys, parser, report, schedule, stats, trends};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Cumulative-distribution thresholds used by the grouped reports.
const CUMULATIVE_THRESHOLDS: [f64; 5] = [10.0, 25.0, 50.0, 75.0, 90.0];

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

fn load_runs(log_files: &[PathBuf]) -> Result<Vec<ParsedRun>> {
    log_files
        .iter()
        .map(|path| {
            let records = parser::parse_log_file(path)?;
            tracing::debug!(path = %path.display(), tests = records.len(), "parsed log");
            Ok(ParsedRun {
                label: path.display().to_string(),
                records,
            })
        })
        .collect()
}

/// `tests` subcommand: single-run statistics and the slowest tests.
fn run_tests_analysis(log_file: &Path, top: usize, format: OutputFormat) -> Result<()> {
    let records = parser::parse_log_file(log_file)?;
    let Some(summary) = stats::summarize(&records) else {
        println!("No test durations found in the log file.");
        return Ok(());
    };
    let breakdown = stats::slow_test_breakdown(&records);

    let mut sorted: Vec<(&str, f64)> = records.iter().map(|r| (r.name.as_str(), r.duration)).collect();
    sorted.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    match format {
        OutputFormat::Json => {
            let json = JsonRunReport {
                summary,
                slow_tests: breakdown,
                top_tests: sorted
                    .iter()
                    .take(top)
                    .map(|&(name, duration)| JsonTest {
                        name: name.to_string(),
                        duration,
                    })
                    .collect(),
            };
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Text => {
            println!("Analyzing test durations from: {}", log_file.display());
            print!("{}", report::render_run_summary(&summary, &breakdown));
            print!("{}", report::render_top_tests(&sorted, top));

            let durations: Vec<f64> = records.iter().map(|r| r.duration).collect();
            if let Some(hist) = distribution::histogram(&durations, distribution::DEFAULT_BUCKETS) {
                print!("{}", report::render_histogram(&hist, "DURATION HISTOGRAM"));
            }
        }
    }
    Ok(())
}

/// `by-class` / `by-package` subcommands: grouped totals, cumulative
/// milestones, and split suggestions.
#[allow(clippy::too_many_arguments)]
fn run_grouped_analysis(
    log_file: &Path,
    extractor: fn(&str) -> String,
    // singular/plural forms for titles and JSON ("class"/"classes")
    kind_singular: &str,
    kind: &str,
    top: usize,
    show_tests: bool,
    runners: &[usize],
    format: OutputFormat,
) -> Result<()> {
    let records = parser::parse_log_file(log_file)?;
    let Some(summary) = stats::summarize(&records) else {
        println!("No test durations found in the log file.");
        return Ok(());
    };
    let total_duration = summary.total_duration;

    let groups = grouping::group_by(&records, extractor);
    let sorted = grouping::sorted_by_total_desc(&groups);
    let sorted_totals: Vec<f64> = sorted.iter().map(|(_, g)| g.total_duration).collect();
    let cumulative =
        distribution::cumulative_distribution(&sorted_totals, &CUMULATIVE_THRESHOLDS, total_duration);

    let split_input: Vec<(String, f64)> = sorted
        .iter()
        .map(|(name, group)| (name.to_string(), group.total_duration))
        .collect();

    match format {
        OutputFormat::Json => {
            let json = JsonGroupReport {
                grouping: kind_singular.to_string(),
                group_count: groups.len(),
                groups: sorted
                    .iter()
                    .map(|(name, group)| JsonGroup::from_group(name, group, total_duration, show_tests))
                    .collect(),
                cumulative: cumulative.iter().map(JsonCumulativePoint::from).collect(),
                splits: runners
                    .iter()
                    .map(|&count| JsonSplitPlan {
                        runner_count: count,
                        runners: schedule::suggest_parallel_splits(&split_input, count, total_duration),
                    })
                    .collect(),
                summary,
            };
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Text => {
            println!(
                "Analyzing test durations by {} from: {}",
                kind_singular,
                log_file.display()
            );
            println!("\nTotal {kind}: {}", groups.len());
            println!("Total tests: {}", summary.test_count);
            println!("Total duration: {}", report::format_duration(total_duration));
            println!(
                "Average tests per group: {:.1}",
                summary.test_count as f64 / groups.len() as f64
            );

            print!(
                "{}",
                report::render_group_report(kind, &sorted, total_duration, top, show_tests)
            );
            print!("{}", report::render_cumulative(&cumulative, kind));

            println!("\n{}", "=".repeat(80));
            println!("PARALLEL EXECUTION SUGGESTIONS");
            print!("{}", "=".repeat(80));
            for &count in runners {
                let splits = schedule::suggest_parallel_splits(&split_input, count, total_duration);
                print!("{}", report::render_splits(&splits, total_duration, kind));
            }
        }
    }
    Ok(())
}

fn run_duplicates_analysis(log_files: &[PathBuf], show_details: bool, format: OutputFormat) -> Result<()> {
    let runs = load_runs(log_files)?;
    let analysis = duplicates::analyze_duplicates(&runs);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&analysis)?),
        OutputFormat::Text => print!("{}", report::render_duplicate_report(&analysis, show_details)),
    }
    Ok(())
}

fn run_trends_analysis(
    log_files: &[PathBuf],
    show_details: bool,
    config: &TrendConfig,
    format: OutputFormat,
) -> Result<()> {
    config.validate().map_err(|e| anyhow::anyhow!(e))?;

    // Caller-supplied order is the chronology every comparison relies on.
    let runs = load_runs(log_files)?;
    let analysis = trends::analyze_runs(&runs, config);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&analysis)?),
        OutputFormat::Text => print!("{}", report::render_trend_report(&analysis, config, show_details)),
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.debug);

    match &args.command {
        Command::Tests { log_file, top } => run_tests_analysis(log_file, *top, args.format),
        Command::ByClass {
            log_file,
            top,
            show_tests,
            runners,
        } => run_grouped_analysis(
            log_file,
            keys::class_key,
            "class",
            "classes",
            *top,
            *show_tests,
            runners,
            args.format,
        ),
        Command::ByPackage {
            log_file,
            top,
            show_tests,
            runners,
        } => run_grouped_analysis(
            log_file,
            keys::package_key,
            "package",
            "packages",
            *top,
            *show_tests,
            runners,
            args.format,
        ),
        Command::Duplicates {
            log_files,
            show_details,
        } => run_duplicates_analysis(log_files, *show_details, args.format),
        Command::Trends {
            log_files,
            show_details,
            threshold_pct,
            threshold_abs,
        } => {
            let config = TrendConfig {
                threshold_pct: *threshold_pct,
                threshold_abs: *threshold_abs,
                ..TrendConfig::default()
            };
            run_trends_analysis(log_files, *show_details, &config, args.format)
        }
    }
}
