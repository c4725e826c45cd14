//! CLI argument parsing

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for analysis reports
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format (default)
    Text,
    /// JSON format for machine parsing
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "reparto")]
#[command(version)]
#[command(about = "Test duration log analyzer for parallel CI capacity planning", long_about = None)]
pub struct Cli {
    /// Output format (text or json)
    #[arg(long = "format", value_enum, default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Enable debug logging to stderr
    #[arg(long = "debug", global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Analyze individual test durations from one log file
    Tests {
        /// Path to the test-harness log file
        log_file: PathBuf,

        /// Number of longest running tests to display
        #[arg(short = 'n', long = "top", default_value = "20")]
        top: usize,
    },

    /// Analyze durations grouped by test class
    ByClass {
        /// Path to the test-harness log file
        log_file: PathBuf,

        /// Number of top classes to display
        #[arg(short = 'n', long = "top", default_value = "20")]
        top: usize,

        /// Show the slowest tests inside each class
        #[arg(long = "show-tests")]
        show_tests: bool,

        /// Runner counts to compute split suggestions for
        #[arg(long = "runners", value_delimiter = ',', default_values_t = vec![2, 4, 8])]
        runners: Vec<usize>,
    },

    /// Analyze durations grouped by package
    ByPackage {
        /// Path to the test-harness log file
        log_file: PathBuf,

        /// Number of top packages to display
        #[arg(short = 'n', long = "top", default_value = "20")]
        top: usize,

        /// Show the slowest tests inside each package
        #[arg(long = "show-tests")]
        show_tests: bool,

        /// Runner counts to compute split suggestions for
        #[arg(long = "runners", value_delimiter = ',', default_values_t = vec![2, 4, 8])]
        runners: Vec<usize>,
    },

    /// Detect tests duplicated across parallel runner logs
    Duplicates {
        /// One log file per runner (at least 2)
        #[arg(required = true, num_args = 2..)]
        log_files: Vec<PathBuf>,

        /// Show detailed duplicate lists
        #[arg(long = "show-details")]
        show_details: bool,
    },

    /// Analyze duration trends across chronologically ordered logs
    Trends {
        /// Log files oldest first (at least 2)
        #[arg(required = true, num_args = 2..)]
        log_files: Vec<PathBuf>,

        /// Show detailed information for all items
        #[arg(long = "show-details")]
        show_details: bool,

        /// Percentage threshold for regression detection
        #[arg(long = "threshold-pct", value_name = "PCT", default_value = "20.0")]
        threshold_pct: f64,

        /// Absolute threshold in seconds for regression detection
        #[arg(long = "threshold-abs", value_name = "SECONDS", default_value = "5.0")]
        threshold_abs: f64,
    },
}
