//! Reparto - test duration log analyzer for parallel CI capacity planning
//!
//! This library parses test-harness logs into per-test duration records and
//! computes everything a CI capacity plan needs from them: hierarchical
//! grouping by class and package, cumulative-distribution milestones,
//! histograms with human-friendly buckets, balanced parallel-runner splits
//! via LPT bin packing, and cross-run trend/regression analysis.

pub mod cli;
pub mod distribution;
pub mod duplicates;
pub mod grouping;
pub mod json_output;
pub mod keys;
pub mod parser;
pub mod report;
pub mod schedule;
pub mod stats;
pub mod trends;
