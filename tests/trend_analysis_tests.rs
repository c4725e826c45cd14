// End-to-end tests for the trends subcommand

#![allow(deprecated)] // Command::cargo_bin is deprecated but still functional

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn write_log(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_trends_detects_regression() {
    let tmp_dir = TempDir::new().unwrap();
    let old = write_log(
        &tmp_dir,
        "old.log",
        "<<<<= a.b.C.slow duration_ms=10000\n<<<<= a.b.C.fast duration_ms=1000\n",
    );
    let new = write_log(
        &tmp_dir,
        "new.log",
        "<<<<= a.b.C.slow duration_ms=25000\n<<<<= a.b.C.fast duration_ms=1000\n",
    );

    let mut cmd = Command::cargo_bin("reparto").unwrap();
    cmd.arg("trends").arg(&old).arg(&new);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("PERFORMANCE TREND ANALYSIS ACROSS 2 LOG FILES"))
        .stdout(predicate::str::contains("Found 1 test regressions"))
        .stdout(predicate::str::contains("a.b.C.slow"))
        .stdout(predicate::str::contains("Baseline: 10.00s → Current: 25.00s"))
        .stdout(predicate::str::contains("SUMMARY & RECOMMENDATIONS"))
        .stdout(predicate::str::contains("Overall Trend: ⬆ DEGRADATION"))
        .stdout(predicate::str::contains("Critical regressions to investigate immediately"));
}

#[test]
fn test_trends_no_regressions_for_stable_suite() {
    let tmp_dir = TempDir::new().unwrap();
    let old = write_log(&tmp_dir, "old.log", "<<<<= a.b.C.t duration_ms=10000\n");
    let new = write_log(&tmp_dir, "new.log", "<<<<= a.b.C.t duration_ms=10500\n");

    let mut cmd = Command::cargo_bin("reparto").unwrap();
    cmd.arg("trends").arg(&old).arg(&new);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("No significant regressions detected"));
}

#[test]
fn test_trends_custom_thresholds() {
    let tmp_dir = TempDir::new().unwrap();
    // +15%: below the default 20% threshold, above a 10% one.
    let old = write_log(&tmp_dir, "old.log", "<<<<= a.b.C.t duration_ms=20000\n");
    let new = write_log(&tmp_dir, "new.log", "<<<<= a.b.C.t duration_ms=23000\n");

    let mut cmd = Command::cargo_bin("reparto").unwrap();
    cmd.arg("trends").arg(&old).arg(&new);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Found 0 test regressions"));

    let mut cmd = Command::cargo_bin("reparto").unwrap();
    cmd.arg("trends")
        .arg(&old)
        .arg(&new)
        .arg("--threshold-pct")
        .arg("10")
        .arg("--threshold-abs")
        .arg("60");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Found 1 test regressions"));
}

#[test]
fn test_trends_reports_new_and_removed_tests() {
    let tmp_dir = TempDir::new().unwrap();
    let old = write_log(
        &tmp_dir,
        "old.log",
        "<<<<= a.b.C.kept duration_ms=1000\n<<<<= a.b.C.gone duration_ms=3000\n",
    );
    let new = write_log(
        &tmp_dir,
        "new.log",
        "<<<<= a.b.C.kept duration_ms=1000\n<<<<= a.b.C.fresh duration_ms=7000\n",
    );

    let mut cmd = Command::cargo_bin("reparto").unwrap();
    cmd.arg("trends").arg(&old).arg(&new);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("NEW TESTS"))
        .stdout(predicate::str::contains("a.b.C.fresh - 7.00s"))
        .stdout(predicate::str::contains("REMOVED TESTS"))
        .stdout(predicate::str::contains("a.b.C.gone (was 3.00s)"));
}

#[test]
fn test_trends_flags_volatile_tests() {
    let tmp_dir = TempDir::new().unwrap();
    let r1 = write_log(&tmp_dir, "r1.log", "<<<<= a.b.C.t duration_ms=10000\n");
    let r2 = write_log(&tmp_dir, "r2.log", "<<<<= a.b.C.t duration_ms=60000\n");
    let r3 = write_log(&tmp_dir, "r3.log", "<<<<= a.b.C.t duration_ms=10000\n");

    let mut cmd = Command::cargo_bin("reparto").unwrap();
    cmd.arg("trends").arg(&r1).arg(&r2).arg(&r3);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("MOST VOLATILE TESTS"))
        .stdout(predicate::str::contains("CV:"));
}

#[test]
fn test_trends_json_format() {
    let tmp_dir = TempDir::new().unwrap();
    let old = write_log(&tmp_dir, "old.log", "<<<<= a.b.C.t duration_ms=10000\n");
    let new = write_log(&tmp_dir, "new.log", "<<<<= a.b.C.t duration_ms=25000\n");

    let mut cmd = Command::cargo_bin("reparto").unwrap();
    cmd.arg("--format").arg("json").arg("trends").arg(&old).arg(&new);

    let output = cmd.assert().success().get_output().stdout.clone();
    let json: serde_json::Value = serde_json::from_slice(&output).unwrap();

    assert_eq!(json["runs"].as_array().unwrap().len(), 2);
    assert_eq!(json["regressions"][0][0], "a.b.C.t");
    assert_eq!(json["regressions"][0][1]["relative_change"], 150.0);
    assert_eq!(json["regressions"][0][1]["trend"], "degrading");
    // Two observations: variance stats must be absent, not null.
    assert!(json["regressions"][0][1].get("variance").is_none());
}

#[test]
fn test_trends_missing_file_exits_nonzero() {
    let tmp_dir = TempDir::new().unwrap();
    let old = write_log(&tmp_dir, "old.log", "<<<<= a.b.C.t duration_ms=1000\n");

    let mut cmd = Command::cargo_bin("reparto").unwrap();
    cmd.arg("trends").arg(&old).arg("/nonexistent/new.log");

    cmd.assert().failure();
}
