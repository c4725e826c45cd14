//! Test-duration log parsing
//!
//! Extracts `(test name, duration)` records from harness logs. A completed
//! test is reported on a line like:
//!
//! ```text
//! <<<<= com.questdb.acl.AccessControlTest.testRevoke[WITH_WAL] duration_ms=4001
//! ```
//!
//! Older harness builds wrote `<<<<=`, newer ones `<<<<`; one pattern covers
//! both. Anything else on a line is ignored, so the marker may appear after
//! arbitrary prefix text (timestamps, thread names).

use anyhow::{Context, Result};
use regex::Regex;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

/// One parsed test execution: full test name and wall-clock duration in seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct DurationRecord {
    /// Full test name, dots separating package/class/method, optionally
    /// suffixed with a bracketed parameter tag (e.g. `[WITH_WAL]`).
    pub name: String,
    /// Duration in seconds (converted from the log's millisecond field).
    pub duration: f64,
}

// Matches both marker spellings: "<<<<= " (old) and "<<<< " (new).
static LINE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<<<<=?\s+(.+?)\s+duration_ms=(\d+)").expect("duration line pattern is valid")
});

/// Parse duration records from an iterator of log lines.
///
/// Non-matching lines are skipped silently. A test name seen more than once
/// keeps its first-seen duration and position: harnesses re-log retried
/// tests, and only the first attempt should count toward scheduling.
pub fn parse_lines<'a, I>(lines: I) -> Vec<DurationRecord>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    let mut records = Vec::new();

    for line in lines {
        let Some(caps) = LINE_PATTERN.captures(line) else {
            continue;
        };
        let name = &caps[1];
        // The pattern only admits digits, so a parse failure means the value
        // overflows u64; treat that line as malformed and skip it.
        let Ok(duration_ms) = caps[2].parse::<u64>() else {
            continue;
        };

        if seen.insert(name.to_string()) {
            records.push(DurationRecord {
                name: name.to_string(),
                duration: duration_ms as f64 / 1000.0,
            });
        }
    }

    records
}

/// Parse duration records from a log file.
///
/// Propagates file-access errors (missing, unreadable) to the caller; the
/// log content itself cannot fail to parse. Invalid UTF-8 is replaced rather
/// than rejected since harness logs routinely embed raw bytes.
pub fn parse_log_file<P: AsRef<Path>>(path: P) -> Result<Vec<DurationRecord>> {
    let path = path.as_ref();
    let bytes = fs::read(path).with_context(|| format!("failed to read log file {}", path.display()))?;
    let text = String::from_utf8_lossy(&bytes);
    Ok(parse_lines(text.lines()))
}
