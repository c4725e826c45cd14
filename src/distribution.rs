//! Distribution analysis over grouped durations
//!
//! Two independent views of how time is spread across a suite:
//! - cumulative milestones ("the top 12 classes account for 50% of total
//!   runtime"), used to judge how concentrated the load is;
//! - a histogram with human-friendly bucket boundaries picked from a fixed
//!   table of round time steps.

/// One cumulative-distribution milestone.
#[derive(Debug, Clone, PartialEq)]
pub struct CumulativePoint {
    /// Number of items (from the top of the descending order) needed to
    /// reach the threshold.
    pub item_count: usize,
    /// Cumulative percentage of total duration at that point.
    pub cumulative_pct: f64,
    /// Cumulative duration in seconds at that point.
    pub cumulative_duration: f64,
}

/// Walk items pre-sorted by duration descending and emit a point each time
/// the running percentage crosses a pending threshold.
///
/// Thresholds must be ascending; each is consumed at most once. A single
/// item can cross several thresholds at a time, producing several points
/// with the same `item_count`. A zero total yields zero percentages and no
/// crossings.
pub fn cumulative_distribution(
    sorted_totals_desc: &[f64],
    thresholds: &[f64],
    total_duration: f64,
) -> Vec<CumulativePoint> {
    let mut results = Vec::new();
    let mut cumulative = 0.0;
    let mut threshold_idx = 0;

    for (i, duration) in sorted_totals_desc.iter().enumerate() {
        cumulative += duration;
        let cumulative_pct = if total_duration > 0.0 {
            cumulative / total_duration * 100.0
        } else {
            0.0
        };

        while threshold_idx < thresholds.len() && cumulative_pct >= thresholds[threshold_idx] {
            results.push(CumulativePoint {
                item_count: i + 1,
                cumulative_pct,
                cumulative_duration: cumulative,
            });
            threshold_idx += 1;
        }
    }

    results
}

/// One histogram bucket: `[lower, upper)` in seconds, except that a value
/// equal to the global max lands in the final bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramBucket {
    pub lower: f64,
    pub upper: f64,
    pub label: String,
}

/// Bucketed distribution of raw durations.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub buckets: Vec<HistogramBucket>,
    /// Item count per bucket, same length as `buckets`.
    pub counts: Vec<usize>,
    pub total_items: usize,
}

/// Default target bucket count before step rounding adjusts it.
pub const DEFAULT_BUCKETS: usize = 10;

// Runaway guard: if rounding still produces more buckets than this, stop.
const MAX_BUCKETS: usize = 20;

// Round time steps in seconds, ascending. Beyond the table the step falls
// back to {1,2,5,10} times a power of ten.
const TIME_STEPS: [f64; 18] = [
    0.1, 0.2, 0.5, 1.0, 2.0, 5.0, 10.0, 15.0, 20.0, 30.0, 60.0, 120.0, 180.0, 300.0, 600.0, 900.0,
    1800.0, 3600.0,
];

/// Build a histogram over raw durations with nice bucket boundaries.
///
/// Returns `None` for empty input. When every duration is identical the
/// histogram is a single bucket holding all items.
pub fn histogram(durations: &[f64], target_buckets: usize) -> Option<Histogram> {
    if durations.is_empty() {
        return None;
    }

    let min = durations.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = durations.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

    if min == max {
        return Some(Histogram {
            buckets: vec![HistogramBucket {
                lower: min,
                upper: max,
                label: crate::report::format_duration(min),
            }],
            counts: vec![durations.len()],
            total_items: durations.len(),
        });
    }

    let buckets = build_buckets(min, max, target_buckets);
    let mut counts = vec![0usize; buckets.len()];

    for &duration in durations {
        let mut placed = false;
        for (i, bucket) in buckets.iter().enumerate() {
            if duration >= bucket.lower && duration < bucket.upper {
                counts[i] += 1;
                placed = true;
                break;
            }
        }
        // Half-open intervals exclude the global max; force it into the
        // final bucket.
        if !placed && duration == max {
            if let Some(last) = counts.last_mut() {
                *last += 1;
            }
        }
    }

    Some(Histogram {
        buckets,
        counts,
        total_items: durations.len(),
    })
}

/// Generate contiguous buckets covering `[min, max]`, boundaries aligned to
/// multiples of a nice step below `min`.
fn build_buckets(min: f64, max: f64, target_buckets: usize) -> Vec<HistogramBucket> {
    let raw_step = (max - min) / target_buckets as f64;
    let step = nice_step(raw_step);
    let start = (min / step).floor() * step;

    let mut buckets = Vec::new();
    let mut current = start;
    while current <= max {
        let next = current + step;
        buckets.push(HistogramBucket {
            lower: current,
            upper: next,
            label: bucket_label(current, next, step, max),
        });
        current = next;

        if buckets.len() >= MAX_BUCKETS {
            break;
        }
    }

    buckets
}

/// Snap a raw step up to the first nice candidate that covers it.
///
/// This is a rule table with a linear scan, not general numerics: the table
/// carries the time-natural steps (15s, 30s, minutes, quarters of an hour)
/// that a plain 1-2-5 decade rule would miss.
fn nice_step(raw: f64) -> f64 {
    if raw <= 0.0 {
        return 1.0;
    }

    for &step in &TIME_STEPS {
        if step >= raw {
            return step;
        }
    }

    // Past an hour: {1,2,5,10} scaled by the decade of the raw step.
    let exponent = 10f64.powi(raw.log10().floor() as i32);
    let normalized = raw / exponent;
    let nice = if normalized <= 1.0 {
        1.0
    } else if normalized <= 2.0 {
        2.0
    } else if normalized <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * exponent
}

/// Range label using one unit for the whole histogram, chosen from the
/// global max so the report reads uniformly (seconds, minutes, or hours).
fn bucket_label(lower: f64, upper: f64, step: f64, global_max: f64) -> String {
    if global_max < 60.0 {
        if step < 1.0 {
            format!("{:.1}-{:.1}s", lower, upper)
        } else {
            format!("{:.0}-{:.0}s", lower, upper)
        }
    } else if global_max < 3600.0 {
        let (lo, up) = (lower / 60.0, upper / 60.0);
        if step < 60.0 {
            format!("{:.1}-{:.1}m", lo, up)
        } else {
            format!("{:.0}-{:.0}m", lo, up)
        }
    } else {
        let (lo, up) = (lower / 3600.0, upper / 3600.0);
        if step < 3600.0 {
            format!("{:.1}-{:.1}h", lo, up)
        } else {
            format!("{:.0}-{:.0}h", lo, up)
        }
    }
}
