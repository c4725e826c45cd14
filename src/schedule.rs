//! Parallel-runner assignment via greedy LPT bin packing
//!
//! Distributes grouped items across a fixed number of runners to balance
//! total duration. Longest-processing-time-first is a 4/3 approximation to
//! the optimal makespan; exact packing is NP-hard and the approximation is
//! deterministic and O(n·k), which is all a split suggestion needs.

use serde::Serialize;

/// Work assigned to one parallel runner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunnerAssignment {
    /// Group keys assigned to this runner, in assignment order.
    pub items: Vec<String>,
    /// Total duration of assigned items in seconds.
    pub duration: f64,
    /// Share of the overall duration, in percent.
    pub percentage: f64,
}

/// Pack items across `num_runners` runners, largest first to the least
/// loaded runner (lowest index on ties).
///
/// `sorted_items` must already be sorted by duration descending for the LPT
/// guarantee to hold; an unsorted input still produces a valid partition,
/// just a potentially worse-balanced one. The result always has exactly
/// `num_runners` entries, some possibly empty.
pub fn suggest_parallel_splits(
    sorted_items: &[(String, f64)],
    num_runners: usize,
    total_duration: f64,
) -> Vec<RunnerAssignment> {
    if num_runners == 0 {
        return Vec::new();
    }

    let mut items: Vec<Vec<String>> = vec![Vec::new(); num_runners];
    let mut durations = vec![0.0f64; num_runners];

    for (name, duration) in sorted_items {
        let min_idx = durations
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(i, _)| i)
            .unwrap_or(0);
        items[min_idx].push(name.clone());
        durations[min_idx] += duration;
    }

    items
        .into_iter()
        .zip(durations)
        .map(|(items, duration)| RunnerAssignment {
            items,
            duration,
            percentage: if total_duration > 0.0 {
                duration / total_duration * 100.0
            } else {
                0.0
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(durations: &[f64]) -> Vec<(String, f64)> {
        durations
            .iter()
            .enumerate()
            .map(|(i, &d)| (format!("item{i}"), d))
            .collect()
    }

    #[test]
    fn test_two_equal_items_two_runners() {
        let splits = suggest_parallel_splits(&items(&[10.0, 10.0]), 2, 20.0);
        assert_eq!(splits.len(), 2);
        assert_eq!(splits[0].items.len(), 1);
        assert_eq!(splits[1].items.len(), 1);
        assert_eq!(splits[0].duration, 10.0);
        assert_eq!(splits[0].percentage, 50.0);
    }

    #[test]
    fn test_balances_despite_unequal_item_counts() {
        // [5,3,2] across 2 runners: 5 alone, 3+2 together.
        let splits = suggest_parallel_splits(&items(&[5.0, 3.0, 2.0]), 2, 10.0);
        assert_eq!(splits[0].items, ["item0"]);
        assert_eq!(splits[0].duration, 5.0);
        assert_eq!(splits[1].items, ["item1", "item2"]);
        assert_eq!(splits[1].duration, 5.0);
    }

    #[test]
    fn test_always_returns_requested_runner_count() {
        let splits = suggest_parallel_splits(&items(&[1.0]), 4, 1.0);
        assert_eq!(splits.len(), 4);
        assert_eq!(splits[0].items.len(), 1);
        assert!(splits[1..].iter().all(|s| s.items.is_empty()));
    }

    #[test]
    fn test_durations_sum_to_total() {
        let durations = [9.0, 7.5, 4.0, 3.5, 3.0, 1.0, 0.5];
        let total: f64 = durations.iter().sum();
        let splits = suggest_parallel_splits(&items(&durations), 3, total);
        let packed: f64 = splits.iter().map(|s| s.duration).sum();
        assert!((packed - total).abs() < 1e-9);

        let assigned: usize = splits.iter().map(|s| s.items.len()).sum();
        assert_eq!(assigned, durations.len());
    }

    #[test]
    fn test_ties_go_to_lowest_index() {
        let splits = suggest_parallel_splits(&items(&[4.0]), 3, 4.0);
        assert_eq!(splits[0].items, ["item0"]);
    }

    #[test]
    fn test_zero_total_reports_zero_percentage() {
        let splits = suggest_parallel_splits(&items(&[0.0, 0.0]), 2, 0.0);
        assert!(splits.iter().all(|s| s.percentage == 0.0));
    }

    #[test]
    fn test_zero_runners_yields_no_assignments() {
        let splits = suggest_parallel_splits(&items(&[1.0]), 0, 1.0);
        assert!(splits.is_empty());
    }

    #[test]
    fn test_empty_input_yields_empty_runners() {
        let splits = suggest_parallel_splits(&[], 2, 0.0);
        assert_eq!(splits.len(), 2);
        assert!(splits.iter().all(|s| s.items.is_empty() && s.duration == 0.0));
    }
}
